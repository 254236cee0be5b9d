//! Wishlist queries and mutations.
//!
//! Wishlist entries always reference a catalogued wine; the estimated price
//! seeds the bottle price when the entry is moved into the cellar.

use rusqlite::{Connection, OptionalExtension, params};

use super::{new_id, normalize_tags, now_us};
use crate::error::{Error, Result};
use crate::model::{NewWishlistItem, WineColour, WishlistDetails, WishlistItem, WishlistUpdate};

const SELECT: &str = "SELECT wl.wishlist_id, wl.wine_id, wl.estimated_price_cents, \
                      wl.created_at_us, wl.updated_at_us, \
                      w.name, w.colour, p.name, c.name \
                      FROM wishlist wl \
                      INNER JOIN wines w ON w.wine_id = wl.wine_id \
                      LEFT JOIN producers p ON p.producer_id = w.producer_id \
                      LEFT JOIN countries c ON c.country_id = p.country_id";

fn row_to_details(row: &rusqlite::Row<'_>) -> rusqlite::Result<WishlistDetails> {
    let colour: String = row.get(6)?;
    let colour = colour.parse::<WineColour>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(WishlistDetails {
        item: WishlistItem {
            wishlist_id: row.get(0)?,
            wine_id: row.get(1)?,
            estimated_price_cents: row.get(2)?,
            tags: Vec::new(),
            created_at_us: row.get(3)?,
            updated_at_us: row.get(4)?,
        },
        wine_name: row.get(5)?,
        colour,
        producer_name: row.get(7)?,
        country_name: row.get(8)?,
    })
}

fn item_tags(conn: &Connection, wishlist_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag FROM wishlist_tags WHERE wishlist_id = ?1 ORDER BY tag COLLATE NOCASE",
    )?;
    let rows = stmt.query_map(params![wishlist_id], |row| row.get(0))?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row?);
    }
    Ok(tags)
}

/// List wishlist entries, newest first, optionally filtered by colour or tag.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list(
    conn: &Connection,
    colour: Option<WineColour>,
    tag: Option<&str>,
) -> Result<Vec<WishlistDetails>> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(colour) = colour {
        param_values.push(Box::new(colour.as_str()));
        conditions.push(format!("w.colour = ?{}", param_values.len()));
    }

    let mut joins = String::new();
    if let Some(tag) = tag {
        param_values.push(Box::new(tag.trim().to_string()));
        joins = format!(
            " INNER JOIN wishlist_tags wt ON wt.wishlist_id = wl.wishlist_id \
              AND wt.tag = ?{} COLLATE NOCASE",
            param_values.len()
        );
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let sql = format!(
        "{SELECT}{joins}{where_clause} ORDER BY wl.created_at_us DESC, wl.wishlist_id ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();
    let rows = stmt.query_map(rusqlite::params_from_iter(params_ref), row_to_details)?;

    let mut items = Vec::new();
    for row in rows {
        let mut details = row?;
        details.item.tags = item_tags(conn, &details.item.wishlist_id)?;
        items.push(details);
    }
    Ok(items)
}

/// Fetch a wishlist entry by id, tags included.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no entry has that id.
pub fn get(conn: &Connection, wishlist_id: &str) -> Result<WishlistDetails> {
    let sql = format!("{SELECT} WHERE wl.wishlist_id = ?1");
    let mut details = conn
        .query_row(&sql, params![wishlist_id], row_to_details)
        .optional()?
        .ok_or_else(|| Error::NotFound {
            entity: "wishlist entry",
            id: wishlist_id.to_string(),
        })?;
    details.item.tags = item_tags(conn, wishlist_id)?;
    Ok(details)
}

fn replace_tags(conn: &Connection, wishlist_id: &str, tags: &[String], now: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM wishlist_tags WHERE wishlist_id = ?1",
        params![wishlist_id],
    )?;
    for tag in tags {
        conn.execute(
            "INSERT OR IGNORE INTO wishlist_tags (wishlist_id, tag, created_at_us)
             VALUES (?1, ?2, ?3)",
            params![wishlist_id, tag, now],
        )?;
    }
    Ok(())
}

/// Add a wine to the wishlist.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the wine does not exist, or
/// [`Error::InvalidValue`] for a negative estimated price.
pub fn create(conn: &Connection, item: &NewWishlistItem) -> Result<WishlistDetails> {
    let _ = super::wines::get(conn, &item.wine_id)?;
    if item.estimated_price_cents < 0 {
        return Err(Error::InvalidValue(format!(
            "estimated price must not be negative, got {} cents",
            item.estimated_price_cents
        )));
    }

    let wishlist_id = new_id();
    let now = now_us();
    let tags = normalize_tags(&item.tags);

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO wishlist
             (wishlist_id, wine_id, estimated_price_cents, created_at_us, updated_at_us)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![wishlist_id, item.wine_id, item.estimated_price_cents, now],
    )?;
    replace_tags(&tx, &wishlist_id, &tags, now)?;
    tx.commit()?;

    tracing::debug!(wishlist_id = %wishlist_id, wine_id = %item.wine_id, "wishlist entry created");
    get(conn, &wishlist_id)
}

/// Apply a partial update. A `Some` tag list replaces the whole set.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the entry does not exist, or
/// [`Error::InvalidValue`] for a negative estimated price.
pub fn update(
    conn: &Connection,
    wishlist_id: &str,
    update: &WishlistUpdate,
) -> Result<WishlistDetails> {
    let current = get(conn, wishlist_id)?;

    let estimated = update
        .estimated_price_cents
        .unwrap_or(current.item.estimated_price_cents);
    if estimated < 0 {
        return Err(Error::InvalidValue(format!(
            "estimated price must not be negative, got {estimated} cents"
        )));
    }

    let now = now_us();
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE wishlist SET estimated_price_cents = ?1, updated_at_us = ?2
         WHERE wishlist_id = ?3",
        params![estimated, now, wishlist_id],
    )?;
    if let Some(tags) = &update.tags {
        replace_tags(&tx, wishlist_id, &normalize_tags(tags), now)?;
    }
    tx.commit()?;

    get(conn, wishlist_id)
}

/// Remove a wishlist entry and its tags.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no entry has that id.
pub fn delete(conn: &Connection, wishlist_id: &str) -> Result<()> {
    let _ = get(conn, wishlist_id)?;
    conn.execute(
        "DELETE FROM wishlist WHERE wishlist_id = ?1",
        params![wishlist_id],
    )?;
    Ok(())
}
