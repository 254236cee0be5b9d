//! Moves between the cellar and the wishlist.
//!
//! Each move is a single transaction: the insert into the destination and
//! the delete from the source either both land or neither does. A crash or
//! constraint failure mid-move can never duplicate or drop a bottle.

use rusqlite::{Connection, params};

use super::{new_id, now_us};
use crate::error::{Error, Result};
use crate::model::{BottleDetails, WishlistDetails};

/// Overrides applied when a wishlist entry becomes a cellar bottle.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct AcquireOptions {
    pub vintage: Option<i32>,
    /// Defaults to a standard 750 ml bottle.
    pub size_ml: Option<i64>,
    /// Defaults to the wishlist entry's estimated price.
    pub price_cents: Option<i64>,
    /// Defaults to one bottle.
    pub quantity: Option<i64>,
    /// Defaults to the wishlist entry's tags.
    pub tags: Option<Vec<String>>,
}

/// Overrides applied when a bottle goes back onto the wishlist.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct StashOptions {
    /// Defaults to the bottle's purchase price.
    pub estimated_price_cents: Option<i64>,
    /// Defaults to the bottle's tags.
    pub tags: Option<Vec<String>>,
}

/// Move a bottle out of the cellar onto the wishlist ("drink later, rebuy").
///
/// The bottle must reference a catalogued wine. Unless overridden, its price
/// seeds the wishlist estimate and its tags travel with it.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the bottle does not exist, or
/// [`Error::InvalidValue`] if it has no wine or the price override is
/// negative.
pub fn bottle_to_wishlist(
    conn: &Connection,
    bottle_id: &str,
    options: &StashOptions,
) -> Result<WishlistDetails> {
    let bottle = super::bottles::get(conn, bottle_id)?;
    let Some(wine_id) = bottle.bottle.wine_id.clone() else {
        return Err(Error::InvalidValue(format!(
            "bottle '{bottle_id}' has no wine and cannot be wishlisted"
        )));
    };

    let estimated_price_cents = options
        .estimated_price_cents
        .unwrap_or(bottle.bottle.price_cents);
    if estimated_price_cents < 0 {
        return Err(Error::InvalidValue(
            "estimated price must not be negative".to_string(),
        ));
    }
    let tags = match &options.tags {
        Some(tags) => super::normalize_tags(tags),
        None => bottle.bottle.tags.clone(),
    };

    let wishlist_id = new_id();
    let now = now_us();

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO wishlist
             (wishlist_id, wine_id, estimated_price_cents, created_at_us, updated_at_us)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![wishlist_id, wine_id, estimated_price_cents, now],
    )?;
    for tag in &tags {
        tx.execute(
            "INSERT OR IGNORE INTO wishlist_tags (wishlist_id, tag, created_at_us)
             VALUES (?1, ?2, ?3)",
            params![wishlist_id, tag, now],
        )?;
    }
    tx.execute(
        "DELETE FROM bottles WHERE bottle_id = ?1",
        params![bottle_id],
    )?;
    tx.commit()?;

    tracing::info!(bottle_id = %bottle_id, wishlist_id = %wishlist_id, "bottle moved to wishlist");
    super::wishlist::get(conn, &wishlist_id)
}

/// Move a wishlist entry into the cellar as a real bottle.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the entry does not exist, or
/// [`Error::InvalidValue`] if the overrides fail validation.
pub fn wishlist_to_cellar(
    conn: &Connection,
    wishlist_id: &str,
    options: &AcquireOptions,
) -> Result<BottleDetails> {
    let entry = super::wishlist::get(conn, wishlist_id)?;

    let size_ml = options.size_ml.unwrap_or(750);
    let price_cents = options
        .price_cents
        .unwrap_or(entry.item.estimated_price_cents);
    let quantity = options.quantity.unwrap_or(1);
    if size_ml <= 0 || price_cents < 0 || quantity < 0 {
        return Err(Error::InvalidValue(
            "size must be positive; price and quantity must not be negative".to_string(),
        ));
    }
    let tags = match &options.tags {
        Some(tags) => super::normalize_tags(tags),
        None => entry.item.tags.clone(),
    };

    let bottle_id = new_id();
    let now = now_us();

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO bottles
             (bottle_id, wine_id, vintage, size_ml, price_cents, quantity,
              created_at_us, updated_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            bottle_id,
            entry.item.wine_id,
            options.vintage,
            size_ml,
            price_cents,
            quantity,
            now
        ],
    )?;
    for tag in &tags {
        tx.execute(
            "INSERT OR IGNORE INTO bottle_tags (bottle_id, tag, created_at_us)
             VALUES (?1, ?2, ?3)",
            params![bottle_id, tag, now],
        )?;
    }
    tx.execute(
        "DELETE FROM wishlist WHERE wishlist_id = ?1",
        params![wishlist_id],
    )?;
    tx.commit()?;

    tracing::info!(wishlist_id = %wishlist_id, bottle_id = %bottle_id, "wishlist entry moved to cellar");
    super::bottles::get(conn, &bottle_id)
}
