//! Wine catalog queries and mutations.
//!
//! A wine is the abstract label (name, colour, producer, varietal blend);
//! physical stock lives in `bottles` and wanted stock in `wishlist`.

use rusqlite::{Connection, OptionalExtension, params};

use super::{new_id, normalize_name, now_us};
use crate::error::{Error, Result};
use crate::model::{NewWine, Wine, WineColour, WineUpdate};

const SELECT: &str = "SELECT w.wine_id, w.name, w.colour, w.producer_id, p.name \
                      FROM wines w \
                      LEFT JOIN producers p ON p.producer_id = w.producer_id";

fn row_to_wine(row: &rusqlite::Row<'_>) -> rusqlite::Result<Wine> {
    let colour: String = row.get(2)?;
    let colour = colour.parse::<WineColour>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Wine {
        wine_id: row.get(0)?,
        name: row.get(1)?,
        colour,
        producer_id: row.get(3)?,
        producer_name: row.get(4)?,
        varietals: Vec::new(),
    })
}

/// Varietal names for one wine, sorted.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn varietal_names(conn: &Connection, wine_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT v.name FROM wine_varietals wv \
         INNER JOIN varietals v ON v.varietal_id = wv.varietal_id \
         WHERE wv.wine_id = ?1 \
         ORDER BY v.name COLLATE NOCASE",
    )?;
    let rows = stmt.query_map(params![wine_id], |row| row.get(0))?;

    let mut names = Vec::new();
    for row in rows {
        names.push(row?);
    }
    Ok(names)
}

/// List wines, optionally filtered by colour and/or producer, ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list(
    conn: &Connection,
    colour: Option<WineColour>,
    producer_id: Option<&str>,
) -> Result<Vec<Wine>> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(colour) = colour {
        param_values.push(Box::new(colour.as_str()));
        conditions.push(format!("w.colour = ?{}", param_values.len()));
    }
    if let Some(producer_id) = producer_id {
        param_values.push(Box::new(producer_id.to_string()));
        conditions.push(format!("w.producer_id = ?{}", param_values.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("{SELECT}{where_clause} ORDER BY w.name COLLATE NOCASE");

    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();
    let rows = stmt.query_map(rusqlite::params_from_iter(params_ref), row_to_wine)?;

    let mut wines = Vec::new();
    for row in rows {
        wines.push(row?);
    }
    for wine in &mut wines {
        wine.varietals = varietal_names(conn, &wine.wine_id)?;
    }
    Ok(wines)
}

/// Fetch a wine by id, varietals included.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no wine has that id.
pub fn get(conn: &Connection, wine_id: &str) -> Result<Wine> {
    let sql = format!("{SELECT} WHERE w.wine_id = ?1");
    let mut wine = conn
        .query_row(&sql, params![wine_id], row_to_wine)
        .optional()?
        .ok_or_else(|| Error::NotFound {
            entity: "wine",
            id: wine_id.to_string(),
        })?;
    wine.varietals = varietal_names(conn, &wine.wine_id)?;
    Ok(wine)
}

/// Look up a wine by name and producer, case-insensitively on the name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_by_name(
    conn: &Connection,
    name: &str,
    producer_id: Option<&str>,
) -> Result<Option<Wine>> {
    let sql = match producer_id {
        Some(_) => format!("{SELECT} WHERE w.name = ?1 COLLATE NOCASE AND w.producer_id = ?2"),
        None => format!("{SELECT} WHERE w.name = ?1 COLLATE NOCASE AND w.producer_id IS NULL"),
    };
    let found = match producer_id {
        Some(producer_id) => conn
            .query_row(&sql, params![name.trim(), producer_id], row_to_wine)
            .optional()?,
        None => conn
            .query_row(&sql, params![name.trim()], row_to_wine)
            .optional()?,
    };
    match found {
        Some(mut wine) => {
            wine.varietals = varietal_names(conn, &wine.wine_id)?;
            Ok(Some(wine))
        }
        None => Ok(None),
    }
}

/// Replace a wine's varietal set atomically. Missing varietal names are
/// created on the fly.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the wine does not exist.
pub fn set_varietals(conn: &Connection, wine_id: &str, names: &[String]) -> Result<Vec<String>> {
    let _ = get(conn, wine_id)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM wine_varietals WHERE wine_id = ?1",
        params![wine_id],
    )?;
    for name in names {
        if name.trim().is_empty() {
            continue;
        }
        let varietal = super::varietals::find_or_create(&tx, name)?;
        tx.execute(
            "INSERT OR IGNORE INTO wine_varietals (wine_id, varietal_id) VALUES (?1, ?2)",
            params![wine_id, varietal.varietal_id],
        )?;
    }
    tx.commit()?;

    varietal_names(conn, wine_id)
}

/// Create a wine with its varietal blend.
///
/// # Errors
///
/// Returns [`Error::DuplicateName`] if the producer already has a wine by
/// that name, or [`Error::NotFound`] if the producer does not exist.
pub fn create(conn: &Connection, wine: &NewWine) -> Result<Wine> {
    let name = normalize_name("wine", &wine.name)?;
    if let Some(producer_id) = &wine.producer_id {
        let _ = super::producers::get(conn, producer_id)?;
    }
    if let Some(existing) = find_by_name(conn, &name, wine.producer_id.as_deref())? {
        return Err(Error::DuplicateName {
            entity: "wine",
            name: existing.name,
        });
    }

    let wine_id = new_id();
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO wines (wine_id, name, colour, producer_id, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            wine_id,
            name,
            wine.colour.as_str(),
            wine.producer_id,
            now_us()
        ],
    )?;
    for varietal_name in &wine.varietals {
        if varietal_name.trim().is_empty() {
            continue;
        }
        let varietal = super::varietals::find_or_create(&tx, varietal_name)?;
        tx.execute(
            "INSERT OR IGNORE INTO wine_varietals (wine_id, varietal_id) VALUES (?1, ?2)",
            params![wine_id, varietal.varietal_id],
        )?;
    }
    tx.commit()?;

    tracing::debug!(wine_id = %wine_id, name = %name, "wine created");
    get(conn, &wine_id)
}

/// Apply a partial update. A `Some` varietal list replaces the whole set.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the wine or producer does not exist, or
/// [`Error::DuplicateName`] on a name collision.
pub fn update(conn: &Connection, wine_id: &str, update: &WineUpdate) -> Result<Wine> {
    let current = get(conn, wine_id)?;

    let name = match &update.name {
        Some(name) => normalize_name("wine", name)?,
        None => current.name.clone(),
    };
    let colour = update.colour.unwrap_or(current.colour);
    let producer_id = match &update.producer_id {
        Some(value) => value.clone(),
        None => current.producer_id.clone(),
    };
    if let Some(producer_id) = &producer_id {
        let _ = super::producers::get(conn, producer_id)?;
    }
    if let Some(existing) = find_by_name(conn, &name, producer_id.as_deref())?
        && existing.wine_id != current.wine_id
    {
        return Err(Error::DuplicateName {
            entity: "wine",
            name: existing.name,
        });
    }

    conn.execute(
        "UPDATE wines SET name = ?1, colour = ?2, producer_id = ?3 WHERE wine_id = ?4",
        params![name, colour.as_str(), producer_id, wine_id],
    )?;
    if let Some(varietals) = &update.varietals {
        set_varietals(conn, wine_id, varietals)?;
    }
    get(conn, wine_id)
}

/// Delete a wine. Varietal links are removed by cascade.
///
/// # Errors
///
/// Returns [`Error::InUse`] while bottles or wishlist entries still
/// reference it.
pub fn delete(conn: &Connection, wine_id: &str) -> Result<()> {
    let _ = get(conn, wine_id)?;

    let dependents: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM bottles WHERE wine_id = ?1)
              + (SELECT COUNT(*) FROM wishlist WHERE wine_id = ?1)",
        params![wine_id],
        |row| row.get(0),
    )?;
    if dependents > 0 {
        return Err(Error::InUse {
            entity: "wine",
            id: wine_id.to_string(),
            dependents: "bottles or wishlist entries",
        });
    }

    conn.execute("DELETE FROM wines WHERE wine_id = ?1", params![wine_id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewProducer;
    use crate::store::{producers, testutil::test_conn};

    fn new_wine(name: &str, colour: WineColour, varietals: &[&str]) -> NewWine {
        NewWine {
            name: name.to_string(),
            colour,
            producer_id: None,
            varietals: varietals.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn create_links_varietals_sorted() {
        let conn = test_conn();
        let wine = create(
            &conn,
            &new_wine("Côte Blend", WineColour::Red, &["Syrah", "Grenache", ""]),
        )
        .unwrap();
        assert_eq!(wine.varietals, vec!["Grenache", "Syrah"]);
    }

    #[test]
    fn same_name_allowed_under_different_producers() {
        let conn = test_conn();
        let a = producers::create(
            &conn,
            &NewProducer {
                name: "Estate A".to_string(),
                country_id: None,
                region_id: None,
            },
        )
        .unwrap();

        create(&conn, &new_wine("Reserve", WineColour::Red, &[])).unwrap();
        let mut under_a = new_wine("Reserve", WineColour::Red, &[]);
        under_a.producer_id = Some(a.producer_id);
        create(&conn, &under_a).unwrap();

        let err = create(&conn, &new_wine("reserve", WineColour::Red, &[])).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { entity: "wine", .. }));
    }

    #[test]
    fn set_varietals_replaces_the_whole_set() {
        let conn = test_conn();
        let wine = create(
            &conn,
            &new_wine("Blend", WineColour::Red, &["Merlot", "Cabernet Sauvignon"]),
        )
        .unwrap();

        let updated = set_varietals(&conn, &wine.wine_id, &["Shiraz".to_string()]).unwrap();
        assert_eq!(updated, vec!["Shiraz"]);

        // Orphaned varietals stay in the catalog.
        assert!(
            crate::store::varietals::find_by_name(&conn, "Merlot")
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn update_changes_colour_and_varietals() {
        let conn = test_conn();
        let wine = create(&conn, &new_wine("Field Blend", WineColour::Red, &[])).unwrap();

        let updated = update(
            &conn,
            &wine.wine_id,
            &WineUpdate {
                name: None,
                colour: Some(WineColour::Rose),
                producer_id: None,
                varietals: Some(vec!["Grenache".to_string()]),
            },
        )
        .unwrap();
        assert_eq!(updated.colour, WineColour::Rose);
        assert_eq!(updated.varietals, vec!["Grenache"]);
    }
}
