//! Varietal catalog queries and mutations.

use rusqlite::{Connection, OptionalExtension, params};

use super::{new_id, normalize_name, now_us};
use crate::error::{Error, Result};
use crate::model::Varietal;

/// Varietal inventory row with usage count.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VarietalCount {
    pub varietal_id: String,
    pub name: String,
    pub wine_count: usize,
}

/// List varietals with the number of wines using each, most used first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list(conn: &Connection) -> Result<Vec<VarietalCount>> {
    let mut stmt = conn.prepare(
        "SELECT v.varietal_id, v.name, COUNT(wv.wine_id) AS wine_count \
         FROM varietals v \
         LEFT JOIN wine_varietals wv ON wv.varietal_id = v.varietal_id \
         GROUP BY v.varietal_id \
         ORDER BY wine_count DESC, v.name COLLATE NOCASE",
    )?;
    let rows = stmt.query_map([], |row| {
        let count: i64 = row.get(2)?;
        Ok(VarietalCount {
            varietal_id: row.get(0)?,
            name: row.get(1)?,
            wine_count: usize::try_from(count).unwrap_or(usize::MAX),
        })
    })?;

    let mut varietals = Vec::new();
    for row in rows {
        varietals.push(row?);
    }
    Ok(varietals)
}

/// Fetch a varietal by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no varietal has that id.
pub fn get(conn: &Connection, varietal_id: &str) -> Result<Varietal> {
    conn.query_row(
        "SELECT varietal_id, name FROM varietals WHERE varietal_id = ?1",
        params![varietal_id],
        |row| {
            Ok(Varietal {
                varietal_id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| Error::NotFound {
        entity: "varietal",
        id: varietal_id.to_string(),
    })
}

/// Look up a varietal by name, case-insensitively.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Varietal>> {
    let found = conn
        .query_row(
            "SELECT varietal_id, name FROM varietals WHERE name = ?1 COLLATE NOCASE",
            params![name.trim()],
            |row| {
                Ok(Varietal {
                    varietal_id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

/// Create a varietal. Names are unique case-insensitively.
///
/// # Errors
///
/// Returns [`Error::DuplicateName`] if the name is already taken.
pub fn create(conn: &Connection, name: &str) -> Result<Varietal> {
    let name = normalize_name("varietal", name)?;
    if let Some(existing) = find_by_name(conn, &name)? {
        return Err(Error::DuplicateName {
            entity: "varietal",
            name: existing.name,
        });
    }

    let varietal = Varietal {
        varietal_id: new_id(),
        name,
    };
    conn.execute(
        "INSERT INTO varietals (varietal_id, name, created_at_us) VALUES (?1, ?2, ?3)",
        params![varietal.varietal_id, varietal.name, now_us()],
    )?;
    Ok(varietal)
}

/// Return the varietal with this name, creating it when absent.
///
/// # Errors
///
/// Returns [`Error::EmptyName`] if the name is blank.
pub fn find_or_create(conn: &Connection, name: &str) -> Result<Varietal> {
    let name = normalize_name("varietal", name)?;
    if let Some(existing) = find_by_name(conn, &name)? {
        return Ok(existing);
    }
    create(conn, &name)
}

/// Rename a varietal.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the varietal does not exist, or
/// [`Error::DuplicateName`] if another varietal already has the name.
pub fn rename(conn: &Connection, varietal_id: &str, name: &str) -> Result<Varietal> {
    let name = normalize_name("varietal", name)?;
    let current = get(conn, varietal_id)?;
    if let Some(existing) = find_by_name(conn, &name)?
        && existing.varietal_id != current.varietal_id
    {
        return Err(Error::DuplicateName {
            entity: "varietal",
            name: existing.name,
        });
    }

    conn.execute(
        "UPDATE varietals SET name = ?1 WHERE varietal_id = ?2",
        params![name, varietal_id],
    )?;
    Ok(Varietal {
        varietal_id: current.varietal_id,
        name,
    })
}

/// Delete a varietal.
///
/// # Errors
///
/// Returns [`Error::InUse`] while wines still reference it.
pub fn delete(conn: &Connection, varietal_id: &str) -> Result<()> {
    let _ = get(conn, varietal_id)?;

    let dependents: i64 = conn.query_row(
        "SELECT COUNT(*) FROM wine_varietals WHERE varietal_id = ?1",
        params![varietal_id],
        |row| row.get(0),
    )?;
    if dependents > 0 {
        return Err(Error::InUse {
            entity: "varietal",
            id: varietal_id.to_string(),
            dependents: "wines",
        });
    }

    conn.execute(
        "DELETE FROM varietals WHERE varietal_id = ?1",
        params![varietal_id],
    )?;
    Ok(())
}
