//! Region catalog queries and mutations.
//!
//! Region names are unique per country, not globally; "Victoria" can exist
//! under both Australia and Canada.

use rusqlite::{Connection, OptionalExtension, params};

use super::{new_id, normalize_name, now_us};
use crate::error::{Error, Result};
use crate::model::{NewRegion, Region, RegionUpdate};

const SELECT: &str = "SELECT r.region_id, r.name, r.country_id, c.name \
                      FROM regions r \
                      INNER JOIN countries c ON c.country_id = r.country_id";

fn row_to_region(row: &rusqlite::Row<'_>) -> rusqlite::Result<Region> {
    Ok(Region {
        region_id: row.get(0)?,
        name: row.get(1)?,
        country_id: row.get(2)?,
        country_name: row.get(3)?,
    })
}

/// List regions, optionally restricted to one country, ordered by country
/// then region name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list(conn: &Connection, country_id: Option<&str>) -> Result<Vec<Region>> {
    let mut regions = Vec::new();
    if let Some(country_id) = country_id {
        let sql = format!(
            "{SELECT} WHERE r.country_id = ?1 ORDER BY r.name COLLATE NOCASE"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![country_id], row_to_region)?;
        for row in rows {
            regions.push(row?);
        }
    } else {
        let sql = format!(
            "{SELECT} ORDER BY c.name COLLATE NOCASE, r.name COLLATE NOCASE"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_region)?;
        for row in rows {
            regions.push(row?);
        }
    }
    Ok(regions)
}

/// Fetch a region by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no region has that id.
pub fn get(conn: &Connection, region_id: &str) -> Result<Region> {
    let sql = format!("{SELECT} WHERE r.region_id = ?1");
    conn.query_row(&sql, params![region_id], row_to_region)
        .optional()?
        .ok_or_else(|| Error::NotFound {
            entity: "region",
            id: region_id.to_string(),
        })
}

/// Look up a region by name within a country, case-insensitively.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_by_name(
    conn: &Connection,
    country_id: &str,
    name: &str,
) -> Result<Option<Region>> {
    let sql = format!("{SELECT} WHERE r.country_id = ?1 AND r.name = ?2 COLLATE NOCASE");
    let found = conn
        .query_row(&sql, params![country_id, name.trim()], row_to_region)
        .optional()?;
    Ok(found)
}

/// Create a region under an existing country.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the country does not exist, or
/// [`Error::DuplicateName`] if the country already has a region by that name.
pub fn create(conn: &Connection, region: &NewRegion) -> Result<Region> {
    let name = normalize_name("region", &region.name)?;
    let country = super::countries::get(conn, &region.country_id)?;
    if let Some(existing) = find_by_name(conn, &country.country_id, &name)? {
        return Err(Error::DuplicateName {
            entity: "region",
            name: existing.name,
        });
    }

    let region_id = new_id();
    conn.execute(
        "INSERT INTO regions (region_id, name, country_id, created_at_us)
         VALUES (?1, ?2, ?3, ?4)",
        params![region_id, name, country.country_id, now_us()],
    )?;
    tracing::debug!(region_id = %region_id, name = %name, "region created");
    Ok(Region {
        region_id,
        name,
        country_id: country.country_id,
        country_name: Some(country.name),
    })
}

/// Apply a partial update: rename and/or move to another country.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the region or target country does not
/// exist, or [`Error::DuplicateName`] on a name collision.
pub fn update(conn: &Connection, region_id: &str, update: &RegionUpdate) -> Result<Region> {
    let current = get(conn, region_id)?;

    let name = match &update.name {
        Some(name) => normalize_name("region", name)?,
        None => current.name.clone(),
    };
    let country_id = update
        .country_id
        .clone()
        .unwrap_or_else(|| current.country_id.clone());
    let _ = super::countries::get(conn, &country_id)?;

    if let Some(existing) = find_by_name(conn, &country_id, &name)?
        && existing.region_id != current.region_id
    {
        return Err(Error::DuplicateName {
            entity: "region",
            name: existing.name,
        });
    }

    conn.execute(
        "UPDATE regions SET name = ?1, country_id = ?2 WHERE region_id = ?3",
        params![name, country_id, region_id],
    )?;
    get(conn, region_id)
}

/// Delete a region.
///
/// # Errors
///
/// Returns [`Error::InUse`] while producers still reference it.
pub fn delete(conn: &Connection, region_id: &str) -> Result<()> {
    let _ = get(conn, region_id)?;

    let dependents: i64 = conn.query_row(
        "SELECT COUNT(*) FROM producers WHERE region_id = ?1",
        params![region_id],
        |row| row.get(0),
    )?;
    if dependents > 0 {
        return Err(Error::InUse {
            entity: "region",
            id: region_id.to_string(),
            dependents: "producers",
        });
    }

    conn.execute("DELETE FROM regions WHERE region_id = ?1", params![region_id])?;
    Ok(())
}
