//! Producer catalog queries and mutations.

use rusqlite::{Connection, OptionalExtension, params};

use super::{new_id, normalize_name, now_us};
use crate::error::{Error, Result};
use crate::model::{NewProducer, Producer, ProducerUpdate};

const SELECT: &str = "SELECT p.producer_id, p.name, p.country_id, p.region_id, c.name, r.name \
                      FROM producers p \
                      LEFT JOIN countries c ON c.country_id = p.country_id \
                      LEFT JOIN regions r ON r.region_id = p.region_id";

fn row_to_producer(row: &rusqlite::Row<'_>) -> rusqlite::Result<Producer> {
    Ok(Producer {
        producer_id: row.get(0)?,
        name: row.get(1)?,
        country_id: row.get(2)?,
        region_id: row.get(3)?,
        country_name: row.get(4)?,
        region_name: row.get(5)?,
    })
}

/// List all producers ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list(conn: &Connection) -> Result<Vec<Producer>> {
    let sql = format!("{SELECT} ORDER BY p.name COLLATE NOCASE");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_producer)?;

    let mut producers = Vec::new();
    for row in rows {
        producers.push(row?);
    }
    Ok(producers)
}

/// Fetch a producer by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no producer has that id.
pub fn get(conn: &Connection, producer_id: &str) -> Result<Producer> {
    let sql = format!("{SELECT} WHERE p.producer_id = ?1");
    conn.query_row(&sql, params![producer_id], row_to_producer)
        .optional()?
        .ok_or_else(|| Error::NotFound {
            entity: "producer",
            id: producer_id.to_string(),
        })
}

/// Look up a producer by name, case-insensitively.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Producer>> {
    let sql = format!("{SELECT} WHERE p.name = ?1 COLLATE NOCASE");
    let found = conn
        .query_row(&sql, params![name.trim()], row_to_producer)
        .optional()?;
    Ok(found)
}

fn check_origin(
    conn: &Connection,
    country_id: Option<&str>,
    region_id: Option<&str>,
) -> Result<()> {
    if let Some(country_id) = country_id {
        let _ = super::countries::get(conn, country_id)?;
    }
    if let Some(region_id) = region_id {
        let region = super::regions::get(conn, region_id)?;
        if let Some(country_id) = country_id
            && region.country_id != country_id
        {
            return Err(Error::InvalidValue(format!(
                "region '{}' does not belong to the given country",
                region.name
            )));
        }
    }
    Ok(())
}

/// Create a producer, optionally anchored to a country and region.
///
/// # Errors
///
/// Returns [`Error::DuplicateName`] if the name is taken, or
/// [`Error::InvalidValue`] if the region does not belong to the country.
pub fn create(conn: &Connection, producer: &NewProducer) -> Result<Producer> {
    let name = normalize_name("producer", &producer.name)?;
    if let Some(existing) = find_by_name(conn, &name)? {
        return Err(Error::DuplicateName {
            entity: "producer",
            name: existing.name,
        });
    }
    check_origin(
        conn,
        producer.country_id.as_deref(),
        producer.region_id.as_deref(),
    )?;

    let producer_id = new_id();
    conn.execute(
        "INSERT INTO producers (producer_id, name, country_id, region_id, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            producer_id,
            name,
            producer.country_id,
            producer.region_id,
            now_us()
        ],
    )?;
    tracing::debug!(producer_id = %producer_id, name = %name, "producer created");
    get(conn, &producer_id)
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the producer does not exist, or the same
/// collision and origin errors as [`create`].
pub fn update(
    conn: &Connection,
    producer_id: &str,
    update: &ProducerUpdate,
) -> Result<Producer> {
    let current = get(conn, producer_id)?;

    let name = match &update.name {
        Some(name) => normalize_name("producer", name)?,
        None => current.name.clone(),
    };
    if let Some(existing) = find_by_name(conn, &name)?
        && existing.producer_id != current.producer_id
    {
        return Err(Error::DuplicateName {
            entity: "producer",
            name: existing.name,
        });
    }

    let country_id = match &update.country_id {
        Some(value) => value.clone(),
        None => current.country_id.clone(),
    };
    let region_id = match &update.region_id {
        Some(value) => value.clone(),
        None => current.region_id.clone(),
    };
    check_origin(conn, country_id.as_deref(), region_id.as_deref())?;

    conn.execute(
        "UPDATE producers SET name = ?1, country_id = ?2, region_id = ?3
         WHERE producer_id = ?4",
        params![name, country_id, region_id, producer_id],
    )?;
    get(conn, producer_id)
}

/// Delete a producer.
///
/// # Errors
///
/// Returns [`Error::InUse`] while wines still reference it.
pub fn delete(conn: &Connection, producer_id: &str) -> Result<()> {
    let _ = get(conn, producer_id)?;

    let dependents: i64 = conn.query_row(
        "SELECT COUNT(*) FROM wines WHERE producer_id = ?1",
        params![producer_id],
        |row| row.get(0),
    )?;
    if dependents > 0 {
        return Err(Error::InUse {
            entity: "producer",
            id: producer_id.to_string(),
            dependents: "wines",
        });
    }

    conn.execute(
        "DELETE FROM producers WHERE producer_id = ?1",
        params![producer_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewRegion;
    use crate::store::{countries, regions, testutil::test_conn};

    #[test]
    fn create_with_origin_joins_names() {
        let conn = test_conn();
        let france = countries::create(&conn, "France").unwrap();
        let burgundy = regions::create(
            &conn,
            &NewRegion {
                name: "Burgundy".to_string(),
                country_id: france.country_id.clone(),
            },
        )
        .unwrap();

        let producer = create(
            &conn,
            &NewProducer {
                name: "Domaine Leflaive".to_string(),
                country_id: Some(france.country_id.clone()),
                region_id: Some(burgundy.region_id.clone()),
            },
        )
        .unwrap();

        assert_eq!(producer.country_name.as_deref(), Some("France"));
        assert_eq!(producer.region_name.as_deref(), Some("Burgundy"));
    }

    #[test]
    fn region_must_match_country() {
        let conn = test_conn();
        let france = countries::create(&conn, "France").unwrap();
        let italy = countries::create(&conn, "Italy").unwrap();
        let tuscany = regions::create(
            &conn,
            &NewRegion {
                name: "Tuscany".to_string(),
                country_id: italy.country_id.clone(),
            },
        )
        .unwrap();

        let err = create(
            &conn,
            &NewProducer {
                name: "Confused Estate".to_string(),
                country_id: Some(france.country_id),
                region_id: Some(tuscany.region_id),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidValue(_)));
    }

    #[test]
    fn update_can_clear_origin() {
        let conn = test_conn();
        let france = countries::create(&conn, "France").unwrap();
        let producer = create(
            &conn,
            &NewProducer {
                name: "Maison Noir".to_string(),
                country_id: Some(france.country_id.clone()),
                region_id: None,
            },
        )
        .unwrap();

        let cleared = update(
            &conn,
            &producer.producer_id,
            &ProducerUpdate {
                name: None,
                country_id: Some(None),
                region_id: None,
            },
        )
        .unwrap();
        assert!(cleared.country_id.is_none());
        assert!(cleared.country_name.is_none());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let conn = test_conn();
        create(
            &conn,
            &NewProducer {
                name: "Penfolds".to_string(),
                country_id: None,
                region_id: None,
            },
        )
        .unwrap();
        let err = create(
            &conn,
            &NewProducer {
                name: " penfolds ".to_string(),
                country_id: None,
                region_id: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateName { entity: "producer", .. }));
    }
}
