//! Country catalog queries and mutations.

use rusqlite::{Connection, OptionalExtension, params};

use super::{new_id, normalize_name, now_us};
use crate::error::{Error, Result};
use crate::model::Country;

/// List all countries ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list(conn: &Connection) -> Result<Vec<Country>> {
    let mut stmt =
        conn.prepare("SELECT country_id, name FROM countries ORDER BY name COLLATE NOCASE")?;
    let rows = stmt.query_map([], |row| {
        Ok(Country {
            country_id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut countries = Vec::new();
    for row in rows {
        countries.push(row?);
    }
    Ok(countries)
}

/// Fetch a country by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no country has that id.
pub fn get(conn: &Connection, country_id: &str) -> Result<Country> {
    conn.query_row(
        "SELECT country_id, name FROM countries WHERE country_id = ?1",
        params![country_id],
        |row| {
            Ok(Country {
                country_id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| Error::NotFound {
        entity: "country",
        id: country_id.to_string(),
    })
}

/// Look up a country by name, case-insensitively.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Country>> {
    let found = conn
        .query_row(
            "SELECT country_id, name FROM countries WHERE name = ?1 COLLATE NOCASE",
            params![name.trim()],
            |row| {
                Ok(Country {
                    country_id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

/// Create a country. Names are unique case-insensitively.
///
/// # Errors
///
/// Returns [`Error::DuplicateName`] if the name is already taken, or
/// [`Error::EmptyName`] if it is blank.
pub fn create(conn: &Connection, name: &str) -> Result<Country> {
    let name = normalize_name("country", name)?;
    if let Some(existing) = find_by_name(conn, &name)? {
        return Err(Error::DuplicateName {
            entity: "country",
            name: existing.name,
        });
    }

    let country = Country {
        country_id: new_id(),
        name,
    };
    conn.execute(
        "INSERT INTO countries (country_id, name, created_at_us) VALUES (?1, ?2, ?3)",
        params![country.country_id, country.name, now_us()],
    )?;
    tracing::debug!(country_id = %country.country_id, name = %country.name, "country created");
    Ok(country)
}

/// Rename a country.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the country does not exist, or
/// [`Error::DuplicateName`] if another country already has the name.
pub fn rename(conn: &Connection, country_id: &str, name: &str) -> Result<Country> {
    let name = normalize_name("country", name)?;
    let current = get(conn, country_id)?;
    if let Some(existing) = find_by_name(conn, &name)?
        && existing.country_id != current.country_id
    {
        return Err(Error::DuplicateName {
            entity: "country",
            name: existing.name,
        });
    }

    conn.execute(
        "UPDATE countries SET name = ?1 WHERE country_id = ?2",
        params![name, country_id],
    )?;
    Ok(Country {
        country_id: current.country_id,
        name,
    })
}

/// Delete a country.
///
/// # Errors
///
/// Returns [`Error::InUse`] while regions or producers still reference it.
pub fn delete(conn: &Connection, country_id: &str) -> Result<()> {
    let _ = get(conn, country_id)?;

    let dependents: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM regions WHERE country_id = ?1)
              + (SELECT COUNT(*) FROM producers WHERE country_id = ?1)",
        params![country_id],
        |row| row.get(0),
    )?;
    if dependents > 0 {
        return Err(Error::InUse {
            entity: "country",
            id: country_id.to_string(),
            dependents: "regions or producers",
        });
    }

    conn.execute(
        "DELETE FROM countries WHERE country_id = ?1",
        params![country_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::test_conn;

    #[test]
    fn create_list_roundtrip() {
        let conn = test_conn();
        create(&conn, " France ").unwrap();
        create(&conn, "Italy").unwrap();

        let countries = list(&conn).unwrap();
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name, "France");
        assert_eq!(countries[1].name, "Italy");
    }

    #[test]
    fn duplicate_name_is_rejected_case_insensitively() {
        let conn = test_conn();
        create(&conn, "France").unwrap();
        let err = create(&conn, "  fRaNcE ").unwrap_err();
        assert!(matches!(err, Error::DuplicateName { entity: "country", .. }));
    }

    #[test]
    fn rename_checks_collisions_but_allows_self() {
        let conn = test_conn();
        let france = create(&conn, "France").unwrap();
        create(&conn, "Italy").unwrap();

        let renamed = rename(&conn, &france.country_id, "FRANCE").unwrap();
        assert_eq!(renamed.name, "FRANCE");

        let err = rename(&conn, &france.country_id, "italy").unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
    }

    #[test]
    fn delete_refuses_while_referenced() {
        let conn = test_conn();
        let france = create(&conn, "France").unwrap();
        crate::store::regions::create(
            &conn,
            &crate::model::NewRegion {
                name: "Burgundy".to_string(),
                country_id: france.country_id.clone(),
            },
        )
        .unwrap();

        let err = delete(&conn, &france.country_id).unwrap_err();
        assert!(matches!(err, Error::InUse { entity: "country", .. }));
    }

    #[test]
    fn missing_country_is_not_found() {
        let conn = test_conn();
        let err = get(&conn, "nope").unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "country", .. }));
        let err = delete(&conn, "nope").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
