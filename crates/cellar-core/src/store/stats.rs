//! Aggregate statistics over the cellar.
//!
//! Value totals count stock on hand: `price_cents * quantity` summed over
//! bottles. Empty slots (quantity zero) contribute bottles and value of zero
//! but still count as distinct wines.

use rusqlite::Connection;
use serde::Serialize;

use crate::error::Result;

/// Bottle count and value for one group (colour, country, varietal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStat {
    pub name: String,
    pub bottles: i64,
    pub value_cents: i64,
}

/// Aggregate counters for the whole cellar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellarStats {
    /// Total bottles on hand (sum of quantities).
    pub total_bottles: i64,
    /// Distinct bottle rows (cellar slots).
    pub total_slots: i64,
    /// Distinct wines with at least one bottle row.
    pub distinct_wines: i64,
    /// Total purchase value of stock on hand, in cents.
    pub total_value_cents: i64,
    /// Wishlist entry count.
    pub wishlist_entries: i64,
    /// Stock grouped by wine colour. Bottles without a wine group under
    /// "unknown".
    pub by_colour: Vec<GroupStat>,
    /// Stock grouped by country of origin via the producer. Bottles without
    /// a resolvable country group under "Unknown".
    pub by_country: Vec<GroupStat>,
    /// Stock grouped by varietal. Blends count once per varietal.
    pub by_varietal: Vec<GroupStat>,
}

fn grouped(conn: &Connection, sql: &str) -> Result<Vec<GroupStat>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(GroupStat {
            name: row.get(0)?,
            bottles: row.get(1)?,
            value_cents: row.get(2)?,
        })
    })?;

    let mut stats = Vec::new();
    for row in rows {
        stats.push(row?);
    }
    Ok(stats)
}

/// Compute the full statistics summary in one pass over the database.
///
/// # Errors
///
/// Returns an error if any of the aggregate queries fail.
pub fn summary(conn: &Connection) -> Result<CellarStats> {
    let (total_bottles, total_slots, distinct_wines, total_value_cents) = conn.query_row(
        "SELECT COALESCE(SUM(quantity), 0),
                COUNT(*),
                COUNT(DISTINCT wine_id),
                COALESCE(SUM(price_cents * quantity), 0)
         FROM bottles",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        },
    )?;

    let wishlist_entries: i64 =
        conn.query_row("SELECT COUNT(*) FROM wishlist", [], |row| row.get(0))?;

    let by_colour = grouped(
        conn,
        "SELECT COALESCE(w.colour, 'unknown') AS name,
                COALESCE(SUM(b.quantity), 0),
                COALESCE(SUM(b.price_cents * b.quantity), 0)
         FROM bottles b
         LEFT JOIN wines w ON w.wine_id = b.wine_id
         GROUP BY name
         ORDER BY 2 DESC, name ASC",
    )?;

    let by_country = grouped(
        conn,
        "SELECT COALESCE(c.name, 'Unknown') AS name,
                COALESCE(SUM(b.quantity), 0),
                COALESCE(SUM(b.price_cents * b.quantity), 0)
         FROM bottles b
         LEFT JOIN wines w ON w.wine_id = b.wine_id
         LEFT JOIN producers p ON p.producer_id = w.producer_id
         LEFT JOIN countries c ON c.country_id = p.country_id
         GROUP BY name
         ORDER BY 2 DESC, name ASC",
    )?;

    let by_varietal = grouped(
        conn,
        "SELECT v.name AS name,
                COALESCE(SUM(b.quantity), 0),
                COALESCE(SUM(b.price_cents * b.quantity), 0)
         FROM bottles b
         INNER JOIN wine_varietals wv ON wv.wine_id = b.wine_id
         INNER JOIN varietals v ON v.varietal_id = wv.varietal_id
         GROUP BY v.varietal_id
         ORDER BY 2 DESC, name ASC",
    )?;

    Ok(CellarStats {
        total_bottles,
        total_slots,
        distinct_wines,
        total_value_cents,
        wishlist_entries,
        by_colour,
        by_country,
        by_varietal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewBottle, NewProducer, NewWine, NewWishlistItem, WineColour};
    use crate::store::{bottles, countries, producers, testutil::test_conn, wines, wishlist};

    #[test]
    fn empty_cellar_is_all_zeroes() {
        let conn = test_conn();
        let stats = summary(&conn).unwrap();
        assert_eq!(stats.total_bottles, 0);
        assert_eq!(stats.total_value_cents, 0);
        assert!(stats.by_colour.is_empty());
        assert!(stats.by_country.is_empty());
        assert!(stats.by_varietal.is_empty());
    }

    #[test]
    fn totals_weigh_quantity() {
        let conn = test_conn();
        let australia = countries::create(&conn, "Australia").unwrap();
        let producer = producers::create(
            &conn,
            &NewProducer {
                name: "Henschke".to_string(),
                country_id: Some(australia.country_id),
                region_id: None,
            },
        )
        .unwrap();
        let shiraz = wines::create(
            &conn,
            &NewWine {
                name: "Mount Edelstone".to_string(),
                colour: WineColour::Red,
                producer_id: Some(producer.producer_id),
                varietals: vec!["Shiraz".to_string()],
            },
        )
        .unwrap();

        bottles::create(
            &conn,
            &NewBottle {
                wine_id: Some(shiraz.wine_id.clone()),
                vintage: Some(2016),
                size_ml: 750,
                price_cents: 10000,
                quantity: 3,
                tags: Vec::new(),
            },
        )
        .unwrap();
        // Uncatalogued bottle groups under "unknown".
        bottles::create(
            &conn,
            &NewBottle {
                wine_id: None,
                vintage: None,
                size_ml: 750,
                price_cents: 500,
                quantity: 2,
                tags: Vec::new(),
            },
        )
        .unwrap();
        wishlist::create(
            &conn,
            &NewWishlistItem {
                wine_id: shiraz.wine_id,
                estimated_price_cents: 0,
                tags: Vec::new(),
            },
        )
        .unwrap();

        let stats = summary(&conn).unwrap();
        assert_eq!(stats.total_bottles, 5);
        assert_eq!(stats.total_slots, 2);
        assert_eq!(stats.distinct_wines, 1);
        assert_eq!(stats.total_value_cents, 3 * 10000 + 2 * 500);
        assert_eq!(stats.wishlist_entries, 1);

        assert_eq!(stats.by_colour[0].name, "red");
        assert_eq!(stats.by_colour[0].bottles, 3);
        assert_eq!(stats.by_colour[1].name, "unknown");
        assert_eq!(stats.by_colour[1].bottles, 2);

        // The uncatalogued bottle has no country and lands under "Unknown".
        assert_eq!(stats.by_country.len(), 2);
        assert_eq!(stats.by_country[0].name, "Australia");
        assert_eq!(stats.by_country[0].bottles, 3);
        assert_eq!(stats.by_country[0].value_cents, 30000);
        assert_eq!(stats.by_country[1].name, "Unknown");
        assert_eq!(stats.by_country[1].bottles, 2);
        assert_eq!(stats.by_country[1].value_cents, 1000);

        assert_eq!(stats.by_varietal[0].name, "Shiraz");
    }

    #[test]
    fn consumed_bottle_drops_out_of_value() {
        let conn = test_conn();
        let bottle = bottles::create(
            &conn,
            &NewBottle {
                wine_id: None,
                vintage: None,
                size_ml: 750,
                price_cents: 4000,
                quantity: 1,
                tags: Vec::new(),
            },
        )
        .unwrap();

        bottles::consume(&conn, &bottle.bottle.bottle_id).unwrap();
        let stats = summary(&conn).unwrap();
        assert_eq!(stats.total_bottles, 0);
        assert_eq!(stats.total_value_cents, 0);
        // The slot itself is still tracked.
        assert_eq!(stats.total_slots, 1);
    }
}
