//! Bottle inventory queries and mutations.
//!
//! A bottle row is one cellar slot: a wine (optional while uncatalogued), a
//! vintage, a size, a price in cents, and a quantity of identical bottles.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::{new_id, normalize_tags, now_us};
use crate::error::{Error, Result};
use crate::model::{Bottle, BottleDetails, BottleUpdate, NewBottle, WineColour};

/// Sort order for bottle listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BottleSort {
    /// Most recently added first.
    #[default]
    CreatedDesc,
    /// Oldest addition first.
    CreatedAsc,
    /// Oldest vintage first; bottles without a vintage sort last.
    VintageAsc,
    /// Youngest vintage first.
    VintageDesc,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Wine name A to Z.
    NameAsc,
}

impl BottleSort {
    const fn sql_clause(self) -> &'static str {
        match self {
            Self::CreatedDesc => "ORDER BY b.created_at_us DESC, b.bottle_id ASC",
            Self::CreatedAsc => "ORDER BY b.created_at_us ASC, b.bottle_id ASC",
            Self::VintageAsc => {
                "ORDER BY b.vintage IS NULL ASC, b.vintage ASC, b.bottle_id ASC"
            }
            Self::VintageDesc => {
                "ORDER BY b.vintage IS NULL ASC, b.vintage DESC, b.bottle_id ASC"
            }
            Self::PriceAsc => "ORDER BY b.price_cents ASC, b.bottle_id ASC",
            Self::PriceDesc => "ORDER BY b.price_cents DESC, b.bottle_id ASC",
            Self::NameAsc => "ORDER BY w.name COLLATE NOCASE ASC, b.bottle_id ASC",
        }
    }
}

impl fmt::Display for BottleSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedDesc => f.write_str("created_desc"),
            Self::CreatedAsc => f.write_str("created_asc"),
            Self::VintageAsc => f.write_str("vintage_asc"),
            Self::VintageDesc => f.write_str("vintage_desc"),
            Self::PriceAsc => f.write_str("price_asc"),
            Self::PriceDesc => f.write_str("price_desc"),
            Self::NameAsc => f.write_str("name_asc"),
        }
    }
}

impl FromStr for BottleSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created_desc" | "created-desc" | "newest" => Ok(Self::CreatedDesc),
            "created_asc" | "created-asc" | "oldest" => Ok(Self::CreatedAsc),
            "vintage_asc" | "vintage-asc" => Ok(Self::VintageAsc),
            "vintage_desc" | "vintage-desc" => Ok(Self::VintageDesc),
            "price_asc" | "price-asc" => Ok(Self::PriceAsc),
            "price_desc" | "price-desc" => Ok(Self::PriceDesc),
            "name_asc" | "name-asc" | "name" => Ok(Self::NameAsc),
            other => Err(Error::InvalidValue(format!(
                "unknown sort order '{other}': expected one of created_desc, created_asc, \
                 vintage_asc, vintage_desc, price_asc, price_desc, name_asc"
            ))),
        }
    }
}

/// Filter criteria for bottle listings.
///
/// All fields are optional. When multiple fields are set, they are combined
/// with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct BottleFilter {
    /// Filter by wine colour.
    pub colour: Option<WineColour>,
    /// Filter by country of origin (via producer).
    pub country_id: Option<String>,
    /// Filter by region of origin (via producer).
    pub region_id: Option<String>,
    /// Filter by producer.
    pub producer_id: Option<String>,
    /// Filter by varietal name (wine must include this varietal).
    pub varietal: Option<String>,
    /// Filter by tag (bottle must carry this tag).
    pub tag: Option<String>,
    /// Substring match on wine or producer name.
    pub search: Option<String>,
    /// Only bottles with quantity above zero (default: false, show all).
    pub in_stock_only: bool,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Sort order.
    pub sort: BottleSort,
}

const SELECT: &str = "SELECT b.bottle_id, b.wine_id, b.vintage, b.size_ml, b.price_cents, \
                      b.quantity, b.created_at_us, b.updated_at_us, \
                      w.name, w.colour, p.name, c.name, r.name \
                      FROM bottles b \
                      LEFT JOIN wines w ON w.wine_id = b.wine_id \
                      LEFT JOIN producers p ON p.producer_id = w.producer_id \
                      LEFT JOIN countries c ON c.country_id = p.country_id \
                      LEFT JOIN regions r ON r.region_id = p.region_id";

fn row_to_details(row: &rusqlite::Row<'_>) -> rusqlite::Result<BottleDetails> {
    let colour: Option<String> = row.get(9)?;
    let colour = match colour {
        Some(raw) => Some(raw.parse::<WineColour>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };
    Ok(BottleDetails {
        bottle: Bottle {
            bottle_id: row.get(0)?,
            wine_id: row.get(1)?,
            vintage: row.get(2)?,
            size_ml: row.get(3)?,
            price_cents: row.get(4)?,
            quantity: row.get(5)?,
            tags: Vec::new(),
            created_at_us: row.get(6)?,
            updated_at_us: row.get(7)?,
        },
        wine_name: row.get(8)?,
        colour,
        producer_name: row.get(10)?,
        country_name: row.get(11)?,
        region_name: row.get(12)?,
        varietals: Vec::new(),
    })
}

fn bottle_tags(conn: &Connection, bottle_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag FROM bottle_tags WHERE bottle_id = ?1 ORDER BY tag COLLATE NOCASE",
    )?;
    let rows = stmt.query_map(params![bottle_id], |row| row.get(0))?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row?);
    }
    Ok(tags)
}

fn hydrate(conn: &Connection, mut details: BottleDetails) -> Result<BottleDetails> {
    details.bottle.tags = bottle_tags(conn, &details.bottle.bottle_id)?;
    if let Some(wine_id) = &details.bottle.wine_id {
        details.varietals = super::wines::varietal_names(conn, wine_id)?;
    }
    Ok(details)
}

/// List bottles matching the given filter criteria.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list(conn: &Connection, filter: &BottleFilter) -> Result<Vec<BottleDetails>> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(colour) = filter.colour {
        param_values.push(Box::new(colour.as_str()));
        conditions.push(format!("w.colour = ?{}", param_values.len()));
    }
    if let Some(country_id) = &filter.country_id {
        param_values.push(Box::new(country_id.clone()));
        conditions.push(format!("p.country_id = ?{}", param_values.len()));
    }
    if let Some(region_id) = &filter.region_id {
        param_values.push(Box::new(region_id.clone()));
        conditions.push(format!("p.region_id = ?{}", param_values.len()));
    }
    if let Some(producer_id) = &filter.producer_id {
        param_values.push(Box::new(producer_id.clone()));
        conditions.push(format!("w.producer_id = ?{}", param_values.len()));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.trim());
        param_values.push(Box::new(pattern));
        let n = param_values.len();
        conditions.push(format!("(w.name LIKE ?{n} OR p.name LIKE ?{n})"));
    }
    if filter.in_stock_only {
        conditions.push("b.quantity > 0".to_string());
    }

    // Varietal and tag filters require JOINs on the edge tables.
    let mut joins = String::new();
    if let Some(varietal) = &filter.varietal {
        param_values.push(Box::new(varietal.trim().to_string()));
        let _ = write!(
            joins,
            " INNER JOIN wine_varietals wv ON wv.wine_id = b.wine_id \
              INNER JOIN varietals v ON v.varietal_id = wv.varietal_id \
              AND v.name = ?{} COLLATE NOCASE",
            param_values.len()
        );
    }
    if let Some(tag) = &filter.tag {
        param_values.push(Box::new(tag.trim().to_string()));
        let _ = write!(
            joins,
            " INNER JOIN bottle_tags bt ON bt.bottle_id = b.bottle_id \
              AND bt.tag = ?{} COLLATE NOCASE",
            param_values.len()
        );
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sort_clause = filter.sort.sql_clause();
    let limit_clause = match (filter.limit, filter.offset) {
        (Some(limit), Some(offset)) => format!(" LIMIT {limit} OFFSET {offset}"),
        (Some(limit), None) => format!(" LIMIT {limit}"),
        (None, Some(offset)) => format!(" LIMIT -1 OFFSET {offset}"),
        (None, None) => String::new(),
    };

    let sql = format!("{SELECT}{joins}{where_clause} {sort_clause}{limit_clause}");
    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();
    let rows = stmt.query_map(params_from_iter(params_ref), row_to_details)?;

    let mut bottles = Vec::new();
    for row in rows {
        bottles.push(hydrate(conn, row?)?);
    }
    Ok(bottles)
}

/// Fetch a bottle by id, tags and varietals included.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no bottle has that id.
pub fn get(conn: &Connection, bottle_id: &str) -> Result<BottleDetails> {
    let sql = format!("{SELECT} WHERE b.bottle_id = ?1");
    let details = conn
        .query_row(&sql, params![bottle_id], row_to_details)
        .optional()?
        .ok_or_else(|| Error::NotFound {
            entity: "bottle",
            id: bottle_id.to_string(),
        })?;
    hydrate(conn, details)
}

fn validate(size_ml: i64, price_cents: i64, quantity: i64, vintage: Option<i32>) -> Result<()> {
    if size_ml <= 0 {
        return Err(Error::InvalidValue(format!(
            "bottle size must be positive, got {size_ml} ml"
        )));
    }
    if price_cents < 0 {
        return Err(Error::InvalidValue(format!(
            "price must not be negative, got {price_cents} cents"
        )));
    }
    if quantity < 0 {
        return Err(Error::InvalidValue(format!(
            "quantity must not be negative, got {quantity}"
        )));
    }
    if let Some(vintage) = vintage
        && !(1800..=2200).contains(&vintage)
    {
        return Err(Error::InvalidValue(format!(
            "vintage {vintage} is outside the plausible range 1800..=2200"
        )));
    }
    Ok(())
}

fn replace_tags(conn: &Connection, bottle_id: &str, tags: &[String], now: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM bottle_tags WHERE bottle_id = ?1",
        params![bottle_id],
    )?;
    for tag in tags {
        conn.execute(
            "INSERT OR IGNORE INTO bottle_tags (bottle_id, tag, created_at_us)
             VALUES (?1, ?2, ?3)",
            params![bottle_id, tag, now],
        )?;
    }
    Ok(())
}

/// Add a bottle to the cellar.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] for a non-positive size, negative price
/// or quantity, or implausible vintage, and [`Error::NotFound`] if the
/// referenced wine does not exist.
pub fn create(conn: &Connection, bottle: &NewBottle) -> Result<BottleDetails> {
    validate(
        bottle.size_ml,
        bottle.price_cents,
        bottle.quantity,
        bottle.vintage,
    )?;
    if let Some(wine_id) = &bottle.wine_id {
        let _ = super::wines::get(conn, wine_id)?;
    }

    let bottle_id = new_id();
    let now = now_us();
    let tags = normalize_tags(&bottle.tags);

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO bottles
             (bottle_id, wine_id, vintage, size_ml, price_cents, quantity,
              created_at_us, updated_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            bottle_id,
            bottle.wine_id,
            bottle.vintage,
            bottle.size_ml,
            bottle.price_cents,
            bottle.quantity,
            now
        ],
    )?;
    replace_tags(&tx, &bottle_id, &tags, now)?;
    tx.commit()?;

    tracing::debug!(bottle_id = %bottle_id, "bottle created");
    get(conn, &bottle_id)
}

/// Apply a partial update. A `Some` tag list replaces the whole set.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the bottle or target wine does not exist,
/// or [`Error::InvalidValue`] if the merged row fails validation.
pub fn update(conn: &Connection, bottle_id: &str, update: &BottleUpdate) -> Result<BottleDetails> {
    let current = get(conn, bottle_id)?;

    let wine_id = match &update.wine_id {
        Some(value) => value.clone(),
        None => current.bottle.wine_id.clone(),
    };
    if let Some(wine_id) = &wine_id {
        let _ = super::wines::get(conn, wine_id)?;
    }
    let vintage = match update.vintage {
        Some(value) => value,
        None => current.bottle.vintage,
    };
    let size_ml = update.size_ml.unwrap_or(current.bottle.size_ml);
    let price_cents = update.price_cents.unwrap_or(current.bottle.price_cents);
    let quantity = update.quantity.unwrap_or(current.bottle.quantity);
    validate(size_ml, price_cents, quantity, vintage)?;

    let now = now_us();
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE bottles SET wine_id = ?1, vintage = ?2, size_ml = ?3,
             price_cents = ?4, quantity = ?5, updated_at_us = ?6
         WHERE bottle_id = ?7",
        params![wine_id, vintage, size_ml, price_cents, quantity, now, bottle_id],
    )?;
    if let Some(tags) = &update.tags {
        replace_tags(&tx, bottle_id, &normalize_tags(tags), now)?;
    }
    tx.commit()?;

    get(conn, bottle_id)
}

/// Drink one bottle: decrement quantity, flooring at zero. A bottle already
/// at zero is returned unchanged.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no bottle has that id.
pub fn consume(conn: &Connection, bottle_id: &str) -> Result<BottleDetails> {
    let current = get(conn, bottle_id)?;
    if current.bottle.quantity == 0 {
        return Ok(current);
    }

    conn.execute(
        "UPDATE bottles SET quantity = quantity - 1, updated_at_us = ?1
         WHERE bottle_id = ?2 AND quantity > 0",
        params![now_us(), bottle_id],
    )?;
    get(conn, bottle_id)
}

/// Remove a bottle and its tags.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no bottle has that id.
pub fn delete(conn: &Connection, bottle_id: &str) -> Result<()> {
    let _ = get(conn, bottle_id)?;
    conn.execute(
        "DELETE FROM bottles WHERE bottle_id = ?1",
        params![bottle_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewProducer, NewRegion, NewWine};
    use crate::store::{countries, producers, regions, testutil::test_conn, wines};

    fn seed_wine(conn: &Connection, name: &str, colour: WineColour) -> String {
        wines::create(
            conn,
            &NewWine {
                name: name.to_string(),
                colour,
                producer_id: None,
                varietals: Vec::new(),
            },
        )
        .unwrap()
        .wine_id
    }

    fn new_bottle(wine_id: Option<String>) -> NewBottle {
        NewBottle {
            wine_id,
            vintage: Some(2019),
            size_ml: 750,
            price_cents: 2500,
            quantity: 1,
            tags: Vec::new(),
        }
    }

    #[test]
    fn create_and_get_roundtrip() {
        let conn = test_conn();
        let wine_id = seed_wine(&conn, "Hill of Grace", WineColour::Red);
        let mut bottle = new_bottle(Some(wine_id));
        bottle.tags = vec!["Rack A".to_string(), " rack a ".to_string()];

        let created = create(&conn, &bottle).unwrap();
        assert_eq!(created.wine_name.as_deref(), Some("Hill of Grace"));
        assert_eq!(created.colour, Some(WineColour::Red));
        assert_eq!(created.bottle.tags, vec!["Rack A"]);

        let fetched = get(&conn, &created.bottle.bottle_id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn uncatalogued_bottle_has_no_wine_fields() {
        let conn = test_conn();
        let created = create(&conn, &new_bottle(None)).unwrap();
        assert!(created.wine_name.is_none());
        assert!(created.colour.is_none());
        assert!(created.varietals.is_empty());
    }

    #[test]
    fn consume_floors_at_zero() {
        let conn = test_conn();
        let created = create(&conn, &new_bottle(None)).unwrap();
        assert_eq!(created.bottle.quantity, 1);

        let after_one = consume(&conn, &created.bottle.bottle_id).unwrap();
        assert_eq!(after_one.bottle.quantity, 0);

        let after_two = consume(&conn, &created.bottle.bottle_id).unwrap();
        assert_eq!(after_two.bottle.quantity, 0);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let conn = test_conn();
        let mut bottle = new_bottle(None);
        bottle.size_ml = 0;
        assert!(matches!(
            create(&conn, &bottle).unwrap_err(),
            Error::InvalidValue(_)
        ));

        let mut bottle = new_bottle(None);
        bottle.vintage = Some(1542);
        assert!(matches!(
            create(&conn, &bottle).unwrap_err(),
            Error::InvalidValue(_)
        ));

        let mut bottle = new_bottle(None);
        bottle.wine_id = Some("missing".to_string());
        assert!(matches!(
            create(&conn, &bottle).unwrap_err(),
            Error::NotFound { entity: "wine", .. }
        ));
    }

    #[test]
    fn filter_by_colour_tag_and_search() {
        let conn = test_conn();
        let red = seed_wine(&conn, "Grange", WineColour::Red);
        let white = seed_wine(&conn, "Art Series Chardonnay", WineColour::White);

        let mut with_tag = new_bottle(Some(red.clone()));
        with_tag.tags = vec!["gift".to_string()];
        create(&conn, &with_tag).unwrap();
        create(&conn, &new_bottle(Some(white))).unwrap();

        let reds = list(
            &conn,
            &BottleFilter {
                colour: Some(WineColour::Red),
                ..BottleFilter::default()
            },
        )
        .unwrap();
        assert_eq!(reds.len(), 1);
        assert_eq!(reds[0].wine_name.as_deref(), Some("Grange"));

        let tagged = list(
            &conn,
            &BottleFilter {
                tag: Some("GIFT".to_string()),
                ..BottleFilter::default()
            },
        )
        .unwrap();
        assert_eq!(tagged.len(), 1);

        let searched = list(
            &conn,
            &BottleFilter {
                search: Some("chardon".to_string()),
                ..BottleFilter::default()
            },
        )
        .unwrap();
        assert_eq!(searched.len(), 1);
        let _ = red;
    }

    #[test]
    fn filter_by_origin_via_producer() {
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
        let producer = producers::create(
            &conn,
            &NewProducer {
                name: "Domaine Leflaive".to_string(),
                country_id: Some(france.country_id.clone()),
                region_id: Some(burgundy.region_id.clone()),
            },
        )
        .unwrap();
        let wine = wines::create(
            &conn,
            &NewWine {
                name: "Les Pucelles".to_string(),
                colour: WineColour::White,
                producer_id: Some(producer.producer_id),
                varietals: vec!["Chardonnay".to_string()],
            },
        )
        .unwrap();
        create(&conn, &new_bottle(Some(wine.wine_id))).unwrap();
        create(&conn, &new_bottle(None)).unwrap();

        let french = list(
            &conn,
            &BottleFilter {
                country_id: Some(france.country_id),
                ..BottleFilter::default()
            },
        )
        .unwrap();
        assert_eq!(french.len(), 1);
        assert_eq!(french[0].region_name.as_deref(), Some("Burgundy"));
        assert_eq!(french[0].varietals, vec!["Chardonnay"]);

        let by_varietal = list(
            &conn,
            &BottleFilter {
                varietal: Some("chardonnay".to_string()),
                ..BottleFilter::default()
            },
        )
        .unwrap();
        assert_eq!(by_varietal.len(), 1);
    }

    #[test]
    fn sort_orders_apply() {
        let conn = test_conn();
        let mut cheap = new_bottle(None);
        cheap.price_cents = 1000;
        cheap.vintage = Some(2021);
        let mut dear = new_bottle(None);
        dear.price_cents = 9000;
        dear.vintage = Some(1998);
        let cheap = create(&conn, &cheap).unwrap();
        let dear = create(&conn, &dear).unwrap();

        let by_price = list(
            &conn,
            &BottleFilter {
                sort: BottleSort::PriceDesc,
                ..BottleFilter::default()
            },
        )
        .unwrap();
        assert_eq!(by_price[0].bottle.bottle_id, dear.bottle.bottle_id);

        let by_vintage = list(
            &conn,
            &BottleFilter {
                sort: BottleSort::VintageAsc,
                ..BottleFilter::default()
            },
        )
        .unwrap();
        assert_eq!(by_vintage[0].bottle.bottle_id, dear.bottle.bottle_id);
        let _ = cheap;
    }

    #[test]
    fn update_replaces_tags_only_when_given() {
        let conn = test_conn();
        let mut bottle = new_bottle(None);
        bottle.tags = vec!["gift".to_string()];
        let created = create(&conn, &bottle).unwrap();

        let updated = update(
            &conn,
            &created.bottle.bottle_id,
            &BottleUpdate {
                price_cents: Some(3200),
                ..BottleUpdate::default()
            },
        )
        .unwrap();
        assert_eq!(updated.bottle.price_cents, 3200);
        assert_eq!(updated.bottle.tags, vec!["gift"]);

        let cleared = update(
            &conn,
            &created.bottle.bottle_id,
            &BottleUpdate {
                tags: Some(Vec::new()),
                ..BottleUpdate::default()
            },
        )
        .unwrap();
        assert!(cleared.bottle.tags.is_empty());
    }

    #[test]
    fn sort_order_parses_from_str() {
        assert_eq!("newest".parse::<BottleSort>().unwrap(), BottleSort::CreatedDesc);
        assert_eq!("price-asc".parse::<BottleSort>().unwrap(), BottleSort::PriceAsc);
        assert!("sideways".parse::<BottleSort>().is_err());
    }
}
