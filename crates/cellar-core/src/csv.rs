//! CSV interchange for the whole cellar.
//!
//! The column order is fixed and doubles as the import contract:
//! `Wine, Producer, Country, Region, Colour, Vintage, Size, Price, Quantity,
//! Tags`. Sizes are millilitres, prices are decimal dollars, and the Tags
//! cell holds `;`-separated tags so a full export re-imports cleanly.

use std::io::{Read, Write};

use rusqlite::Connection;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{NewBottle, NewProducer, NewRegion, NewWine, WineColour};
use crate::store::{bottles, countries, producers, regions, wines};

/// Fixed export/import column order.
pub const COLUMNS: [&str; 10] = [
    "Wine", "Producer", "Country", "Region", "Colour", "Vintage", "Size", "Price", "Quantity",
    "Tags",
];

/// One rejected import row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// 1-based line number in the CSV file, header included.
    pub line: usize,
    pub message: String,
}

/// Outcome of a bulk import: created-counters per entity plus per-row errors.
/// Rows are independent; a bad row never aborts the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub rows: usize,
    pub bottles_created: usize,
    pub wines_created: usize,
    pub producers_created: usize,
    pub countries_created: usize,
    pub regions_created: usize,
    pub errors: Vec<RowError>,
}

/// Render a cent amount as decimal dollars ("2500" becomes "25.00").
#[must_use]
pub fn format_price(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

/// Parse a decimal dollar amount into cents. Accepts "25", "25.5", "25.50",
/// and an optional leading `$`.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] for negative amounts, more than two
/// decimal places, or anything non-numeric.
pub fn parse_price(raw: &str) -> Result<i64> {
    let cleaned = raw.trim().trim_start_matches('$').trim();
    if cleaned.is_empty() {
        return Ok(0);
    }

    let invalid = || Error::InvalidValue(format!("invalid price '{raw}'"));
    let (dollars, fraction) = match cleaned.split_once('.') {
        Some((d, f)) => (d, f),
        None => (cleaned, ""),
    };
    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let dollars: i64 = if dollars.is_empty() {
        0
    } else {
        dollars.parse().map_err(|_| invalid())?
    };
    if dollars < 0 {
        return Err(invalid());
    }
    let cents: i64 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{fraction:0<2}");
        padded.parse().map_err(|_| invalid())?
    };

    Ok(dollars * 100 + cents)
}

/// Write every bottle as one CSV row. Returns the number of rows written.
///
/// # Errors
///
/// Returns an error if the listing query or the writer fails.
pub fn export<W: Write>(conn: &Connection, writer: W) -> Result<usize> {
    let mut out = ::csv::Writer::from_writer(writer);
    out.write_record(COLUMNS)?;

    let all = bottles::list(conn, &bottles::BottleFilter::default())?;
    let count = all.len();
    for bottle in all {
        out.write_record([
            bottle.wine_name.clone().unwrap_or_default(),
            bottle.producer_name.clone().unwrap_or_default(),
            bottle.country_name.clone().unwrap_or_default(),
            bottle.region_name.clone().unwrap_or_default(),
            bottle.colour.map(|c| c.to_string()).unwrap_or_default(),
            bottle
                .bottle
                .vintage
                .map(|v| v.to_string())
                .unwrap_or_default(),
            bottle.bottle.size_ml.to_string(),
            format_price(bottle.bottle.price_cents),
            bottle.bottle.quantity.to_string(),
            bottle.bottle.tags.join(";"),
        ])?;
    }
    out.flush().map_err(::csv::Error::from)?;
    Ok(count)
}

struct ParsedRow {
    wine: String,
    producer: String,
    country: String,
    region: String,
    colour: WineColour,
    vintage: Option<i32>,
    size_ml: i64,
    price_cents: i64,
    quantity: i64,
    tags: Vec<String>,
}

fn parse_row(record: &::csv::StringRecord) -> Result<ParsedRow> {
    let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();

    let wine = field(0);
    if wine.is_empty() {
        return Err(Error::InvalidValue("missing wine name".to_string()));
    }

    let colour_raw = field(4);
    let colour = if colour_raw.is_empty() {
        WineColour::Other
    } else {
        colour_raw.parse::<WineColour>()?
    };

    let vintage_raw = field(5);
    let vintage = if vintage_raw.is_empty() {
        None
    } else {
        Some(vintage_raw.parse::<i32>().map_err(|_| {
            Error::InvalidValue(format!("invalid vintage '{vintage_raw}'"))
        })?)
    };

    let size_raw = field(6);
    let size_ml = if size_raw.is_empty() {
        750
    } else {
        size_raw
            .parse::<i64>()
            .map_err(|_| Error::InvalidValue(format!("invalid size '{size_raw}'")))?
    };

    let price_cents = parse_price(&field(7))?;

    let quantity_raw = field(8);
    let quantity = if quantity_raw.is_empty() {
        1
    } else {
        quantity_raw.parse::<i64>().map_err(|_| {
            Error::InvalidValue(format!("invalid quantity '{quantity_raw}'"))
        })?
    };

    let tags = field(9)
        .split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect();

    Ok(ParsedRow {
        wine,
        producer: field(1),
        country: field(2),
        region: field(3),
        colour,
        vintage,
        size_ml,
        price_cents,
        quantity,
        tags,
    })
}

fn import_row(conn: &Connection, row: &ParsedRow, report: &mut ImportReport) -> Result<()> {
    let country = if row.country.is_empty() {
        None
    } else {
        match countries::find_by_name(conn, &row.country)? {
            Some(existing) => Some(existing),
            None => {
                let created = countries::create(conn, &row.country)?;
                report.countries_created += 1;
                Some(created)
            }
        }
    };

    // A region cell without a country cell has nothing to hang off; ignored.
    let region = match (&country, row.region.is_empty()) {
        (Some(country), false) => {
            match regions::find_by_name(conn, &country.country_id, &row.region)? {
                Some(existing) => Some(existing),
                None => {
                    let created = regions::create(
                        conn,
                        &NewRegion {
                            name: row.region.clone(),
                            country_id: country.country_id.clone(),
                        },
                    )?;
                    report.regions_created += 1;
                    Some(created)
                }
            }
        }
        _ => None,
    };

    let producer = if row.producer.is_empty() {
        None
    } else {
        match producers::find_by_name(conn, &row.producer)? {
            Some(existing) => Some(existing),
            None => {
                let created = producers::create(
                    conn,
                    &NewProducer {
                        name: row.producer.clone(),
                        country_id: country.as_ref().map(|c| c.country_id.clone()),
                        region_id: region.as_ref().map(|r| r.region_id.clone()),
                    },
                )?;
                report.producers_created += 1;
                Some(created)
            }
        }
    };
    let producer_id = producer.map(|p| p.producer_id);

    let wine = match wines::find_by_name(conn, &row.wine, producer_id.as_deref())? {
        Some(existing) => existing,
        None => {
            let created = wines::create(
                conn,
                &NewWine {
                    name: row.wine.clone(),
                    colour: row.colour,
                    producer_id,
                    varietals: Vec::new(),
                },
            )?;
            report.wines_created += 1;
            created
        }
    };

    bottles::create(
        conn,
        &NewBottle {
            wine_id: Some(wine.wine_id),
            vintage: row.vintage,
            size_ml: row.size_ml,
            price_cents: row.price_cents,
            quantity: row.quantity,
            tags: row.tags.clone(),
        },
    )?;
    report.bottles_created += 1;
    Ok(())
}

fn check_header(header: &::csv::StringRecord) -> Result<()> {
    let got: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
    let want: Vec<String> = COLUMNS.iter().map(|c| c.to_lowercase()).collect();
    if got == want {
        Ok(())
    } else {
        Err(Error::InvalidValue(format!(
            "unexpected CSV header: expected '{}'",
            COLUMNS.join(", ")
        )))
    }
}

/// Import bottles from CSV, creating missing catalog rows along the way.
///
/// Rows are processed independently; failures are collected in the report
/// rather than aborting the file. Catalog rows created before a row fails
/// stay created.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] if the header does not match
/// [`COLUMNS`], or an error if the reader itself fails. Per-row failures
/// land in [`ImportReport::errors`] instead.
pub fn import<R: Read>(conn: &Connection, reader: R) -> Result<ImportReport> {
    let mut csv_reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    check_header(csv_reader.headers()?)?;

    let mut report = ImportReport::default();
    for (index, record) in csv_reader.records().enumerate() {
        // +2: 1-based lines, header on line 1.
        let line = index + 2;
        report.rows += 1;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                report.errors.push(RowError {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let outcome = parse_row(&record).and_then(|row| import_row(conn, &row, &mut report));
        if let Err(e) = outcome {
            tracing::warn!(line, error = %e, "import row rejected");
            report.errors.push(RowError {
                line,
                message: e.to_string(),
            });
        }
    }

    tracing::info!(
        rows = report.rows,
        bottles = report.bottles_created,
        errors = report.errors.len(),
        "csv import finished"
    );
    Ok(report)
}
