//! Domain types shared by the store, API, and CLI.
//!
//! Rows mirror the normalized SQLite schema; the `*Details` types carry the
//! joined shape the API serves (a bottle with its wine, producer, country,
//! region, varietals, and tags in one payload).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Wine colour classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WineColour {
    Red,
    White,
    #[serde(rename = "rosé")]
    Rose,
    Sparkling,
    Other,
}

impl WineColour {
    /// All colours, in display order.
    pub const ALL: [Self; 5] = [
        Self::Red,
        Self::White,
        Self::Rose,
        Self::Sparkling,
        Self::Other,
    ];

    /// Canonical lowercase name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::White => "white",
            Self::Rose => "rosé",
            Self::Sparkling => "sparkling",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for WineColour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WineColour {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "white" => Ok(Self::White),
            "rosé" | "rose" => Ok(Self::Rose),
            "sparkling" => Ok(Self::Sparkling),
            "other" => Ok(Self::Other),
            other => Err(Error::InvalidColour(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub country_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub region_id: String,
    pub name: String,
    pub country_id: String,
    /// Joined country name, present on list/detail reads.
    pub country_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    pub producer_id: String,
    pub name: String,
    pub country_id: Option<String>,
    pub region_id: Option<String>,
    pub country_name: Option<String>,
    pub region_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Varietal {
    pub varietal_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wine {
    pub wine_id: String,
    pub name: String,
    pub colour: WineColour,
    pub producer_id: Option<String>,
    pub producer_name: Option<String>,
    /// Varietal names, sorted, present on list/detail reads.
    pub varietals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bottle {
    pub bottle_id: String,
    pub wine_id: Option<String>,
    pub vintage: Option<i32>,
    pub size_ml: i64,
    pub price_cents: i64,
    pub quantity: i64,
    pub tags: Vec<String>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// A bottle joined with its wine, producer, and origin names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottleDetails {
    #[serde(flatten)]
    pub bottle: Bottle,
    pub wine_name: Option<String>,
    pub colour: Option<WineColour>,
    pub producer_name: Option<String>,
    pub country_name: Option<String>,
    pub region_name: Option<String>,
    pub varietals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub wishlist_id: String,
    pub wine_id: String,
    pub estimated_price_cents: i64,
    pub tags: Vec<String>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// A wishlist item joined with its wine and producer names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistDetails {
    #[serde(flatten)]
    pub item: WishlistItem,
    pub wine_name: String,
    pub colour: WineColour,
    pub producer_name: Option<String>,
    pub country_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NewRegion {
    pub name: String,
    pub country_id: String,
}

/// Partial update; only provided fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionUpdate {
    pub name: Option<String>,
    pub country_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProducer {
    pub name: String,
    pub country_id: Option<String>,
    pub region_id: Option<String>,
}

/// Partial update; the double `Option` distinguishes "leave alone" from
/// "clear".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProducerUpdate {
    pub name: Option<String>,
    pub country_id: Option<Option<String>>,
    pub region_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWine {
    pub name: String,
    pub colour: WineColour,
    pub producer_id: Option<String>,
    /// Varietal names; missing ones are created on the fly.
    #[serde(default)]
    pub varietals: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WineUpdate {
    pub name: Option<String>,
    pub colour: Option<WineColour>,
    pub producer_id: Option<Option<String>>,
    /// `Some` replaces the full varietal set atomically.
    pub varietals: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBottle {
    pub wine_id: Option<String>,
    pub vintage: Option<i32>,
    pub size_ml: i64,
    pub price_cents: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

const fn default_quantity() -> i64 {
    1
}

/// Partial update; only provided fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BottleUpdate {
    pub wine_id: Option<Option<String>>,
    pub vintage: Option<Option<i32>>,
    pub size_ml: Option<i64>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWishlistItem {
    pub wine_id: String,
    #[serde(default)]
    pub estimated_price_cents: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WishlistUpdate {
    pub estimated_price_cents: Option<i64>,
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::WineColour;

    #[test]
    fn colour_parse_roundtrip() {
        for colour in WineColour::ALL {
            let parsed: WineColour = colour.as_str().parse().expect("parse canonical name");
            assert_eq!(colour, parsed);
        }
    }

    #[test]
    fn colour_parse_accepts_ascii_rose_and_case() {
        assert_eq!("rose".parse::<WineColour>().unwrap(), WineColour::Rose);
        assert_eq!("Rosé".parse::<WineColour>().unwrap(), WineColour::Rose);
        assert_eq!(" RED ".parse::<WineColour>().unwrap(), WineColour::Red);
    }

    #[test]
    fn colour_parse_rejects_unknown() {
        assert!("orange".parse::<WineColour>().is_err());
    }

    #[test]
    fn colour_serde_uses_database_names() {
        let json = serde_json::to_string(&WineColour::Rose).unwrap();
        assert_eq!(json, "\"rosé\"");
        let back: WineColour = serde_json::from_str("\"sparkling\"").unwrap();
        assert_eq!(back, WineColour::Sparkling);
    }
}
