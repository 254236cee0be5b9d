//! Canonical SQLite schema for the cellar store.
//!
//! The schema is normalized for queryability:
//! - catalog tables (`countries`, `regions`, `producers`, `wines`,
//!   `varietals`) hold the reference data bottles point at
//! - edge tables (`wine_varietals`, `bottle_tags`, `wishlist_tags`) model
//!   multi-valued relationships
//! - `bottles` and `wishlist` are the two inventories
//! - `cellar_meta` tracks the applied schema version

/// Migration v1: catalog, inventory, and metadata tables.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS countries (
    country_id TEXT PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE CHECK (length(trim(name)) > 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS regions (
    region_id TEXT PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE CHECK (length(trim(name)) > 0),
    country_id TEXT NOT NULL REFERENCES countries(country_id),
    created_at_us INTEGER NOT NULL,
    UNIQUE (country_id, name)
);

CREATE TABLE IF NOT EXISTS producers (
    producer_id TEXT PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE CHECK (length(trim(name)) > 0),
    country_id TEXT REFERENCES countries(country_id),
    region_id TEXT REFERENCES regions(region_id),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS wines (
    wine_id TEXT PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE CHECK (length(trim(name)) > 0),
    colour TEXT NOT NULL CHECK (colour IN ('red', 'white', 'rosé', 'sparkling', 'other')),
    producer_id TEXT REFERENCES producers(producer_id),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS varietals (
    varietal_id TEXT PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE CHECK (length(trim(name)) > 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS wine_varietals (
    wine_id TEXT NOT NULL REFERENCES wines(wine_id) ON DELETE CASCADE,
    varietal_id TEXT NOT NULL REFERENCES varietals(varietal_id),
    PRIMARY KEY (wine_id, varietal_id)
);

CREATE TABLE IF NOT EXISTS bottles (
    bottle_id TEXT PRIMARY KEY,
    wine_id TEXT REFERENCES wines(wine_id),
    vintage INTEGER CHECK (vintage IS NULL OR (vintage >= 1800 AND vintage <= 2200)),
    size_ml INTEGER NOT NULL DEFAULT 750 CHECK (size_ml > 0),
    price_cents INTEGER NOT NULL DEFAULT 0 CHECK (price_cents >= 0),
    quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 0),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS bottle_tags (
    bottle_id TEXT NOT NULL REFERENCES bottles(bottle_id) ON DELETE CASCADE,
    tag TEXT NOT NULL COLLATE NOCASE CHECK (length(trim(tag)) > 0),
    created_at_us INTEGER NOT NULL,
    PRIMARY KEY (bottle_id, tag)
);

CREATE TABLE IF NOT EXISTS wishlist (
    wishlist_id TEXT PRIMARY KEY,
    wine_id TEXT NOT NULL REFERENCES wines(wine_id),
    estimated_price_cents INTEGER NOT NULL DEFAULT 0 CHECK (estimated_price_cents >= 0),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS wishlist_tags (
    wishlist_id TEXT NOT NULL REFERENCES wishlist(wishlist_id) ON DELETE CASCADE,
    tag TEXT NOT NULL COLLATE NOCASE CHECK (length(trim(tag)) > 0),
    created_at_us INTEGER NOT NULL,
    PRIMARY KEY (wishlist_id, tag)
);

CREATE TABLE IF NOT EXISTS cellar_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO cellar_meta (id, schema_version) VALUES (1, 1);
"#;

/// Migration v2: read-path indexes.
pub const MIGRATION_V2_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_regions_country
    ON regions(country_id, name);

CREATE INDEX IF NOT EXISTS idx_producers_country
    ON producers(country_id);

CREATE INDEX IF NOT EXISTS idx_producers_region
    ON producers(region_id);

CREATE INDEX IF NOT EXISTS idx_wines_producer
    ON wines(producer_id);

CREATE INDEX IF NOT EXISTS idx_wines_colour_name
    ON wines(colour, name);

CREATE INDEX IF NOT EXISTS idx_wine_varietals_varietal
    ON wine_varietals(varietal_id, wine_id);

CREATE INDEX IF NOT EXISTS idx_bottles_wine
    ON bottles(wine_id);

CREATE INDEX IF NOT EXISTS idx_bottles_created
    ON bottles(created_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_bottle_tags_tag
    ON bottle_tags(tag, bottle_id);

CREATE INDEX IF NOT EXISTS idx_wishlist_wine
    ON wishlist(wine_id);

CREATE INDEX IF NOT EXISTS idx_wishlist_tags_tag
    ON wishlist_tags(tag, wishlist_id);
"#;

/// Indexes the read paths rely on; checked by migration tests.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_regions_country",
    "idx_producers_country",
    "idx_producers_region",
    "idx_wines_producer",
    "idx_wines_colour_name",
    "idx_wine_varietals_varietal",
    "idx_bottles_wine",
    "idx_bottles_created",
    "idx_bottle_tags_tag",
    "idx_wishlist_wine",
    "idx_wishlist_tags_tag",
];
