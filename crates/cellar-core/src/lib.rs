//! cellar-core library.
//!
//! Domain model and SQLite store for a personal wine-cellar inventory:
//! countries, regions, producers, wines, varietals, bottles, and a wishlist,
//! plus tag inventory, aggregate statistics, and CSV interchange.

pub mod config;
pub mod csv;
pub mod db;
pub mod error;
pub mod model;
pub mod store;

pub use error::{Error, Result};
