//! Typed query and mutation layer over the cellar database.
//!
//! Functions take a shared `&Connection` and return [`crate::Result`] with
//! typed structs (never raw rows). Mutations that touch more than one table
//! run inside a single transaction.

pub mod bottles;
pub mod countries;
pub mod moves;
pub mod producers;
pub mod regions;
pub mod stats;
pub mod tags;
pub mod varietals;
pub mod wines;
pub mod wishlist;

use crate::error::{Error, Result};

/// Generate a fresh row id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current wall-clock time in microseconds since the Unix epoch.
#[must_use]
pub fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

/// Trim a user-supplied name, rejecting empty results.
pub(crate) fn normalize_name(entity: &'static str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyName { entity });
    }
    Ok(trimmed.to_string())
}

/// Trim tags, drop empties, and dedupe case-insensitively keeping the first
/// spelling seen. Output is sorted for stable rendering.
pub(crate) fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }
    out.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
    out
}
