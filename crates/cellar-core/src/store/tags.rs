//! Tag inventory across bottles and the wishlist.

use rusqlite::{Connection, params};

use crate::error::Result;

/// Global tag usage row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// List tags across both inventories with usage counts, most used first.
///
/// Spellings that differ only by case are folded into the first one seen.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list(conn: &Connection) -> Result<Vec<TagCount>> {
    let mut stmt = conn.prepare(
        "SELECT tag, COUNT(*) AS count FROM (
             SELECT tag FROM bottle_tags
             UNION ALL
             SELECT tag FROM wishlist_tags
         )
         GROUP BY tag COLLATE NOCASE
         ORDER BY count DESC, tag COLLATE NOCASE ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        let count: i64 = row.get(1)?;
        Ok(TagCount {
            name: row.get(0)?,
            count: usize::try_from(count).unwrap_or(usize::MAX),
        })
    })?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row?);
    }
    Ok(tags)
}

/// Autocomplete: tags containing `fragment` (case-insensitive), most used
/// first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn suggest(conn: &Connection, fragment: &str, limit: u32) -> Result<Vec<String>> {
    let pattern = format!("%{}%", like_escape(fragment.trim()));
    let mut stmt = conn.prepare(
        "SELECT tag, COUNT(*) AS count FROM (
             SELECT tag FROM bottle_tags
             UNION ALL
             SELECT tag FROM wishlist_tags
         )
         WHERE tag LIKE ?1 ESCAPE '\\'
         GROUP BY tag COLLATE NOCASE
         ORDER BY count DESC, tag COLLATE NOCASE ASC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![pattern, limit], |row| row.get(0))?;

    let mut suggestions = Vec::new();
    for row in rows {
        suggestions.push(row?);
    }
    Ok(suggestions)
}

// LIKE wildcards in user input must match literally.
fn like_escape(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
