//! `cellar import`: bulk-load bottles from a CSV file.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use cellar_core::config::Config;

use crate::output::{OutputMode, json, kv};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import.
    pub file: PathBuf,
}

pub fn run(root: &Path, args: &ImportArgs, mode: OutputMode) -> Result<()> {
    let config = Config::load(root)?;
    let conn = cellar_core::db::open_store(&root.join(&config.database.path))?;

    let file = std::fs::File::open(&args.file)
        .with_context(|| format!("open {}", args.file.display()))?;
    let report = cellar_core::csv::import(&conn, file)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if mode.is_json() {
        json(&mut out, &report)?;
    } else {
        kv(&mut out, "Rows", report.rows.to_string())?;
        kv(&mut out, "Bottles added", report.bottles_created.to_string())?;
        kv(&mut out, "Wines added", report.wines_created.to_string())?;
        kv(
            &mut out,
            "Producers added",
            report.producers_created.to_string(),
        )?;
        kv(
            &mut out,
            "Countries added",
            report.countries_created.to_string(),
        )?;
        kv(&mut out, "Regions added", report.regions_created.to_string())?;
        if !report.errors.is_empty() {
            writeln!(out, "\nRejected rows:")?;
            for error in &report.errors {
                writeln!(out, "  line {}: {}", error.line, error.message)?;
            }
        }
    }

    if report.bottles_created == 0 && !report.errors.is_empty() {
        anyhow::bail!("no rows imported");
    }
    Ok(())
}
