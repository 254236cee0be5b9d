//! `cellar stats`: aggregate cellar statistics.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use cellar_core::config::Config;
use cellar_core::store::stats::{CellarStats, GroupStat};

use crate::output::{OutputMode, dollars, json, kv};

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Include the per-country and per-varietal breakdowns.
    #[arg(long)]
    pub full: bool,
}

pub fn run(root: &Path, args: &StatsArgs, mode: OutputMode) -> Result<()> {
    let config = Config::load(root)?;
    let conn = cellar_core::db::open_store(&root.join(&config.database.path))?;
    let stats = cellar_core::store::stats::summary(&conn)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if mode.is_json() {
        json(&mut out, &stats)?;
    } else {
        render_human(&mut out, &stats, args.full)?;
    }
    Ok(())
}

fn render_human(out: &mut dyn std::io::Write, stats: &CellarStats, full: bool) -> Result<()> {
    kv(out, "Bottles", stats.total_bottles.to_string())?;
    kv(out, "Slots", stats.total_slots.to_string())?;
    kv(out, "Distinct wines", stats.distinct_wines.to_string())?;
    kv(out, "Cellar value", dollars(stats.total_value_cents))?;
    kv(out, "Wishlist", stats.wishlist_entries.to_string())?;

    render_group(out, "By colour", &stats.by_colour)?;
    if full {
        render_group(out, "By country", &stats.by_country)?;
        render_group(out, "By varietal", &stats.by_varietal)?;
    }
    Ok(())
}

fn render_group(out: &mut dyn std::io::Write, heading: &str, group: &[GroupStat]) -> Result<()> {
    if group.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{heading}")?;
    for stat in group {
        writeln!(
            out,
            "  {:<24} {:>5}  {:>12}",
            stat.name,
            stat.bottles,
            dollars(stat.value_cents)
        )?;
    }
    Ok(())
}
