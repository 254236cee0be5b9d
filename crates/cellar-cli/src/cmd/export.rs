//! `cellar export`: dump every bottle as CSV.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use cellar_core::config::Config;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write to a file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(root: &Path, args: &ExportArgs) -> Result<()> {
    let config = Config::load(root)?;
    let conn = cellar_core::db::open_store(&root.join(&config.database.path))?;

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("create {}", path.display()))?;
            let rows = cellar_core::csv::export(&conn, file)?;
            eprintln!("Exported {rows} bottles to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            cellar_core::csv::export(&conn, stdout.lock())?;
        }
    }
    Ok(())
}
