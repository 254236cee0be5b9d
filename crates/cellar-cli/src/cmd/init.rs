//! `cellar init`: write a starter config and create the database.

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use cellar_core::config::Config;

use crate::output::{OutputMode, json, kv};

const CONFIG_TEMPLATE: &str = r#"# cellar configuration

[server]
host = "127.0.0.1"
port = 8640
# Browser origins allowed to call the API (leave empty for same-origin only).
allowed_origins = []

[database]
path = "cellar.sqlite3"

[auth]
# Set a password to require login, or export CELLAR_PASSWORD instead.
# password = "change-me"

[guest]
# Allow read-only access without a session.
enabled = false
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing cellar.toml.
    #[arg(long)]
    pub force: bool,
}

#[derive(serde::Serialize)]
struct InitReport<'a> {
    config_path: &'a str,
    config_written: bool,
    database_path: String,
    schema_version: u32,
}

pub fn run(root: &Path, args: &InitArgs, mode: OutputMode) -> Result<()> {
    let config_path = root.join("cellar.toml");
    let config_written = args.force || !config_path.exists();
    if config_written {
        std::fs::write(&config_path, CONFIG_TEMPLATE)
            .with_context(|| format!("write {}", config_path.display()))?;
    }

    let config = Config::load(root)?;
    let db_path = root.join(&config.database.path);
    let conn = cellar_core::db::open_store(&db_path)?;
    let schema_version = cellar_core::db::migrations::current_schema_version(&conn)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if mode.is_json() {
        json(
            &mut out,
            &InitReport {
                config_path: "cellar.toml",
                config_written,
                database_path: config.database.path.display().to_string(),
                schema_version,
            },
        )?;
    } else {
        if config_written {
            writeln!(out, "Wrote cellar.toml")?;
        } else {
            writeln!(out, "cellar.toml already exists, left untouched")?;
        }
        kv(&mut out, "Database", db_path.display().to_string())?;
        kv(&mut out, "Schema", format!("v{schema_version}"))?;
    }
    Ok(())
}
