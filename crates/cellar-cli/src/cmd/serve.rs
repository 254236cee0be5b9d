//! `cellar serve`: run the HTTP API in the foreground.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use cellar_core::config::Config;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the listen port from cellar.toml.
    #[arg(long)]
    pub port: Option<u16>,
}

pub fn run(root: &Path, args: &ServeArgs) -> Result<()> {
    let mut config = Config::load(root)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    // Database path is relative to the project root, not the cwd.
    config.database.path = root.join(&config.database.path);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    runtime.block_on(cellar_api::serve(config))
}
