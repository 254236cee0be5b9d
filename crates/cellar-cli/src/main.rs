#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use output::OutputMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cellar: personal wine inventory",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Project directory holding cellar.toml and the database.
    #[arg(long, short = 'C', global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Initialize a cellar project",
        long_about = "Write a starter cellar.toml and create the database in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    cellar init\n\n    # Emit machine-readable output\n    cellar init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        about = "Run the HTTP API",
        long_about = "Serve the HTTP API in the foreground until interrupted.",
        after_help = "EXAMPLES:\n    # Serve on the configured port\n    cellar serve\n\n    # Override the port\n    cellar serve --port 9000"
    )]
    Serve(cmd::serve::ServeArgs),

    #[command(
        about = "Import bottles from CSV",
        long_about = "Bulk-load bottles from a CSV file, creating missing wines, producers, countries, and regions.",
        after_help = "EXAMPLES:\n    # Import a spreadsheet export\n    cellar import bottles.csv\n\n    # Emit the report as JSON\n    cellar import bottles.csv --json"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        about = "Export every bottle as CSV",
        after_help = "EXAMPLES:\n    # To stdout\n    cellar export\n\n    # To a file\n    cellar export --output cellar.csv"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        about = "Show cellar statistics",
        after_help = "EXAMPLES:\n    # Totals and colour breakdown\n    cellar stats\n\n    # Country and varietal breakdowns too\n    cellar stats --full\n\n    # Emit machine-readable output\n    cellar stats --json"
    )]
    Stats(cmd::stats::StatsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mode = cli.output_mode();
    match &cli.command {
        Commands::Init(args) => cmd::init::run(&cli.dir, args, mode),
        Commands::Serve(args) => cmd::serve::run(&cli.dir, args),
        Commands::Import(args) => cmd::import::run(&cli.dir, args, mode),
        Commands::Export(args) => cmd::export::run(&cli.dir, args),
        Commands::Stats(args) => cmd::stats::run(&cli.dir, args, mode),
    }
}
