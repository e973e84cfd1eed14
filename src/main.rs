use anyhow::Result;
use clap::{Parser, Subcommand};
use slotwatch::commands::{simulate, validate};
use slotwatch::logging::init_tracing;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slotwatch")]
#[command(about = "Ad slot lifecycle monitor", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (overrides SLOTWATCH_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the ads configuration (file + ADSENSE_* environment) and check it
    Validate {
        /// Path to config.toml (default: <config dir>/slotwatch/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Replay a scripted slot lifecycle on a virtual clock
    Simulate {
        /// Path to the scenario file
        scenario: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { config } => validate::execute(config.as_deref()),
        Commands::Simulate { scenario, json } => simulate::execute(&scenario, json),
    }
}
