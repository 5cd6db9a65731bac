mod commands;

use clap::Parser;
use commands::{execute_command, Commands};
use scrobble_import::ConfigPersistence;

/// Offline scrobble importer for CSV play logs and concert setlists
#[derive(Parser)]
#[command(
    name = "scrobble-import",
    about = "Plan scrobbles from CSV play logs and concert setlists",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match ConfigPersistence::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config: {e}");
            eprintln!("   Run `scrobble-import config init` to write a fresh one.");
            std::process::exit(1);
        }
    };

    if let Err(e) = execute_command(args.command, config).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
