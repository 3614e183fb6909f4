use anyhow::Result;
use clap::{Parser, Subcommand};
use ratiowatch::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the latest ratio, its history and the aligned table (default)
    Show,
    /// Keep the display up to date, refreshing on the configured interval
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    match cli.command.unwrap_or(Commands::Show) {
        Commands::Setup => ratiowatch::cli::setup::setup(),
        Commands::Show => ratiowatch::run_command(ratiowatch::AppCommand::Show, config_path).await,
        Commands::Watch => {
            ratiowatch::run_command(ratiowatch::AppCommand::Watch, config_path).await
        }
    }
}
