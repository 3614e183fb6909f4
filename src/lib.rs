pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    /// Compute and print every pair once
    Show,
    /// Keep refreshing every pair on the configured interval
    Watch,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ratiowatch starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = providers::from_config(&config);
    let opts = cli::monitor::RenderOptions::from_config(&config);

    match command {
        AppCommand::Show => cli::monitor::run(&config.pairs, provider.as_ref(), &opts).await,
        AppCommand::Watch => {
            cli::monitor::watch(
                &config.pairs,
                provider.as_ref(),
                &opts,
                config.refresh_interval_secs,
            )
            .await
        }
    }
}
