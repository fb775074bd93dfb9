use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let mut logger = env_logger::Builder::from_default_env();
    if config.debug {
        logger.filter_module("pipedrive", LevelFilter::Debug);
    }
    logger.init();

    info!("Starting pipedrive-cli");

    if !cli::commands::run(cli.command, &config).await? {
        std::process::exit(1);
    }
    Ok(())
}
