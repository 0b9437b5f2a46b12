use clap::Parser;
use tracing_subscriber::EnvFilter;

mod analytics;
mod cli;
mod commands;
mod config;
mod error;
mod models;
mod neo4j;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("staygraph=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from_path(cli.config.as_deref())?;
    cli.execute(config).await?;

    Ok(())
}
