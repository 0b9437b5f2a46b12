use clap::{Parser, Subcommand, ValueEnum};

use crate::commands;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "staygraph", about = "Descriptive statistics over a listings graph")]
pub struct Cli {
    /// JSON configuration file (defaults to ./config.json when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect the graph statistics report
    Report {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Maximum number of metric queries in flight
        #[arg(long)]
        workers: Option<usize>,
        /// Per-query timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Summarise hosts and listings
    Hosts {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Check that the database is reachable and the credentials are accepted
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    pub async fn execute(self, config: Config) -> anyhow::Result<()> {
        match self.command {
            Commands::Report {
                format,
                workers,
                timeout,
            } => {
                let mut config = config;
                if let Some(workers) = workers {
                    config.max_concurrent_queries = workers;
                }
                if let Some(timeout) = timeout {
                    config.query_timeout_secs = timeout;
                }
                config.validate()?;
                commands::report::handle_report(config, format).await
            }
            Commands::Hosts { format } => commands::report::handle_hosts(config, format).await,
            Commands::Ping => commands::database::handle_ping(config).await,
        }
    }
}
