//! Journal HTTP server binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use journal::JournalDb;
use journal::server::{CliArgs, JournalServer, JournalServerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let journal_config = match args.to_journal_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let server_config = JournalServerConfig::from(&args);

    tracing::info!("Opening journal with config: {:?}", journal_config);

    let journal = match JournalDb::open(journal_config).await {
        Ok(journal) => journal,
        Err(e) => {
            tracing::error!("Failed to open journal: {}", e);
            std::process::exit(1);
        }
    };

    let server = JournalServer::new(Arc::new(journal), server_config);
    if let Err(e) = server.run().await {
        tracing::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
