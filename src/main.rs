use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing_subscriber::EnvFilter;

use booking_scout::adapters::graphql::client::BookingGraphQLClient;
use booking_scout::adapters::headers::{EnvFileHeaderProvider, EnvHeaderProvider};
use booking_scout::adapters::store::memory_store::MemoryResultStore;
use booking_scout::config::load_config;
use booking_scout::mcp::server::BookingMcpServer;
use booking_scout::ports::header_provider::HeaderProvider;

fn find_config_path() -> PathBuf {
    let candidates = [PathBuf::from("config.yaml"), exe_dir().join("config.yaml")];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting booking-scout server");

    let config_path = find_config_path();
    let config = load_config(&config_path)?;

    let api = Arc::new(BookingGraphQLClient::new(&config.api)?);
    tracing::info!(endpoint = %api.endpoint(), "Search endpoint configured");

    let header_provider: Arc<dyn HeaderProvider> = match &config.api.headers_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Reading session headers from file");
            Arc::new(EnvFileHeaderProvider::new(
                path.clone(),
                Duration::from_secs(config.api.headers_reload_secs),
            ))
        }
        None => {
            tracing::info!("Reading session headers from the environment");
            Arc::new(EnvHeaderProvider::from_env())
        }
    };

    let store = Arc::new(MemoryResultStore::new(config.store.max_searches));

    let server = BookingMcpServer::new(api, header_provider, store, config);

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
