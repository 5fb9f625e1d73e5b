//! Evacuation routing server

mod api;
mod config;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use evacroute_core::{Error, EvacuationService, GeoJsonFloodFile};
use tracing_subscriber::EnvFilter;

use crate::api::RequestLimits;
use crate::config::ServerConfig;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "evacroute-server", version, about = "Flood-aware evacuation routing API")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Address to listen on, overrides the config file
    #[arg(long)]
    listen: Option<SocketAddr>,
    /// Road network `GeoJSON`, overrides the config file
    #[arg(long)]
    roads: Option<PathBuf>,
    /// Flood extents `GeoJSON`, overrides the config file
    #[arg(long)]
    flood: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, Error> {
        let mut config = ServerConfig::load(self.config.as_deref())?;
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(roads) = self.roads {
            config.roads_path = roads;
        }
        if let Some(flood) = self.flood {
            config.flood_path = flood;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("evacroute_core=info,evacroute_server=info,tower_http=info")
        }))
        .init();

    let config = Cli::parse().into_config()?;
    tracing::info!(
        roads = %config.roads_path.display(),
        flood = %config.flood_path.display(),
        "Starting evacuation routing server"
    );

    let floods = Arc::new(GeoJsonFloodFile::new(config.flood_path.clone()));
    let roads_path = config.roads_path.clone();
    let routing = config.routing.clone();
    let service = tokio::task::spawn_blocking(move || {
        EvacuationService::from_geojson_file(&roads_path, floods, routing)
    })
    .await
    .map_err(|e| Error::Configuration(format!("road network loading aborted: {e}")))??;

    let stats = service.stats();
    tracing::info!(nodes = stats.nodes, edges = stats.edges, "Road network ready");

    let limits = RequestLimits {
        timeout: config.request_timeout(),
        concurrency: config.concurrency_limit,
    };
    let app = api::router(AppState::new(Arc::new(service), &config), limits);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!("Listening on {}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
