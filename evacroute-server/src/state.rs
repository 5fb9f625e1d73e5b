//! Shared handler state

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use evacroute_core::EvacuationService;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Context handed to every handler, built once at start
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EvacuationService>,
    pub roads_path: PathBuf,
    pub flood_path: PathBuf,
    pub route_timeout: Duration,
    /// Held while the road dataset is written and the graph swapped, so the
    /// file on disk and the graph in memory come from the same payload
    pub reload_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(service: Arc<EvacuationService>, config: &ServerConfig) -> Self {
        Self {
            service,
            roads_path: config.roads_path.clone(),
            flood_path: config.flood_path.clone(),
            route_timeout: config.route_timeout(),
            reload_lock: Arc::new(Mutex::new(())),
        }
    }
}
