//! Server configuration: TOML file with command line overrides

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use evacroute_core::{Error, EvacConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Persisted road dataset, read at start and rewritten on reload
    pub roads_path: PathBuf,
    /// Flood extents, re-read for every route request
    pub flood_path: PathBuf,
    /// Upper bound on a single route computation
    pub route_timeout_secs: u64,
    /// Upper bound on any request, enforced by the router
    pub request_timeout_secs: u64,
    pub concurrency_limit: usize,
    pub routing: EvacConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8000)),
            roads_path: PathBuf::from("data/roads.geojson"),
            flood_path: PathBuf::from("data/flood.geojson"),
            route_timeout_secs: 30,
            request_timeout_secs: 60,
            concurrency_limit: 64,
            routing: EvacConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads configuration from `path`, or uses defaults when no file is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// # Errors
    ///
    /// Returns [`Error::Configuration`] on malformed TOML or unknown keys.
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::Configuration(format!("invalid config: {e}")))
    }

    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for zero timeouts or limits and for
    /// invalid routing settings.
    pub fn validate(&self) -> Result<(), Error> {
        if self.route_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(Error::Configuration(
                "timeouts must be at least one second".to_string(),
            ));
        }
        if self.concurrency_limit == 0 {
            return Err(Error::Configuration(
                "concurrency_limit must be positive".to_string(),
            ));
        }
        self.routing.validate()
    }

    pub fn route_timeout(&self) -> Duration {
        Duration::from_secs(self.route_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
