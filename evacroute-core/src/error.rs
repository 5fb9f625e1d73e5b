use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    #[error("Geometry error: {0}")]
    Geometry(String),
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

impl Error {
    /// Errors that leave the caller with nothing to read rather than
    /// something broken. Callers may degrade to empty data on these.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Error::DataUnavailable(_))
    }
}
