//! Tunables shared by graph construction, flood overlay and routing

use serde::Deserialize;

use crate::{DEFAULT_COORDINATE_PRECISION, DEFAULT_OVERLAP_RATIO, Error};

/// Highest supported number of decimal places in node keys.
/// Beyond this, `f64` degrees no longer carry meaningful digits.
pub const MAX_COORDINATE_PRECISION: u32 = 12;

/// What to do when a second segment joins an already connected node pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateSegmentPolicy {
    /// The most recently inserted segment replaces the previous one
    #[default]
    Overwrite,
    /// The first inserted segment stays, later ones are dropped
    KeepFirst,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvacConfig {
    /// Minimal share of an edge inside a flood polygon that blocks it
    pub overlap_ratio: f64,
    /// Decimal places of latitude/longitude used for node identity
    pub coordinate_precision: u32,
    pub duplicate_segments: DuplicateSegmentPolicy,
}

impl Default for EvacConfig {
    fn default() -> Self {
        Self {
            overlap_ratio: DEFAULT_OVERLAP_RATIO,
            coordinate_precision: DEFAULT_COORDINATE_PRECISION,
            duplicate_segments: DuplicateSegmentPolicy::default(),
        }
    }
}

impl EvacConfig {
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the ratio is outside `(0, 1]`
    /// or the precision is above [`MAX_COORDINATE_PRECISION`]
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.overlap_ratio > 0.0 && self.overlap_ratio <= 1.0) {
            return Err(Error::Configuration(format!(
                "overlap_ratio must be in (0, 1], got {}",
                self.overlap_ratio
            )));
        }

        if self.coordinate_precision > MAX_COORDINATE_PRECISION {
            return Err(Error::Configuration(format!(
                "coordinate_precision must be at most {MAX_COORDINATE_PRECISION}, got {}",
                self.coordinate_precision
            )));
        }

        Ok(())
    }
}
