//! Service configuration.
//!
//! # File format
//!
//! ```json
//! {
//!   "locations": [
//!     { "type": "location", "location": "Stuttgart, Baden-Württemberg, Germany" },
//!     { "type": "bbox", "bbox": [48.6920188, 9.0386007, 48.8663994, 9.3160228] }
//!   ],
//!   "fallbackSpeedKph": 50
//! }
//! ```
//!
//! A bare descriptor object or a bare array of descriptors is also accepted
//! in place of the full object.  `fallbackSpeedKph` is optional.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;

use pf_core::{descriptors_from_value, BoundingBox, CoreError, CoreResult, RegionDescriptor};
use pf_spatial::speed::DEFAULT_FALLBACK_KPH;
use pf_spatial::SpeedPolicy;

/// Looked up in the working directory at startup.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const STUTTGART_PLACE: &str = "Stuttgart, Baden-Württemberg, Germany";

/// `[minLat, minLon, maxLat, maxLon]`.
pub const STUTTGART_BBOX: [f64; 4] = [48.6920188, 9.0386007, 48.8663994, 9.3160228];

/// What the service loads and how it weights edges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Regions composed into the routable graph, in order.
    pub locations: Vec<RegionDescriptor>,

    /// Speed for edges with neither a usable `maxspeed` nor a known road
    /// class, in km/h.
    #[serde(default = "default_fallback_kph", deserialize_with = "deserialize_fallback_kph")]
    pub fallback_speed_kph: f64,
}

fn default_fallback_kph() -> f64 {
    DEFAULT_FALLBACK_KPH
}

fn deserialize_fallback_kph<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let kph = f64::deserialize(deserializer)?;
    checked_fallback(kph).map_err(serde::de::Error::custom)
}

fn checked_fallback(kph: f64) -> CoreResult<f64> {
    SpeedPolicy::with_fallback_kph(kph)
        .map(|policy| policy.fallback_kph())
        .map_err(|e| CoreError::Config(format!("fallbackSpeedKph: {e}")))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let [min_lat, min_lon, max_lat, max_lon] = STUTTGART_BBOX;
        ServiceConfig {
            locations: vec![
                RegionDescriptor::place(STUTTGART_PLACE),
                RegionDescriptor::BoundingBox(BoundingBox { min_lat, min_lon, max_lat, max_lon }),
            ],
            fallback_speed_kph: DEFAULT_FALLBACK_KPH,
        }
    }
}

impl ServiceConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Config`] for malformed JSON or a bad fallback speed.
    /// - [`CoreError::InvalidDescriptor`] for an unknown or incomplete
    ///   region shape, or an empty location list.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))?;

        let fallback_speed_kph = match value.get("fallbackSpeedKph") {
            None => DEFAULT_FALLBACK_KPH,
            Some(v) => {
                let kph = v.as_f64().ok_or_else(|| {
                    CoreError::Config(format!("fallbackSpeedKph must be a number, got {v}"))
                })?;
                checked_fallback(kph)?
            }
        };
        let locations = descriptors_from_value(value)?;

        Ok(ServiceConfig { locations, fallback_speed_kph })
    }

    /// Read and parse the file at `path`.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// [`from_path`](Self::from_path) if the file exists, otherwise the
    /// built-in default.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        if path.is_file() {
            let config = Self::from_path(path)?;
            info!(path = %path.display(), locations = config.locations.len(), "using custom config file");
            Ok(config)
        } else {
            info!(path = %path.display(), "no config file; using built-in default");
            Ok(Self::default())
        }
    }

    /// The edge speed policy for this configuration.
    ///
    /// # Errors
    ///
    /// [`CoreError::Config`] if `fallback_speed_kph` was set to an unusable
    /// value after parsing.
    pub fn speed_policy(&self) -> CoreResult<SpeedPolicy> {
        SpeedPolicy::with_fallback_kph(self.fallback_speed_kph)
            .map_err(|e| CoreError::Config(format!("fallbackSpeedKph: {e}")))
    }
}
