//! Region descriptors — what area of the road network to ingest.
//!
//! # Wire shape
//!
//! ```json
//! { "type": "location", "location": "Stuttgart, Baden-Württemberg, Germany" }
//! { "type": "bbox", "bbox": [48.6920188, 9.0386007, 48.8663994, 9.3160228] }
//! ```
//!
//! `bbox` is `[minLat, minLon, maxLat, maxLon]`.  Any other `type`, a missing
//! field, or a malformed box is rejected at parse time with
//! [`CoreError::InvalidDescriptor`], before a build ever starts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BoundingBox, CoreError, CoreResult};

/// A geographic area to ingest: a named place or an explicit bounding box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireDescriptor", into = "WireDescriptor")]
pub enum RegionDescriptor {
    PlaceName(String),
    BoundingBox(BoundingBox),
}

impl RegionDescriptor {
    /// Convenience constructor for a place name.
    pub fn place(name: impl Into<String>) -> Self {
        RegionDescriptor::PlaceName(name.into())
    }

    /// Convenience constructor for a validated bounding box.
    pub fn bbox(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> CoreResult<Self> {
        BoundingBox::new(min_lat, min_lon, max_lat, max_lon).map(RegionDescriptor::BoundingBox)
    }

    /// Parse a single descriptor from a JSON value.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        let wire: WireDescriptor = serde_json::from_value(value)
            .map_err(|e| CoreError::InvalidDescriptor(e.to_string()))?;
        RegionDescriptor::try_from(wire)
    }
}

impl std::fmt::Display for RegionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionDescriptor::PlaceName(name) => write!(f, "place {name:?}"),
            RegionDescriptor::BoundingBox(bbox) => write!(f, "bbox {bbox}"),
        }
    }
}

/// Parse an ordered descriptor list.
///
/// Accepts a bare JSON array of descriptors, an object of the form
/// `{"locations": [...]}` (the persisted configuration shape), or a single
/// descriptor object.  Fails on the first invalid entry; an empty list is
/// also rejected since it can never produce a routable graph.
pub fn parse_descriptors(json: &str) -> CoreResult<Vec<RegionDescriptor>> {
    descriptors_from_value(serde_json::from_str(json)?)
}

/// [`parse_descriptors`] over an already-parsed JSON value.
pub fn descriptors_from_value(value: Value) -> CoreResult<Vec<RegionDescriptor>> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(obj) if obj.contains_key("type") => vec![Value::Object(obj)],
        Value::Object(mut obj) => match obj.remove("locations") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(CoreError::InvalidDescriptor(
                    "expected a \"locations\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(CoreError::InvalidDescriptor(
                "expected an array of region descriptors".to_string(),
            ))
        }
    };
    if entries.is_empty() {
        return Err(CoreError::InvalidDescriptor("no region descriptors given".to_string()));
    }
    entries.into_iter().map(RegionDescriptor::from_value).collect()
}

// ── Wire representation ───────────────────────────────────────────────────────

/// Loosely typed JSON form; only ever converted into the closed enum.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct WireDescriptor {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bbox: Option<Vec<f64>>,
}

impl TryFrom<WireDescriptor> for RegionDescriptor {
    type Error = CoreError;

    fn try_from(wire: WireDescriptor) -> CoreResult<Self> {
        match (wire.kind.as_str(), wire.location, wire.bbox) {
            ("location", Some(name), _) => {
                if name.trim().is_empty() {
                    return Err(CoreError::InvalidDescriptor("empty place name".to_string()));
                }
                Ok(RegionDescriptor::PlaceName(name))
            }
            ("bbox", _, Some(b)) => match b.as_slice() {
                &[min_lat, min_lon, max_lat, max_lon] => {
                    RegionDescriptor::bbox(min_lat, min_lon, max_lat, max_lon)
                }
                other => Err(CoreError::InvalidDescriptor(format!(
                    "bbox needs 4 numbers, got {}",
                    other.len()
                ))),
            },
            ("location", None, _) => Err(CoreError::InvalidDescriptor(
                "descriptor of type \"location\" has no \"location\" field".to_string(),
            )),
            ("bbox", _, None) => Err(CoreError::InvalidDescriptor(
                "descriptor of type \"bbox\" has no \"bbox\" field".to_string(),
            )),
            (kind, _, _) => Err(CoreError::InvalidDescriptor(format!(
                "unknown descriptor type {kind:?}"
            ))),
        }
    }
}

impl From<RegionDescriptor> for WireDescriptor {
    fn from(region: RegionDescriptor) -> Self {
        match region {
            RegionDescriptor::PlaceName(name) => WireDescriptor {
                kind: "location".to_string(),
                location: Some(name),
                bbox: None,
            },
            RegionDescriptor::BoundingBox(b) => WireDescriptor {
                kind: "bbox".to_string(),
                location: None,
                bbox: Some(vec![b.min_lat, b.min_lon, b.max_lat, b.max_lon]),
            },
        }
    }
}
