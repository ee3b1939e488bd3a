//! Request/response payloads for the transport layer.
//!
//! Results are explicit structs with named optional fields; JSON exists only
//! at this boundary.

use serde::{Deserialize, Serialize};

use std::str::FromStr;

use serde_json::Value;

use pf_core::{descriptors_from_value, parse_descriptors, CoreError, GeoPoint, NodeId, RegionDescriptor};
use pf_spatial::{DualPath, NoPathError, Metric};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    #[serde(alias = "long")]
    pub lon: f64,
}

impl From<GeoPoint> for Coordinates {
    fn from(p: GeoPoint) -> Self {
        Coordinates { lat: p.lat, lon: p.lon }
    }
}

impl From<Coordinates> for GeoPoint {
    fn from(c: Coordinates) -> Self {
        GeoPoint::new(c.lat, c.lon)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortestPathByIdRequest {
    pub source_id: NodeId,
    pub target_id: NodeId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShortestPathByCoordinatesRequest {
    pub source: Coordinates,
    pub target: Coordinates,
}

/// Both metrics for one query.  `error` is set when at least one metric
/// failed; each path is `null` exactly when its metric failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortestPathResponse {
    pub error:                   Option<String>,
    pub shortest_by_travel_time: Option<Vec<Coordinates>>,
    pub shortest_by_length:      Option<Vec<Coordinates>>,
}

impl ShortestPathResponse {
    /// A response where neither metric ran.
    pub fn failure(message: impl Into<String>) -> Self {
        ShortestPathResponse {
            error:                   Some(message.into()),
            shortest_by_travel_time: None,
            shortest_by_length:      None,
        }
    }

    pub fn from_dual(dual: DualPath) -> Self {
        let mut errors: Vec<String> = Vec::new();
        let mut keep = |metric: Metric, result: Result<Vec<GeoPoint>, NoPathError>| match result {
            Ok(path) => Some(path.into_iter().map(Coordinates::from).collect()),
            Err(e) => {
                let message = e.to_string();
                if !errors.contains(&message) {
                    errors.push(message);
                }
                tracing::debug!(%metric, error = %e, "no path");
                None
            }
        };
        let shortest_by_travel_time = keep(Metric::TravelTime, dual.travel_time);
        let shortest_by_length      = keep(Metric::Length, dual.length);

        ShortestPathResponse {
            error: (!errors.is_empty()).then(|| errors.join("; ")),
            shortest_by_travel_time,
            shortest_by_length,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id:  NodeId,
    pub lat: f64,
    pub lon: f64,
}

/// Full dump of one generation, for visualization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub error:    Option<String>,
    pub vertices: Option<Vec<Vertex>>,
    /// One polyline per directed edge: source, shape points, target.
    pub edges:    Option<Vec<Vec<Coordinates>>>,
}

/// Body of a reconfiguration: `{"locations": [...]}`, a bare array of
/// descriptors, or a single descriptor object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ReconfigureRequest {
    pub locations: Vec<RegionDescriptor>,
}

impl TryFrom<Value> for ReconfigureRequest {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self, CoreError> {
        Ok(ReconfigureRequest { locations: descriptors_from_value(value)? })
    }
}

impl FromStr for ReconfigureRequest {
    type Err = CoreError;

    fn from_str(body: &str) -> Result<Self, CoreError> {
        Ok(ReconfigureRequest { locations: parse_descriptors(body)? })
    }
}

/// Liveness and load state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub loaded:     bool,
    pub epoch:      Option<u64>,
    pub nodes:      usize,
    pub edges:      usize,
    pub components: usize,
}
