//! Spatial-subsystem error types.
//!
//! Build failures and query failures are kept apart: a [`BuildError`] aborts
//! a whole rebuild, while a [`NoPathError`] is a per-query, per-metric
//! outcome that the service reports in its response payload.

use thiserror::Error;

use pf_core::{GeoPoint, NodeId};

/// Errors from constructing a single [`RoadGraph`](crate::RoadGraph).
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("edge {from} -> {to} references a node that is not in the graph")]
    DanglingEdge { from: NodeId, to: NodeId },

    #[error("edge {from} -> {to} has invalid weights (length {length_m} m, speed {speed_mps} m/s)")]
    InvalidWeight {
        from:      NodeId,
        to:        NodeId,
        length_m:  f64,
        speed_mps: f64,
    },

    #[error("edge {from} -> {to} has a non-finite travel time")]
    InvalidTravelTime { from: NodeId, to: NodeId },

    #[error("speed {kph} km/h is not usable")]
    InvalidSpeed { kph: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

/// Errors reported by a [`RegionSource`](crate::RegionSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The region is unknown to the provider or contains no drivable roads.
    #[error("no road data for {0}")]
    NotFound(String),

    /// The provider could not be reached or returned unusable data.
    #[error("region source unavailable: {0}")]
    Unavailable(String),
}

/// Errors that abort a graph build.  A failed build never publishes.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No descriptors were given, a descriptor was malformed, or one of them
    /// yielded no usable road data.
    #[error("no valid location: {0}")]
    NoValidLocation(String),

    /// The region source failed to deliver data.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The composed data could not be turned into a consistent graph.
    #[error("graph construction failed: {0}")]
    Graph(#[from] SpatialError),
}

impl From<SourceError> for BuildError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::NotFound(what) => BuildError::NoValidLocation(what),
            SourceError::Unavailable(why) => BuildError::SourceUnavailable(why),
        }
    }
}

impl From<pf_core::CoreError> for BuildError {
    fn from(e: pf_core::CoreError) -> Self {
        BuildError::NoValidLocation(e.to_string())
    }
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Why a shortest-path query produced no path.  Decided per metric.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NoPathError {
    #[error("node {0} not found in graph")]
    UnknownNode(NodeId),

    #[error("no path from {from} to {to}")]
    Unreachable { from: NodeId, to: NodeId },
}

/// A query arrived before any graph generation was published, or the
/// generation has no nodes to snap to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("graph is empty")]
pub struct EmptyGraph;

/// Why a coordinate could not be snapped to a node.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum SnapError {
    #[error(transparent)]
    Empty(#[from] EmptyGraph),

    /// Non-finite or outside WGS-84 range.
    #[error("invalid coordinate {0}")]
    InvalidCoordinate(GeoPoint),
}
