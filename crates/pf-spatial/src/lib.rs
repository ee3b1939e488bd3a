//! `pf-spatial` — road graph, spatial indexing, and routing.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`network`]    | `RoadGraph` (CSR generation), `RoadGraphBuilder`           |
//! | [`compose`]    | `GraphBuilder`, `compose` — regions → one graph            |
//! | [`source`]     | `RegionSource` trait, `RawRegion`, `MemorySource`          |
//! | [`speed`]      | `SpeedPolicy`, `maxspeed` parsing, class defaults          |
//! | [`components`] | `ComponentReport` (weakly connected components)            |
//! | [`index`]      | `SpatialIndex` (R-tree nearest node)                       |
//! | [`router`]     | `Router` trait, `DijkstraRouter`, `RouteEngine`, `Metric`  |
//! | [`osm`]        | `PbfSource` (feature = `"osm"` only)                       |
//! | [`error`]      | `SpatialError`, `BuildError`, `NoPathError`, `SnapError`   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables the OSM PBF region source via the `osmpbf` crate.    |

pub mod components;
pub mod compose;
pub mod error;
pub mod index;
pub mod network;
pub mod router;
pub mod source;
pub mod speed;

#[cfg(feature = "osm")]
pub mod osm;


pub use components::{ComponentReport, ComponentSize};
pub use compose::{compose, GraphBuilder};
pub use error::{
    BuildError, BuildResult, EmptyGraph, NoPathError, SnapError, SourceError, SpatialError, SpatialResult,
};
pub use index::SpatialIndex;
pub use network::{RoadGraph, RoadGraphBuilder};
pub use router::{DijkstraRouter, DualPath, DualRoute, Metric, PathResult, Route, RouteEngine, Router};
pub use source::{Gazetteer, MemorySource, RawEdge, RawNode, RawRegion, RegionSource};
pub use speed::SpeedPolicy;
