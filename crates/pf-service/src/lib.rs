//! `pf-service` — the routing service core behind the transport layer.
//!
//! # Request flow
//!
//! ```text
//! ShortestPathById(a, b)
//!   ① registry.current()          — one Arc<Generation> for the whole query
//!   ② RouteEngine::dual_path       — travel time ∥ length (rayon::join)
//!   ③ ShortestPathResponse         — paths or per-metric error messages
//!
//! Reconfigure(descriptors)
//!   ① GraphBuilder::build          — fetch regions in parallel, compose
//!   ② SpatialIndex::build
//!   ③ registry swap                — only on success
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pf_service::{PathfinderService, ServiceConfig};
//!
//! let config = ServiceConfig::load_or_default(Path::new("config.json"))?;
//! let service = PathfinderService::start(Arc::new(source), &config)?;
//! let response = service.shortest_path_by_id(NodeId(1), NodeId(42));
//! println!("{}", serde_json::to_string(&response)?);
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod registry;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::ServiceConfig;
pub use dto::{
    Coordinates, GraphSnapshot, Health, ReconfigureRequest, ShortestPathByCoordinatesRequest,
    ShortestPathByIdRequest, ShortestPathResponse, Vertex,
};
pub use error::{ServiceError, ServiceResult};
pub use registry::{Generation, GraphRegistry};
pub use service::PathfinderService;
