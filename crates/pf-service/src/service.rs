//! Query and reconfiguration front end.
//!
//! Every query reads the registry once and answers entirely from that
//! generation.  Query failures never escape as `Err`: they are reported in
//! the response's `error` field alongside `null` results.

use std::sync::Arc;

use tracing::{debug, info};

use pf_core::{GeoPoint, NodeId, RegionDescriptor};
use pf_spatial::{BuildResult, GraphBuilder, RegionSource};

use crate::config::ServiceConfig;
use crate::dto::{Coordinates, GraphSnapshot, Health, ReconfigureRequest, ShortestPathResponse, Vertex};
use crate::registry::GraphRegistry;
use crate::ServiceResult;

pub struct PathfinderService {
    registry: GraphRegistry,
}

impl PathfinderService {
    /// A service with no graph loaded yet.
    pub fn new(builder: GraphBuilder) -> Self {
        PathfinderService { registry: GraphRegistry::new(builder) }
    }

    /// A service over `source` that weights edges per `config`.  No graph is
    /// loaded yet.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Config`](crate::ServiceError::Config) if the
    /// configured fallback speed is unusable.
    pub fn with_config(source: Arc<dyn RegionSource>, config: &ServiceConfig) -> ServiceResult<Self> {
        Ok(Self::new(GraphBuilder::new(source, config.speed_policy()?)))
    }

    /// [`with_config`](Self::with_config) followed by an initial build of
    /// `config.locations`.
    pub fn start(source: Arc<dyn RegionSource>, config: &ServiceConfig) -> ServiceResult<Self> {
        let service = Self::with_config(source, config)?;
        service.reconfigure(config.locations.clone())?;
        Ok(service)
    }

    pub fn registry(&self) -> &GraphRegistry {
        &self.registry
    }

    /// Fastest and shortest path between two provider node ids.
    pub fn shortest_path_by_id(&self, source: NodeId, target: NodeId) -> ShortestPathResponse {
        let generation = match self.registry.current() {
            Ok(g) => g,
            Err(e) => return ShortestPathResponse::failure(e.to_string()),
        };
        debug!(%source, %target, epoch = generation.epoch, "shortest path by id");
        ShortestPathResponse::from_dual(generation.engine().dual_path(source, target))
    }

    /// Fastest and shortest path between two coordinates.
    ///
    /// Each endpoint snaps to its nearest node; successful paths start with
    /// the literal `source` and end with the literal `target`.
    pub fn shortest_path_by_coordinates(
        &self,
        source: Coordinates,
        target: Coordinates,
    ) -> ShortestPathResponse {
        let (from, to) = (GeoPoint::from(source), GeoPoint::from(target));
        if let Some(bad) = [from, to].into_iter().find(|p| !p.is_valid()) {
            return ShortestPathResponse::failure(format!("invalid coordinate {bad}"));
        }
        let generation = match self.registry.current() {
            Ok(g) => g,
            Err(e) => return ShortestPathResponse::failure(e.to_string()),
        };
        debug!(%from, %to, epoch = generation.epoch, "shortest path by coordinates");
        match generation.engine().dual_between(from, to) {
            Ok(dual) => ShortestPathResponse::from_dual(dual),
            Err(e) => ShortestPathResponse::failure(e.to_string()),
        }
    }

    /// Every vertex and every directed edge of the current generation.
    pub fn graph_snapshot(&self) -> GraphSnapshot {
        let generation = match self.registry.current() {
            Ok(g) => g,
            Err(e) => {
                return GraphSnapshot { error: Some(e.to_string()), vertices: None, edges: None };
            }
        };
        let graph = &generation.graph;

        let vertices = graph
            .node_id
            .iter()
            .zip(&graph.node_pos)
            .map(|(&id, pos)| Vertex { id, lat: pos.lat, lon: pos.lon })
            .collect();
        let edges = (0..graph.edge_count())
            .map(|e| {
                graph
                    .edge_polyline(pf_core::EdgeIdx(e as u32))
                    .into_iter()
                    .map(Coordinates::from)
                    .collect()
            })
            .collect();

        GraphSnapshot { error: None, vertices: Some(vertices), edges: Some(edges) }
    }

    /// Rebuild from `descriptors` and publish.  Returns the new epoch.
    ///
    /// All-or-nothing: on error the previous generation keeps serving.
    pub fn reconfigure(&self, descriptors: Vec<RegionDescriptor>) -> BuildResult<u64> {
        info!(
            regions = %descriptors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            "reconfiguring"
        );
        self.registry.replace(descriptors)
    }

    /// [`reconfigure`](Self::reconfigure) from a JSON body: an array of
    /// descriptors, `{"locations": [...]}`, or a single descriptor.
    ///
    /// Malformed bodies fail with `NoValidLocation` before any build starts.
    pub fn reconfigure_json(&self, body: &str) -> BuildResult<u64> {
        let request: ReconfigureRequest = body.parse()?;
        self.reconfigure(request.locations)
    }

    pub fn health(&self) -> Health {
        match self.registry.current() {
            Ok(g) => Health {
                loaded:     true,
                epoch:      Some(g.epoch),
                nodes:      g.graph.node_count(),
                edges:      g.graph.edge_count(),
                components: g.graph.components().count(),
            },
            Err(_) => Health { loaded: false, epoch: None, nodes: 0, edges: 0, components: 0 },
        }
    }
}
