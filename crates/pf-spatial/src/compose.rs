//! Graph builder — composes region subgraphs into one routable generation.
//!
//! # Pipeline
//!
//! ```text
//! descriptors ──fetch (parallel)──▶ [RawRegion] ──compose──▶ RoadGraph
//!                                                  │
//!                                                  ├─ merge nodes by NodeId
//!                                                  ├─ keep every edge (multigraph)
//!                                                  ├─ derive length / speed / time
//!                                                  └─ label components (diagnostic)
//! ```
//!
//! All-or-nothing: if any descriptor fails to fetch or yields no nodes, the
//! whole build fails and nothing is returned.  The builder holds no mutable
//! state, so concurrent builds cannot interfere with each other.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use pf_core::geo::polyline_length_m;
use pf_core::{GeoPoint, RegionDescriptor};

use crate::network::{RoadGraph, RoadGraphBuilder};
use crate::source::{RawEdge, RawRegion, RegionSource};
use crate::speed::SpeedPolicy;
use crate::{BuildError, BuildResult};

/// Builds [`RoadGraph`] generations from region descriptors.
#[derive(Clone)]
pub struct GraphBuilder {
    source: Arc<dyn RegionSource>,
    speed:  SpeedPolicy,
}

impl GraphBuilder {
    pub fn new(source: Arc<dyn RegionSource>, speed: SpeedPolicy) -> Self {
        GraphBuilder { source, speed }
    }

    pub fn speed_policy(&self) -> &SpeedPolicy {
        &self.speed
    }

    /// Fetch every region and compose them into one graph.
    ///
    /// # Errors
    ///
    /// - [`BuildError::NoValidLocation`] for an empty list, an unknown place,
    ///   or a region without nodes.
    /// - [`BuildError::SourceUnavailable`] if the source itself failed.
    pub fn build(&self, descriptors: &[RegionDescriptor]) -> BuildResult<RoadGraph> {
        if descriptors.is_empty() {
            return Err(BuildError::NoValidLocation("no regions configured".to_string()));
        }

        info!(regions = descriptors.len(), "fetching road network");
        let regions: Vec<RawRegion> = descriptors
            .par_iter()
            .map(|region| {
                let raw = self.source.fetch(region)?;
                if raw.is_empty() {
                    return Err(BuildError::NoValidLocation(region.to_string()));
                }
                debug!(%region, nodes = raw.nodes.len(), edges = raw.edges.len(), "region fetched");
                Ok(raw)
            })
            .collect::<BuildResult<_>>()?;

        compose(&regions, &self.speed)
    }
}

/// Merge raw regions into one graph and derive edge weights.
///
/// Nodes are deduplicated by id (conflicting positions resolve to the
/// lowest `(lat, lon)`); edges are all kept, so a segment present in
/// two overlapping regions becomes two parallel edges.  Edges whose
/// endpoints are missing from every region are dropped.
pub fn compose(regions: &[RawRegion], speed: &SpeedPolicy) -> BuildResult<RoadGraph> {
    let edge_total: usize = regions.iter().map(|r| r.edges.len()).sum();
    let mut builder = RoadGraphBuilder::with_edge_capacity(edge_total);

    for region in regions {
        for node in &region.nodes {
            builder.add_node(node.id, node.pos);
        }
    }

    let mut dropped = 0usize;
    for edge in regions.iter().flat_map(|r| &r.edges) {
        let (Some(from_pos), Some(to_pos)) = (builder.node_pos(edge.from), builder.node_pos(edge.to))
        else {
            dropped += 1;
            continue;
        };
        let length_m  = edge_length_m(edge, from_pos, to_pos);
        let speed_mps = speed.speed_mps(edge.highway.as_deref(), edge.maxspeed.as_deref());
        builder.add_shaped_edge(edge.from, edge.to, length_m, speed_mps, edge.geometry.clone());
    }
    if dropped > 0 {
        debug!(dropped, "dropped edges with endpoints outside the composed node set");
    }

    let graph = builder.build()?;

    let components = graph.components();
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        components = components.count(),
        "road graph composed"
    );
    for (i, size) in components.sizes.iter().enumerate() {
        debug!(component = i, nodes = size.nodes, edges = size.edges, "connected component");
    }

    Ok(graph)
}

/// Provider length when usable, otherwise the measured polyline length.
fn edge_length_m(edge: &RawEdge, from: GeoPoint, to: GeoPoint) -> f64 {
    match edge.length_m {
        Some(len) if len.is_finite() && len >= 0.0 => len,
        _ => {
            let mut line = Vec::with_capacity(edge.geometry.len() + 2);
            line.push(from);
            line.extend_from_slice(&edge.geometry);
            line.push(to);
            polyline_length_m(&line)
        }
    }
}
