//! Nearest-node spatial index.
//!
//! One [`SpatialIndex`] is built per graph generation and never outlives it.
//! Points are projected onto a local equirectangular plane (metres, centred
//! on the generation's mean latitude) and stored in an `rstar` R-tree, so a
//! nearest-neighbour query is O(log N) and distances are consistent across
//! the whole generation.  At municipal scale the projection error against
//! great-circle distance is well under 0.1 %.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use pf_core::geo::EARTH_RADIUS_M;
use pf_core::{GeoPoint, NodeId, NodeIdx};

use crate::network::RoadGraph;
use crate::{EmptyGraph, SnapError};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a projected `[x, y]` point in metres with the
/// node it belongs to.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    idx:   NodeIdx,
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Coordinate → nearest node lookup for one graph generation.
pub struct SpatialIndex {
    tree: RTree<NodeEntry>,
    /// `cos(reference latitude)`, the longitude scale of the projection.
    lon_scale: f64,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.len())
            .field("lon_scale", &self.lon_scale)
            .finish()
    }
}

impl SpatialIndex {
    /// Bulk-load the index from every node of `graph`.
    ///
    /// Time complexity: O(N log N).
    pub fn build(graph: &RoadGraph) -> Self {
        let ref_lat = if graph.is_empty() {
            0.0
        } else {
            graph.node_pos.iter().map(|p| p.lat).sum::<f64>() / graph.node_count() as f64
        };
        let lon_scale = ref_lat.to_radians().cos();

        let entries: Vec<NodeEntry> = graph
            .node_pos
            .iter()
            .zip(&graph.node_id)
            .enumerate()
            .map(|(i, (&pos, &id))| NodeEntry {
                point: project(pos, lon_scale),
                idx:   NodeIdx(i as u32),
                id,
            })
            .collect();

        SpatialIndex { tree: RTree::bulk_load(entries), lon_scale }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Project `pos` onto this index's plane, in metres.
    #[inline]
    pub fn project(&self, pos: GeoPoint) -> [f64; 2] {
        project(pos, self.lon_scale)
    }

    /// Squared planar distance between two points under this index's
    /// projection, the metric `nearest` minimises.
    pub fn distance_2(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        let pa = self.project(a);
        let pb = self.project(b);
        (pa[0] - pb[0]).powi(2) + (pa[1] - pb[1]).powi(2)
    }

    /// The node closest to `pos`.  Exact ties go to the lowest `NodeId`.
    ///
    /// # Errors
    ///
    /// - [`SnapError::InvalidCoordinate`] if `pos` is not a valid WGS-84
    ///   point.
    /// - [`SnapError::Empty`] if the generation has no nodes.
    pub fn nearest(&self, pos: GeoPoint) -> Result<NodeIdx, SnapError> {
        if !pos.is_valid() {
            return Err(SnapError::InvalidCoordinate(pos));
        }
        let query = self.project(pos);
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_d2) = candidates.next().ok_or(EmptyGraph)?;
        let winner = candidates
            .take_while(|(_, d2)| *d2 == best_d2)
            .map(|(entry, _)| entry)
            .fold(first, |best, e| if e.id < best.id { e } else { best });
        Ok(winner.idx)
    }

    /// Up to `k` nearest nodes to `pos`, sorted by ascending distance.
    /// Empty for an invalid `pos`.
    pub fn k_nearest(&self, pos: GeoPoint, k: usize) -> Vec<NodeIdx> {
        if !pos.is_valid() {
            return Vec::new();
        }
        self.tree
            .nearest_neighbor_iter(&self.project(pos))
            .take(k)
            .map(|e| e.idx)
            .collect()
    }
}

#[inline]
fn project(pos: GeoPoint, lon_scale: f64) -> [f64; 2] {
    [
        pos.lon.to_radians() * lon_scale * EARTH_RADIUS_M,
        pos.lat.to_radians() * EARTH_RADIUS_M,
    ]
}
