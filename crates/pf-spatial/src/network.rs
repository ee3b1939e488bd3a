//! Road graph representation (one generation) and its builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeIdx n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays are sorted by source node and indexed by `EdgeIdx`, so
//! iterating a node's outgoing edges is a contiguous memory scan, which suits
//! Dijkstra's inner loop.
//!
//! # Determinism
//!
//! `NodeIdx` order is ascending `NodeId`, and edges are sorted by
//! `(source, target, length, travel time, geometry)`.  Two builders fed the
//! same nodes and edges in any order produce identical graphs, which is what
//! makes region composition order-independent.
//!
//! # Immutability
//!
//! A `RoadGraph` has no mutating methods.  A rebuild always produces a new
//! value; the registry publishes it behind an `Arc`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use pf_core::{EdgeIdx, GeoPoint, NodeId, NodeIdx};

use crate::components::ComponentReport;
use crate::{SpatialError, SpatialResult};

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road multigraph in CSR format.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadGraphBuilder`].
#[derive(Debug)]
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Provider id of each node, strictly ascending.  Indexed by `NodeIdx`.
    pub node_id: Vec<NodeId>,

    /// Geographic position of each node.  Indexed by `NodeIdx`.
    pub node_pos: Vec<GeoPoint>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIdxs
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeIdx = position in sorted order) ─────────
    /// Source node of each edge.  Redundant with CSR but required for
    /// route reconstruction (trace `prev_edge` back to source).
    pub edge_from: Vec<NodeIdx>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeIdx>,

    /// Physical length of each edge in metres.
    pub edge_length_m: Vec<f64>,

    /// Inferred travel speed in metres per second (always > 0).
    pub edge_speed_mps: Vec<f64>,

    /// `edge_length_m / edge_speed_mps`, in seconds.
    pub edge_travel_s: Vec<f64>,

    /// Intermediate shape points between source and target (may be empty,
    /// meaning a straight segment).
    pub edge_geometry: Vec<Vec<GeoPoint>>,

    components: ComponentReport,
}

impl RoadGraph {
    /// Construct a graph with no nodes or edges.
    pub fn empty() -> Self {
        RoadGraph {
            node_id:        Vec::new(),
            node_pos:       Vec::new(),
            node_out_start: vec![0],
            edge_from:      Vec::new(),
            edge_to:        Vec::new(),
            edge_length_m:  Vec::new(),
            edge_speed_mps: Vec::new(),
            edge_travel_s:  Vec::new(),
            edge_geometry:  Vec::new(),
            components:     ComponentReport::default(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Dense index of the node with provider id `id`, if present.
    ///
    /// `node_id` is sorted, so this is a binary search with no side table.
    pub fn node_idx(&self, id: NodeId) -> Option<NodeIdx> {
        self.node_id
            .binary_search(&id)
            .ok()
            .map(|i| NodeIdx(i as u32))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_idx(id).is_some()
    }

    #[inline]
    pub fn pos(&self, node: NodeIdx) -> GeoPoint {
        self.node_pos[node.index()]
    }

    #[inline]
    pub fn id(&self, node: NodeIdx) -> NodeId {
        self.node_id[node.index()]
    }

    /// Weakly connected components, computed once at build time.
    pub fn components(&self) -> &ComponentReport {
        &self.components
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeIdx`s of all outgoing edges from `node`.
    ///
    /// A contiguous index range; no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeIdx) -> impl Iterator<Item = EdgeIdx> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeIdx(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeIdx) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Full drawable polyline of `edge`: source, intermediates, target.
    pub fn edge_polyline(&self, edge: EdgeIdx) -> Vec<GeoPoint> {
        let shape = &self.edge_geometry[edge.index()];
        let mut line = Vec::with_capacity(shape.len() + 2);
        line.push(self.pos(self.edge_from[edge.index()]));
        line.extend_from_slice(shape);
        line.push(self.pos(self.edge_to[edge.index()]));
        line
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes are keyed by provider [`NodeId`]; adding an id twice keeps the
/// first position.  Edges refer to nodes by `NodeId` and may be added before
/// their endpoints.  `build()` validates referential integrity and weights,
/// assigns dense indices, and constructs the CSR arrays.
///
/// # Example
///
/// ```
/// use pf_core::{GeoPoint, NodeId};
/// use pf_spatial::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// b.add_node(NodeId(1), GeoPoint::new(48.77, 9.18));
/// b.add_node(NodeId(2), GeoPoint::new(48.78, 9.18));
/// b.add_road(NodeId(1), NodeId(2), 1_112.0, 13.9); // 1.1 km at 50 km/h
/// let graph = b.build().unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // bidirectional
/// ```
#[derive(Default)]
pub struct RoadGraphBuilder {
    nodes:     BTreeMap<NodeId, GeoPoint>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:      NodeId,
    to:        NodeId,
    length_m:  f64,
    speed_mps: f64,
    geometry:  Vec<GeoPoint>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate edge storage to reduce reallocations when composing
    /// large regions.
    pub fn with_edge_capacity(edges: usize) -> Self {
        Self {
            nodes:     BTreeMap::new(),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node.  Returns `false` if `id` was already present.
    ///
    /// When the same id arrives with different positions the lowest
    /// `(lat, lon)` is kept, so the result does not depend on insertion
    /// order.
    pub fn add_node(&mut self, id: NodeId, pos: GeoPoint) -> bool {
        match self.nodes.entry(id) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(pos);
                true
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => {
                let kept = *slot.get();
                let lower = pos.lat.total_cmp(&kept.lat).then(pos.lon.total_cmp(&kept.lon)).is_lt();
                if lower {
                    slot.insert(pos);
                }
                false
            }
        }
    }

    /// Add a **directed** edge from `from` to `to` with a straight shape.
    ///
    /// - `length_m`: physical length in metres.
    /// - `speed_mps`: travel speed in metres per second.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64, speed_mps: f64) {
        self.add_shaped_edge(from, to, length_m, speed_mps, Vec::new());
    }

    /// Add a directed edge carrying intermediate shape points.
    pub fn add_shaped_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        length_m: f64,
        speed_mps: f64,
        geometry: Vec<GeoPoint>,
    ) {
        self.raw_edges.push(RawEdge { from, to, length_m, speed_mps, geometry });
    }

    /// Convenience: add edges in **both directions** for a two-way road.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64, speed_mps: f64) {
        self.add_directed_edge(a, b, length_m, speed_mps);
        self.add_directed_edge(b, a, length_m, speed_mps);
    }

    /// Position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.get(&id).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// # Errors
    ///
    /// - [`SpatialError::DanglingEdge`] if an edge endpoint was never added.
    /// - [`SpatialError::InvalidWeight`] if a length is negative/non-finite or
    ///   a speed is not strictly positive.
    /// - [`SpatialError::InvalidTravelTime`] if length over speed overflows.
    ///
    /// Time complexity: O(E log E) for the edge sort plus O(E α(N)) for the
    /// component labelling.
    pub fn build(self) -> SpatialResult<RoadGraph> {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // BTreeMap iteration is ascending NodeId → deterministic NodeIdx.
        let (node_id, node_pos): (Vec<NodeId>, Vec<GeoPoint>) = self.nodes.into_iter().unzip();
        let lookup = |id: NodeId| node_id.binary_search(&id).ok().map(|i| NodeIdx(i as u32));

        let mut raw: Vec<IndexedEdge> = Vec::with_capacity(edge_count);
        for e in self.raw_edges {
            let (Some(from), Some(to)) = (lookup(e.from), lookup(e.to)) else {
                return Err(SpatialError::DanglingEdge { from: e.from, to: e.to });
            };
            let weights_ok = e.length_m.is_finite()
                && e.length_m >= 0.0
                && e.speed_mps.is_finite()
                && e.speed_mps > 0.0;
            if !weights_ok {
                return Err(SpatialError::InvalidWeight {
                    from:      e.from,
                    to:        e.to,
                    length_m:  e.length_m,
                    speed_mps: e.speed_mps,
                });
            }
            let travel_s = e.length_m / e.speed_mps;
            if !travel_s.is_finite() {
                return Err(SpatialError::InvalidTravelTime { from: e.from, to: e.to });
            }
            raw.push(IndexedEdge {
                from,
                to,
                length_m:  e.length_m,
                speed_mps: e.speed_mps,
                travel_s,
                geometry:  e.geometry,
            });
        }

        raw.sort_by(IndexedEdge::canonical_cmp);

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let mut edge_from      = Vec::with_capacity(edge_count);
        let mut edge_to        = Vec::with_capacity(edge_count);
        let mut edge_length_m  = Vec::with_capacity(edge_count);
        let mut edge_speed_mps = Vec::with_capacity(edge_count);
        let mut edge_travel_s  = Vec::with_capacity(edge_count);
        let mut edge_geometry  = Vec::with_capacity(edge_count);
        for e in raw {
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_length_m.push(e.length_m);
            edge_speed_mps.push(e.speed_mps);
            edge_travel_s.push(e.travel_s);
            edge_geometry.push(e.geometry);
        }

        let components = ComponentReport::compute(node_count, &edge_from, &edge_to);

        Ok(RoadGraph {
            node_id,
            node_pos,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_speed_mps,
            edge_travel_s,
            edge_geometry,
            components,
        })
    }
}

struct IndexedEdge {
    from:      NodeIdx,
    to:        NodeIdx,
    length_m:  f64,
    speed_mps: f64,
    travel_s:  f64,
    geometry:  Vec<GeoPoint>,
}

impl IndexedEdge {
    /// Total order over every attribute, so parallel edges land in the same
    /// slots regardless of insertion order.
    fn canonical_cmp(a: &Self, b: &Self) -> Ordering {
        a.from
            .cmp(&b.from)
            .then(a.to.cmp(&b.to))
            .then(a.length_m.total_cmp(&b.length_m))
            .then(a.travel_s.total_cmp(&b.travel_s))
            .then(a.speed_mps.total_cmp(&b.speed_mps))
            .then_with(|| cmp_shapes(&a.geometry, &b.geometry))
    }
}

/// Lexicographic comparison of two shapes point by point.
fn cmp_shapes(a: &[GeoPoint], b: &[GeoPoint]) -> Ordering {
    for (p, q) in a.iter().zip(b) {
        let ord = p.lat.total_cmp(&q.lat).then(p.lon.total_cmp(&q.lon));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}
