//! Routing trait, default Dijkstra implementation, and the route engine.
//!
//! # Algorithm
//!
//! Searches go through the [`Router`] trait over dense node indices.
//! [`DijkstraRouter`] is the implementation the engine uses; it is
//! sufficient for municipal-size graphs.
//!
//! # Metrics
//!
//! | Metric       | Edge cost          | Unit    |
//! |--------------|--------------------|---------|
//! | `Length`     | `edge_length_m`    | metres  |
//! | `TravelTime` | `edge_travel_s`    | seconds |
//!
//! The two are not generally co-optimal, so a dual query runs two
//! independent searches and reports each outcome separately.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use pf_core::{EdgeIdx, GeoPoint, NodeId, NodeIdx};

use crate::index::SpatialIndex;
use crate::network::RoadGraph;
use crate::{NoPathError, SnapError};

// ── Metric ────────────────────────────────────────────────────────────────────

/// Edge-weight function used for shortest-path optimisation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Metric {
    /// Physical length in metres.
    Length,
    /// Travel time in seconds.
    TravelTime,
}

impl Metric {
    #[inline]
    pub fn edge_cost(self, graph: &RoadGraph, edge: EdgeIdx) -> f64 {
        match self {
            Metric::Length => graph.edge_length_m[edge.index()],
            Metric::TravelTime => graph.edge_travel_s[edge.index()],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Length     => "length",
            Metric::TravelTime => "travel_time",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// A path through one graph generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes visited in order, source and target inclusive.
    pub nodes: Vec<NodeIdx>,
    /// Edges traversed in order (`nodes.len() - 1` of them).
    pub edges: Vec<EdgeIdx>,
    /// Summed cost under the metric the route was computed for.
    pub cost: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Node coordinates along the route.
    pub fn coordinates(&self, graph: &RoadGraph) -> Vec<GeoPoint> {
        self.nodes.iter().map(|&n| graph.pos(n)).collect()
    }

    /// Summed edge lengths in metres, whatever metric chose the route.
    pub fn length_m(&self, graph: &RoadGraph) -> f64 {
        self.edges.iter().map(|e| graph.edge_length_m[e.index()]).sum()
    }

    /// Summed travel time in seconds, whatever metric chose the route.
    pub fn travel_s(&self, graph: &RoadGraph) -> f64 {
        self.edges.iter().map(|e| graph.edge_travel_s[e.index()]).sum()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Shortest-path algorithm over dense node indices.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: queries run concurrently and the
/// dual query runs both metrics on Rayon's pool.
pub trait Router: Send + Sync {
    /// Compute the cheapest route from `from` to `to` under `metric`.
    ///
    /// `from == to` yields a trivial single-node route, not an error.
    fn route(
        &self,
        graph: &RoadGraph,
        from: NodeIdx,
        to: NodeIdx,
        metric: Metric,
    ) -> Result<Route, NoPathError>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR road graph.
///
/// Nodes in different weakly connected components are rejected without
/// searching, using the labels computed at build time.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        graph: &RoadGraph,
        from: NodeIdx,
        to: NodeIdx,
        metric: Metric,
    ) -> Result<Route, NoPathError> {
        dijkstra(graph, from, to, metric)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[derive(Copy, Clone)]
struct State {
    cost: f64,
    node: NodeIdx,
}

// Min-heap by cost (reversed from standard BinaryHeap); the node index is the
// secondary key so ties pop deterministically.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

fn dijkstra(
    graph: &RoadGraph,
    from: NodeIdx,
    to: NodeIdx,
    metric: Metric,
) -> Result<Route, NoPathError> {
    if from == to {
        return Ok(Route { nodes: vec![from], edges: vec![], cost: 0.0 });
    }
    let unreachable = || NoPathError::Unreachable { from: graph.id(from), to: graph.id(to) };
    if !graph.components().same_component(from, to) {
        return Err(unreachable());
    }

    let n = graph.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeIdx that reached v; EdgeIdx::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeIdx::INVALID; n];

    dist[from.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: from });

    while let Some(State { cost, node }) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost + metric.edge_cost(graph, edge);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(State { cost: new_cost, node: neighbor });
            }
        }
    }

    Err(unreachable())
}

fn reconstruct(
    graph: &RoadGraph,
    prev_edge: &[EdgeIdx],
    from: NodeIdx,
    to: NodeIdx,
    cost: f64,
) -> Route {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        debug_assert_ne!(e, EdgeIdx::INVALID, "settled node without predecessor");
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| graph.edge_to[e.index()]));

    Route { nodes, edges, cost }
}

// ── Route engine ──────────────────────────────────────────────────────────────

/// Outcome of one metric in a dual query.
pub type PathResult = Result<Vec<GeoPoint>, NoPathError>;

/// Both metrics for one (source, target) pair.  Each side succeeds or fails
/// independently.
#[derive(Debug, Clone)]
pub struct DualRoute {
    pub travel_time: Result<Route, NoPathError>,
    pub length:      Result<Route, NoPathError>,
}

/// [`DualRoute`] resolved to coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DualPath {
    pub travel_time: PathResult,
    pub length:      PathResult,
}

impl DualPath {
    /// `true` if neither metric produced a path.
    pub fn is_total_failure(&self) -> bool {
        self.travel_time.is_err() && self.length.is_err()
    }
}

/// Read-only query front end over one graph generation and its index.
pub struct RouteEngine<'g> {
    graph:  &'g RoadGraph,
    index:  &'g SpatialIndex,
    router: DijkstraRouter,
}

impl<'g> RouteEngine<'g> {
    pub fn new(graph: &'g RoadGraph, index: &'g SpatialIndex) -> Self {
        RouteEngine { graph, index, router: DijkstraRouter }
    }

    /// Shortest path between two provider node ids under `metric`.
    ///
    /// # Errors
    ///
    /// - [`NoPathError::UnknownNode`] if either id is absent from the graph.
    /// - [`NoPathError::Unreachable`] if no directed path exists.
    pub fn shortest_path(&self, from: NodeId, to: NodeId, metric: Metric) -> Result<Route, NoPathError> {
        let (a, b) = self.resolve(from, to)?;
        self.router.route(self.graph, a, b, metric)
    }

    /// Both metrics, searched in parallel.
    pub fn dual(&self, from: NodeId, to: NodeId) -> DualRoute {
        match self.resolve(from, to) {
            Ok((a, b)) => self.dual_idx(a, b),
            Err(e) => DualRoute { travel_time: Err(e.clone()), length: Err(e) },
        }
    }

    /// [`dual`](Self::dual) resolved to node coordinates.
    pub fn dual_path(&self, from: NodeId, to: NodeId) -> DualPath {
        let dual = self.dual(from, to);
        DualPath {
            travel_time: dual.travel_time.map(|r| r.coordinates(self.graph)),
            length:      dual.length.map(|r| r.coordinates(self.graph)),
        }
    }

    /// Dual query between two arbitrary coordinates.
    ///
    /// Both endpoints are snapped to their nearest nodes; every successful
    /// path is then bookended with the literal query coordinates.
    ///
    /// # Errors
    ///
    /// [`SnapError`] if either coordinate is invalid or the generation has
    /// no nodes to snap to.
    pub fn dual_between(&self, source: GeoPoint, target: GeoPoint) -> Result<DualPath, SnapError> {
        let a = self.index.nearest(source)?;
        let b = self.index.nearest(target)?;
        let dual = self.dual_idx(a, b);
        let bookend = |route: Route| {
            let mut path = Vec::with_capacity(route.nodes.len() + 2);
            path.push(source);
            path.extend(route.nodes.iter().map(|&n| self.graph.pos(n)));
            path.push(target);
            path
        };
        Ok(DualPath {
            travel_time: dual.travel_time.map(&bookend),
            length:      dual.length.map(&bookend),
        })
    }

    fn dual_idx(&self, a: NodeIdx, b: NodeIdx) -> DualRoute {
        let (travel_time, length) = rayon::join(
            || self.router.route(self.graph, a, b, Metric::TravelTime),
            || self.router.route(self.graph, a, b, Metric::Length),
        );
        DualRoute { travel_time, length }
    }

    fn resolve(&self, from: NodeId, to: NodeId) -> Result<(NodeIdx, NodeIdx), NoPathError> {
        let a = self.graph.node_idx(from).ok_or(NoPathError::UnknownNode(from))?;
        let b = self.graph.node_idx(to).ok_or(NoPathError::UnknownNode(to))?;
        Ok((a, b))
    }
}
