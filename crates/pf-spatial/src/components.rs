//! Weakly connected components of a road graph.
//!
//! Edge direction is ignored: two nodes share a component if any chain of
//! road segments joins them.  The report is computed once per generation and
//! serves two purposes:
//!
//! - diagnostics (component count and sizes are logged on every build), and
//! - a constant-time unreachability check before a shortest-path search
//!   (nodes in different components can never be joined, so Dijkstra is
//!   skipped entirely).

use petgraph::unionfind::UnionFind;

use pf_core::NodeIdx;

/// Size of one component.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ComponentSize {
    pub nodes: usize,
    pub edges: usize,
}

/// All weakly connected components, numbered largest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentReport {
    /// Sizes, sorted by descending node count (ties: descending edge count).
    pub sizes: Vec<ComponentSize>,
    /// Component number of each node.  Indexed by `NodeIdx`.
    labels: Vec<u32>,
}

impl ComponentReport {
    /// Label the components of a graph given as `node_count` nodes and
    /// parallel `from`/`to` edge arrays.
    pub fn compute(node_count: usize, edge_from: &[NodeIdx], edge_to: &[NodeIdx]) -> Self {
        let mut uf: UnionFind<usize> = UnionFind::new(node_count);
        for (&a, &b) in edge_from.iter().zip(edge_to) {
            uf.union(a.index(), b.index());
        }
        let roots = uf.into_labeling();

        // Raw union-find roots are arbitrary; collect per-root sizes first.
        let mut per_root: Vec<ComponentSize> = vec![ComponentSize { nodes: 0, edges: 0 }; node_count];
        for &root in &roots {
            per_root[root].nodes += 1;
        }
        for &a in edge_from {
            per_root[roots[a.index()]].edges += 1;
        }

        // Renumber so component 0 is the largest.  Root index breaks ties to
        // keep numbering deterministic.
        let mut order: Vec<usize> = (0..node_count).filter(|&r| per_root[r].nodes > 0).collect();
        order.sort_by(|&x, &y| {
            per_root[y].nodes
                .cmp(&per_root[x].nodes)
                .then(per_root[y].edges.cmp(&per_root[x].edges))
                .then(x.cmp(&y))
        });

        let mut renumber = vec![u32::MAX; node_count];
        for (number, &root) in order.iter().enumerate() {
            renumber[root] = number as u32;
        }

        ComponentReport {
            sizes:  order.iter().map(|&r| per_root[r]).collect(),
            labels: roots.iter().map(|&r| renumber[r]).collect(),
        }
    }

    /// Number of components (0 for an empty graph).
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    pub fn largest(&self) -> Option<ComponentSize> {
        self.sizes.first().copied()
    }

    /// Component number of `node`; 0 is the largest component.
    #[inline]
    pub fn component_of(&self, node: NodeIdx) -> u32 {
        self.labels[node.index()]
    }

    /// `true` if an undirected chain of edges joins `a` and `b`.
    #[inline]
    pub fn same_component(&self, a: NodeIdx, b: NodeIdx) -> bool {
        self.labels[a.index()] == self.labels[b.index()]
    }
}
