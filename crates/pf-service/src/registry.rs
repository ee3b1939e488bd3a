//! Graph registry — publishes immutable graph generations.
//!
//! # State machine
//!
//! ```text
//! Uninitialized ──replace ok──▶ Ready(G1) ──replace ok──▶ Ready(G2) ──▶ …
//!       │                           │
//!       └──replace err──▶ (same)    └──replace err──▶ Ready(G1)
//! ```
//!
//! # Concurrency
//!
//! Readers call [`GraphRegistry::current`], which clones an `Arc` under a
//! short read lock and returns.  All routing then runs against that one
//! generation with no lock held, so a query never mixes nodes of one
//! generation with edges of another.
//!
//! Rebuilds are serialized by a writer mutex.  The (slow) fetch and compose
//! run while only the writer mutex is held; the write lock is taken just for
//! the pointer swap.  A superseded generation is freed when the last query
//! holding it drops its `Arc`.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use pf_core::RegionDescriptor;
use pf_spatial::{BuildResult, EmptyGraph, GraphBuilder, RoadGraph, RouteEngine, SpatialIndex};

/// One immutable, fully built routable graph plus its spatial index.
#[derive(Debug)]
pub struct Generation {
    /// 1 for the first published generation, +1 per successful rebuild.
    pub epoch:       u64,
    /// The configuration this generation was built from.
    pub descriptors: Vec<RegionDescriptor>,
    pub graph:       RoadGraph,
    pub index:       SpatialIndex,
}

impl Generation {
    pub fn engine(&self) -> RouteEngine<'_> {
        RouteEngine::new(&self.graph, &self.index)
    }
}

/// Single-writer, many-reader holder of the current [`Generation`].
pub struct GraphRegistry {
    builder: GraphBuilder,
    current: RwLock<Option<Arc<Generation>>>,
    /// Held for a whole rebuild; guards the last issued epoch.
    writer:  Mutex<u64>,
}

impl GraphRegistry {
    /// An uninitialized registry.  Queries fail with [`EmptyGraph`] until the
    /// first successful [`replace`](Self::replace).
    pub fn new(builder: GraphBuilder) -> Self {
        GraphRegistry {
            builder,
            current: RwLock::new(None),
            writer:  Mutex::new(0),
        }
    }

    /// The published generation.
    pub fn current(&self) -> Result<Arc<Generation>, EmptyGraph> {
        self.current.read().clone().ok_or(EmptyGraph)
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    /// Descriptors of the published generation, if any.
    pub fn descriptors(&self) -> Option<Vec<RegionDescriptor>> {
        self.current.read().as_ref().map(|g| g.descriptors.clone())
    }

    /// Build a generation from `descriptors` and publish it.
    ///
    /// Returns the new epoch.  On error nothing is published and the
    /// previous generation (if any) keeps serving.
    pub fn replace(&self, descriptors: Vec<RegionDescriptor>) -> BuildResult<u64> {
        let mut last_epoch = self.writer.lock();
        let started = Instant::now();

        let graph = match self.builder.build(&descriptors) {
            Ok(graph) => graph,
            Err(e) => {
                warn!(error = %e, "rebuild failed; keeping the current generation");
                return Err(e);
            }
        };
        let index = SpatialIndex::build(&graph);

        let epoch = *last_epoch + 1;
        let (nodes, edges) = (graph.node_count(), graph.edge_count());
        let generation = Arc::new(Generation { epoch, descriptors, graph, index });

        let previous = self.current.write().replace(generation);
        *last_epoch = epoch;

        info!(
            epoch,
            nodes,
            edges,
            elapsed_ms = started.elapsed().as_millis() as u64,
            superseded = previous.map(|g| g.epoch),
            "graph generation published"
        );
        Ok(epoch)
    }
}
