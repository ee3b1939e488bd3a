//! Region source adapter boundary.
//!
//! Acquiring road data (map provider download, geocoding a place name) is
//! outside this crate.  The [`RegionSource`] trait is the seam: given a
//! [`RegionDescriptor`] it returns a [`RawRegion`], a directed multigraph of
//! road segments with provider node ids and tags.  The graph builder turns
//! raw regions into a routable [`RoadGraph`](crate::RoadGraph).
//!
//! [`MemorySource`] serves regions out of one in-memory network and a
//! gazetteer of place names.  Tests and demos use it; the `osm` feature adds
//! [`PbfSource`](crate::osm::PbfSource) with the same selection rules.

use std::collections::HashMap;

use rustc_hash::FxHashSet;

use pf_core::{BoundingBox, GeoPoint, NodeId, RegionDescriptor};

use crate::SourceError;

// ── Raw data ──────────────────────────────────────────────────────────────────

/// A node as delivered by the provider.
#[derive(Clone, Debug, PartialEq)]
pub struct RawNode {
    pub id:  NodeId,
    pub pos: GeoPoint,
}

/// A directed road segment as delivered by the provider.
///
/// Two-way roads arrive as two `RawEdge`s.  Every attribute the builder
/// derives weights from is optional.
#[derive(Clone, Debug, PartialEq)]
pub struct RawEdge {
    pub from:     NodeId,
    pub to:       NodeId,
    /// Provider length in metres.  When absent the builder measures the
    /// polyline.
    pub length_m: Option<f64>,
    /// OSM-style road class (`"residential"`, `"primary"`, …).
    pub highway:  Option<String>,
    /// Raw posted speed tag (`"50"`, `"30 mph"`, …).
    pub maxspeed: Option<String>,
    /// Intermediate shape points, excluding both endpoints.
    pub geometry: Vec<GeoPoint>,
}

impl RawEdge {
    /// A straight, untagged edge.
    pub fn new(from: NodeId, to: NodeId) -> Self {
        RawEdge {
            from,
            to,
            length_m: None,
            highway:  None,
            maxspeed: None,
            geometry: Vec::new(),
        }
    }

    pub fn length(mut self, length_m: f64) -> Self {
        self.length_m = Some(length_m);
        self
    }

    pub fn highway(mut self, class: impl Into<String>) -> Self {
        self.highway = Some(class.into());
        self
    }

    pub fn maxspeed(mut self, tag: impl Into<String>) -> Self {
        self.maxspeed = Some(tag.into());
        self
    }

    pub fn geometry(mut self, shape: Vec<GeoPoint>) -> Self {
        self.geometry = shape;
        self
    }

    /// The same segment travelled the other way (shape reversed).
    pub fn reversed(&self) -> Self {
        let mut rev = self.clone();
        std::mem::swap(&mut rev.from, &mut rev.to);
        rev.geometry.reverse();
        rev
    }
}

/// Raw subgraph for one region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRegion {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

impl RawRegion {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, id: NodeId, pos: GeoPoint) {
        self.nodes.push(RawNode { id, pos });
    }

    pub fn add_edge(&mut self, edge: RawEdge) {
        self.edges.push(edge);
    }

    /// Add `edge` and its reverse.
    pub fn add_two_way(&mut self, edge: RawEdge) {
        let rev = edge.reversed();
        self.edges.push(edge);
        self.edges.push(rev);
    }

    /// Sub-region inside `bbox`: the nodes it contains and the edges whose
    /// two endpoints are both inside.
    pub fn truncate(&self, bbox: &BoundingBox) -> RawRegion {
        let nodes: Vec<RawNode> = self
            .nodes
            .iter()
            .filter(|n| bbox.contains(n.pos))
            .cloned()
            .collect();
        let kept: FxHashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| kept.contains(&e.from) && kept.contains(&e.to))
            .cloned()
            .collect();
        RawRegion { nodes, edges }
    }
}

// ── RegionSource trait ────────────────────────────────────────────────────────

/// Pluggable provider of raw road data.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: the graph builder fetches all
/// descriptors of a configuration in parallel on Rayon's pool.
pub trait RegionSource: Send + Sync {
    /// Fetch the drivable road network for `region`.
    ///
    /// Return [`SourceError::NotFound`] when the region is unknown or holds
    /// no nodes, [`SourceError::Unavailable`] when the provider itself failed.
    fn fetch(&self, region: &RegionDescriptor) -> Result<RawRegion, SourceError>;
}

/// Maps place names to the area they cover.
///
/// Real geocoding belongs to the provider; bundled sources resolve names
/// through this fixed table.
#[derive(Clone, Debug, Default)]
pub struct Gazetteer {
    places: HashMap<String, BoundingBox>,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: impl Into<String>, bbox: BoundingBox) -> Self {
        self.insert(name, bbox);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bbox: BoundingBox) {
        self.places.insert(name.into(), bbox);
    }

    /// Area for `region`: the looked-up place or the box itself.
    pub fn resolve(&self, region: &RegionDescriptor) -> Result<BoundingBox, SourceError> {
        match region {
            RegionDescriptor::BoundingBox(bbox) => Ok(*bbox),
            RegionDescriptor::PlaceName(name) => self
                .places
                .get(name)
                .copied()
                .ok_or_else(|| SourceError::NotFound(region.to_string())),
        }
    }
}

// ── MemorySource ──────────────────────────────────────────────────────────────

/// Serves regions by truncating one in-memory network.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    network:   RawRegion,
    gazetteer: Gazetteer,
}

impl MemorySource {
    pub fn new(network: RawRegion, gazetteer: Gazetteer) -> Self {
        MemorySource { network, gazetteer }
    }

    pub fn network(&self) -> &RawRegion {
        &self.network
    }
}

impl RegionSource for MemorySource {
    fn fetch(&self, region: &RegionDescriptor) -> Result<RawRegion, SourceError> {
        let bbox = self.gazetteer.resolve(region)?;
        let raw = self.network.truncate(&bbox);
        if raw.is_empty() {
            return Err(SourceError::NotFound(region.to_string()));
        }
        Ok(raw)
    }
}
