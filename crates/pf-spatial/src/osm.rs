//! OSM PBF region source — enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use pf_spatial::osm::PbfSource;
//! use pf_spatial::Gazetteer;
//!
//! let source = PbfSource::new("stuttgart.osm.pbf", Gazetteer::new());
//! let raw = source.fetch(&RegionDescriptor::bbox(48.69, 9.03, 48.86, 9.31)?)?;
//! ```
//!
//! # What is loaded
//!
//! Only drivable `highway=*` ways are included (see [`is_drivable`]).  All
//! other features (footways, buildings, POIs, relations) are ignored.
//! One-way roads add a single directed edge (reversed for `oneway=-1`);
//! two-way roads add both directions.  `maxspeed` is carried through for the
//! speed policy; lengths are left for the builder to measure.
//!
//! # Memory note
//!
//! Each fetch reads the extract once and buffers only the OSM nodes inside
//! the requested box, in an `FxHashMap<i64, GeoPoint>` (needed because ways
//! reference nodes by OSM id).

use std::path::{Path, PathBuf};

use osmpbf::{Element, ElementReader};
use rustc_hash::{FxHashMap, FxHashSet};

use pf_core::{BoundingBox, GeoPoint, NodeId, RegionDescriptor};

use crate::source::{Gazetteer, RawEdge, RawRegion, RegionSource};
use crate::{SourceError, SpatialError};

/// Serves regions out of a local OSM PBF extract.
#[derive(Clone, Debug)]
pub struct PbfSource {
    path:      PathBuf,
    gazetteer: Gazetteer,
}

impl PbfSource {
    pub fn new(path: impl Into<PathBuf>, gazetteer: Gazetteer) -> Self {
        PbfSource { path: path.into(), gazetteer }
    }
}

impl RegionSource for PbfSource {
    fn fetch(&self, region: &RegionDescriptor) -> Result<RawRegion, SourceError> {
        let bbox = self.gazetteer.resolve(region)?;
        let raw = load_region(&self.path, &bbox)
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        if raw.is_empty() {
            return Err(SourceError::NotFound(region.to_string()));
        }
        Ok(raw)
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Read the drivable road network inside `bbox` from a PBF file.
///
/// # Errors
///
/// Returns [`SpatialError::Osm`] on parse errors,
/// [`SpatialError::Io`] on file errors.
pub fn load_region(path: &Path, bbox: &BoundingBox) -> Result<RawRegion, SpatialError> {
    // ── Phase 1: collect in-box nodes + road ways in one sequential pass ──
    let reader = ElementReader::from_path(path)?;

    let mut in_box: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    let mut road_ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                let pos = GeoPoint::new(n.lat(), n.lon());
                if bbox.contains(pos) {
                    in_box.insert(n.id(), pos);
                }
            }
            Element::DenseNode(n) => {
                let pos = GeoPoint::new(n.lat(), n.lon());
                if bbox.contains(pos) {
                    in_box.insert(n.id(), pos);
                }
            }
            Element::Way(w) => {
                // Collect tags eagerly so &str lifetimes don't escape the closure.
                let tags: Vec<(&str, &str)> = w.tags().collect();
                let tag = |key: &str| tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);

                if let Some(highway) = tag("highway").filter(|h| is_drivable(h)) {
                    road_ways.push(OsmWay {
                        refs:      w.refs().collect(),
                        highway:   highway.to_string(),
                        maxspeed:  tag("maxspeed").map(str::to_string),
                        direction: direction(highway, tag("oneway")),
                    });
                }
            }
            _ => {}
        })
        .map_err(|e| SpatialError::Osm(e.to_string()))?;

    // ── Phase 2: keep only nodes referenced by a road way ─────────────────
    let road_node_ids: FxHashSet<i64> = road_ways
        .iter()
        .flat_map(|w| w.refs.iter().copied())
        .filter(|id| in_box.contains_key(id))
        .collect();

    let mut raw = RawRegion::default();
    for osm_id in &road_node_ids {
        if let (Some(&pos), Ok(id)) = (in_box.get(osm_id), u64::try_from(*osm_id)) {
            raw.add_node(NodeId(id), pos);
        }
    }

    // ── Phase 3: directed edges from way node sequences ───────────────────
    for way in &road_ways {
        for window in way.refs.windows(2) {
            let (osm_a, osm_b) = (window[0], window[1]);
            if !(road_node_ids.contains(&osm_a) && road_node_ids.contains(&osm_b)) {
                continue;
            }
            let (Ok(a), Ok(b)) = (u64::try_from(osm_a), u64::try_from(osm_b)) else {
                continue;
            };
            let mut edge = RawEdge::new(NodeId(a), NodeId(b)).highway(way.highway.clone());
            if let Some(tag) = &way.maxspeed {
                edge = edge.maxspeed(tag.clone());
            }
            match way.direction {
                Direction::Both     => raw.add_two_way(edge),
                Direction::Forward  => raw.add_edge(edge),
                Direction::Backward => raw.add_edge(edge.reversed()),
            }
        }
    }

    Ok(raw)
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    refs:      Vec<i64>,
    highway:   String,
    maxspeed:  Option<String>,
    direction: Direction,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Direction {
    Both,
    Forward,
    Backward,
}

// ── Tag helpers ───────────────────────────────────────────────────────────────

/// `false` for `highway` values that are not drivable by car.
pub fn is_drivable(highway: &str) -> bool {
    !matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track"
            | "bridleway" | "corridor" | "elevator" | "proposed" | "construction"
            | "abandoned" | "platform" | "raceway" | "bus_guideway" | "escape"
    )
}

/// Travel direction(s) allowed on a way for car traffic.
///
/// Motorways and motorway links are implicitly one-way in OSM convention.
fn direction(highway: &str, oneway: Option<&str>) -> Direction {
    match oneway {
        Some("yes" | "1" | "true") => Direction::Forward,
        Some("-1" | "reverse")     => Direction::Backward,
        Some("no" | "0" | "false") => Direction::Both,
        _ if matches!(highway, "motorway" | "motorway_link") => Direction::Forward,
        _ => Direction::Both,
    }
}
