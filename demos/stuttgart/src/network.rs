//! Synthetic Stuttgart road network.
//!
//! A dozen landmark intersections with real-world coordinates, joined by
//! tagged roads.  Ludwigsburg lies north of the default Stuttgart box; its
//! gazetteer entry overlaps Zuffenhausen so the two regions share a node
//! when composed together.

use pf_core::{BoundingBox, GeoPoint, NodeId};
use pf_service::config::{STUTTGART_BBOX, STUTTGART_PLACE};
use pf_spatial::{Gazetteer, MemorySource, RawEdge, RawRegion};

pub const HAUPTBAHNHOF:  NodeId = NodeId(1001);
pub const SCHLOSSPLATZ:  NodeId = NodeId(1002);
pub const ROTEBUEHL:     NodeId = NodeId(1003);
pub const FEUERSEE:      NodeId = NodeId(1004);
pub const MARIENPLATZ:   NodeId = NodeId(1005);
pub const DEGERLOCH:     NodeId = NodeId(1006);
pub const VAIHINGEN:     NodeId = NodeId(1007);
pub const BAD_CANNSTATT: NodeId = NodeId(1008);
pub const NECKARPARK:    NodeId = NodeId(1009);
pub const FEUERBACH:     NodeId = NodeId(1010);
pub const ZUFFENHAUSEN:  NodeId = NodeId(1011);
pub const LB_BAHNHOF:    NodeId = NodeId(2001);
pub const LB_SCHLOSS:    NodeId = NodeId(2002);

pub const LUDWIGSBURG_PLACE: &str = "Ludwigsburg, Baden-Württemberg, Germany";

/// Source serving the synthetic network for the Stuttgart and Ludwigsburg
/// place names (and any bounding box).
pub fn stuttgart_source() -> MemorySource {
    let [min_lat, min_lon, max_lat, max_lon] = STUTTGART_BBOX;
    let gazetteer = Gazetteer::new()
        .with_place(STUTTGART_PLACE, BoundingBox { min_lat, min_lon, max_lat, max_lon })
        .with_place(
            LUDWIGSBURG_PLACE,
            BoundingBox { min_lat: 48.83, min_lon: 9.15, max_lat: 48.92, max_lon: 9.23 },
        );
    MemorySource::new(build_network(), gazetteer)
}

fn build_network() -> RawRegion {
    let mut raw = RawRegion::default();

    raw.add_node(HAUPTBAHNHOF,  GeoPoint::new(48.7840, 9.1829));
    raw.add_node(SCHLOSSPLATZ,  GeoPoint::new(48.7784, 9.1800));
    raw.add_node(ROTEBUEHL,     GeoPoint::new(48.7750, 9.1700));
    raw.add_node(FEUERSEE,      GeoPoint::new(48.7705, 9.1650));
    raw.add_node(MARIENPLATZ,   GeoPoint::new(48.7640, 9.1680));
    raw.add_node(DEGERLOCH,     GeoPoint::new(48.7490, 9.1700));
    raw.add_node(VAIHINGEN,     GeoPoint::new(48.7297, 9.1082));
    raw.add_node(BAD_CANNSTATT, GeoPoint::new(48.8050, 9.2150));
    raw.add_node(NECKARPARK,    GeoPoint::new(48.7925, 9.2280));
    raw.add_node(FEUERBACH,     GeoPoint::new(48.8110, 9.1650));
    raw.add_node(ZUFFENHAUSEN,  GeoPoint::new(48.8330, 9.1700));
    raw.add_node(LB_BAHNHOF,    GeoPoint::new(48.8920, 9.1850));
    raw.add_node(LB_SCHLOSS,    GeoPoint::new(48.8990, 9.1960));

    // City centre: slow, short streets.
    raw.add_two_way(RawEdge::new(HAUPTBAHNHOF, SCHLOSSPLATZ).highway("primary").maxspeed("30"));
    raw.add_two_way(RawEdge::new(SCHLOSSPLATZ, ROTEBUEHL).highway("secondary"));
    raw.add_two_way(RawEdge::new(ROTEBUEHL, FEUERSEE).highway("tertiary"));
    raw.add_two_way(RawEdge::new(FEUERSEE, MARIENPLATZ).highway("residential"));

    // Neue Weinsteige up to Degerloch, with a bend.
    raw.add_two_way(
        RawEdge::new(MARIENPLATZ, DEGERLOCH)
            .highway("primary")
            .maxspeed("50")
            .geometry(vec![GeoPoint::new(48.7580, 9.1760), GeoPoint::new(48.7530, 9.1720)]),
    );

    // B14 from Hauptbahnhof to Vaihingen: longer but fast.
    raw.add_two_way(
        RawEdge::new(HAUPTBAHNHOF, VAIHINGEN)
            .highway("trunk")
            .maxspeed("80")
            .geometry(vec![GeoPoint::new(48.7700, 9.1550), GeoPoint::new(48.7450, 9.1250)]),
    );
    // Local route via Degerloch: shorter, slower.
    raw.add_two_way(RawEdge::new(DEGERLOCH, VAIHINGEN).highway("unclassified"));

    // Neckar side.
    raw.add_two_way(RawEdge::new(HAUPTBAHNHOF, BAD_CANNSTATT).highway("primary").maxspeed("50;60"));
    raw.add_two_way(RawEdge::new(BAD_CANNSTATT, NECKARPARK).highway("secondary"));
    // One-way ramp out of the Neckarpark back to the centre.
    raw.add_edge(RawEdge::new(NECKARPARK, HAUPTBAHNHOF).highway("primary_link"));

    // North.
    raw.add_two_way(RawEdge::new(HAUPTBAHNHOF, FEUERBACH).highway("secondary").maxspeed("50"));
    raw.add_two_way(RawEdge::new(FEUERBACH, ZUFFENHAUSEN).highway("primary"));
    raw.add_two_way(RawEdge::new(ZUFFENHAUSEN, LB_BAHNHOF).highway("trunk").maxspeed("70"));
    raw.add_two_way(RawEdge::new(LB_BAHNHOF, LB_SCHLOSS).highway("road"));

    raw
}
