//! Integration tests for pf-service.

use std::sync::{Arc, Barrier};

use pf_core::{BoundingBox, GeoPoint, NodeId, RegionDescriptor};
use pf_spatial::{Gazetteer, MemorySource, RawEdge, RawRegion, RegionSource, SourceError};

use crate::{PathfinderService, ServiceConfig};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Provider id for grid cell (row, col) of the test city.
fn city_id(row: u64, col: u64) -> NodeId {
    NodeId(100 + row * 10 + col)
}

/// 3×3 two-way residential grid at 48.70..48.72 / 9.10..9.12 plus a
/// disconnected two-node island at lon 9.50.
fn network() -> RawRegion {
    let mut raw = RawRegion::default();
    for row in 0..3 {
        for col in 0..3 {
            raw.add_node(city_id(row, col), GeoPoint::new(48.70 + 0.01 * row as f64, 9.10 + 0.01 * col as f64));
            if col < 2 {
                raw.add_two_way(RawEdge::new(city_id(row, col), city_id(row, col + 1)).highway("residential"));
            }
            if row < 2 {
                raw.add_two_way(RawEdge::new(city_id(row, col), city_id(row + 1, col)).highway("residential"));
            }
        }
    }
    raw.add_node(NodeId(900), GeoPoint::new(48.71, 9.50));
    raw.add_node(NodeId(901), GeoPoint::new(48.71, 9.51));
    raw.add_two_way(RawEdge::new(NodeId(900), NodeId(901)).highway("primary"));
    raw
}

fn city_source() -> MemorySource {
    let gazetteer = Gazetteer::new()
        .with_place("Testville", BoundingBox::new(48.69, 9.09, 48.73, 9.13).unwrap())
        .with_place("Island", BoundingBox::new(48.70, 9.49, 48.72, 9.52).unwrap());
    MemorySource::new(network(), gazetteer)
}

fn config(locations: Vec<RegionDescriptor>) -> ServiceConfig {
    ServiceConfig { locations, ..ServiceConfig::default() }
}

fn testville() -> PathfinderService {
    PathfinderService::start(
        Arc::new(city_source()),
        &config(vec![RegionDescriptor::place("Testville")]),
    )
    .unwrap()
}

/// Delegates to the city source, but a fetch of the place `"Slow"` parks on
/// two barriers so a test can act while the rebuild is in flight.
struct GatedSource {
    inner:   MemorySource,
    entered: Barrier,
    release: Barrier,
}

impl GatedSource {
    fn new() -> Self {
        GatedSource { inner: city_source(), entered: Barrier::new(2), release: Barrier::new(2) }
    }
}

impl RegionSource for GatedSource {
    fn fetch(&self, region: &RegionDescriptor) -> Result<RawRegion, SourceError> {
        if *region != RegionDescriptor::place("Slow") {
            return self.inner.fetch(region);
        }
        self.entered.wait();
        self.release.wait();
        // Testville and Island together.
        let both = BoundingBox::new(48.69, 9.09, 48.73, 9.52)
            .map_err(|e| SourceError::NotFound(e.to_string()))?;
        self.inner.fetch(&RegionDescriptor::BoundingBox(both))
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod query_tests {
    use super::*;
    use crate::Coordinates;

    #[test]
    fn path_by_id_returns_both_metrics() {
        let service = testville();
        let response = service.shortest_path_by_id(city_id(0, 0), city_id(2, 2));
        assert_eq!(response.error, None);

        let fast = response.shortest_by_travel_time.unwrap();
        let short = response.shortest_by_length.unwrap();
        // Manhattan grid: 4 hops, 5 nodes, either way.
        assert_eq!(fast.len(), 5);
        assert_eq!(short.len(), 5);
        assert_eq!(fast[0], Coordinates { lat: 48.70, lon: 9.10 });
        assert_eq!(*short.last().unwrap(), Coordinates::from(GeoPoint::new(48.70 + 0.02, 9.10 + 0.02)));
    }

    #[test]
    fn same_node_is_single_point() {
        let service = testville();
        let response = service.shortest_path_by_id(city_id(1, 1), city_id(1, 1));
        assert_eq!(response.error, None);
        assert_eq!(response.shortest_by_length.unwrap().len(), 1);
        assert_eq!(response.shortest_by_travel_time.unwrap().len(), 1);
    }

    #[test]
    fn unknown_node_reported_once() {
        let service = testville();
        let response = service.shortest_path_by_id(city_id(0, 0), NodeId(999));
        assert_eq!(response.error.as_deref(), Some("node 999 not found in graph"));
        assert_eq!(response.shortest_by_travel_time, None);
        assert_eq!(response.shortest_by_length, None);
    }

    #[test]
    fn disconnected_regions_unreachable() {
        let service = PathfinderService::start(
            Arc::new(city_source()),
            &config(vec![RegionDescriptor::place("Testville"), RegionDescriptor::place("Island")]),
        )
        .unwrap();
        let response = service.shortest_path_by_id(city_id(0, 0), NodeId(900));
        assert_eq!(response.error.as_deref(), Some("no path from 100 to 900"));
        assert!(response.shortest_by_length.is_none());
        assert!(response.shortest_by_travel_time.is_none());
        assert_eq!(service.health().components, 2);
    }

    #[test]
    fn coordinates_bookend_the_path() {
        let service = testville();
        let source = Coordinates { lat: 48.7002, lon: 9.0999 }; // near (0,0)
        let target = Coordinates { lat: 48.7199, lon: 9.1203 }; // near (2,2)
        let response = service.shortest_path_by_coordinates(source, target);
        assert_eq!(response.error, None);

        for path in [response.shortest_by_travel_time.unwrap(), response.shortest_by_length.unwrap()] {
            assert_eq!(path.len(), 7);
            assert_eq!(path[0], source);
            assert_eq!(path[1], Coordinates { lat: 48.70, lon: 9.10 });
            assert_eq!(path[6], target);
        }
    }

    #[test]
    fn invalid_coordinates_rejected() {
        let service = testville();
        let response = service.shortest_path_by_coordinates(
            Coordinates { lat: 95.0, lon: 9.1 },
            Coordinates { lat: 48.7, lon: 9.1 },
        );
        assert!(response.error.unwrap().starts_with("invalid coordinate"));
        assert!(response.shortest_by_length.is_none());
    }

    #[test]
    fn snapshot_lists_every_vertex_and_edge() {
        let service = testville();
        let snapshot = service.graph_snapshot();
        assert_eq!(snapshot.error, None);

        let vertices = snapshot.vertices.unwrap();
        assert_eq!(vertices.len(), 9);
        assert!(vertices.windows(2).all(|w| w[0].id < w[1].id));

        let edges = snapshot.edges.unwrap();
        // 12 two-way streets.
        assert_eq!(edges.len(), 24);
        for line in &edges {
            assert_eq!(line.len(), 2);
            assert!(vertices.iter().any(|v| v.lat == line[0].lat && v.lon == line[0].lon));
        }
    }
}

// ── Registry lifecycle ────────────────────────────────────────────────────────

#[cfg(test)]
mod registry_tests {
    use std::thread;

    use super::*;
    use pf_spatial::{BuildError, EmptyGraph, GraphBuilder, Metric, SpeedPolicy};

    use crate::Coordinates;

    #[test]
    fn queries_before_first_build_fail_with_empty_graph() {
        let service = PathfinderService::new(GraphBuilder::new(Arc::new(city_source()), SpeedPolicy::default()));
        assert!(!service.registry().is_ready());
        assert_eq!(service.registry().current().unwrap_err(), EmptyGraph);
        assert_eq!(service.registry().descriptors(), None);

        let by_id = service.shortest_path_by_id(city_id(0, 0), city_id(0, 1));
        assert_eq!(by_id.error.as_deref(), Some("graph is empty"));
        assert!(by_id.shortest_by_length.is_none() && by_id.shortest_by_travel_time.is_none());

        let by_coords = service.shortest_path_by_coordinates(
            Coordinates { lat: 48.7, lon: 9.1 },
            Coordinates { lat: 48.71, lon: 9.11 },
        );
        assert_eq!(by_coords.error.as_deref(), Some("graph is empty"));

        let snapshot = service.graph_snapshot();
        assert_eq!(snapshot.error.as_deref(), Some("graph is empty"));
        assert!(snapshot.vertices.is_none() && snapshot.edges.is_none());

        let health = service.health();
        assert!(!health.loaded);
        assert_eq!(health.epoch, None);
    }

    #[test]
    fn reconfigure_publishes_new_epoch() {
        let service = testville();
        assert_eq!(service.health().epoch, Some(1));
        assert_eq!(service.health().nodes, 9);

        let epoch = service
            .reconfigure(vec![RegionDescriptor::place("Testville"), RegionDescriptor::place("Island")])
            .unwrap();
        assert_eq!(epoch, 2);
        let health = service.health();
        assert_eq!(health.nodes, 11);
        assert_eq!(health.edges, 26);
        assert_eq!(service.registry().descriptors().unwrap().len(), 2);
    }

    #[test]
    fn bbox_reconfigure_stays_inside_box() {
        let service = testville();
        let bbox = BoundingBox::new(48.695, 9.095, 48.715, 9.125).unwrap();
        service.reconfigure(vec![RegionDescriptor::BoundingBox(bbox)]).unwrap();
        let generation = service.registry().current().unwrap();
        assert_eq!(generation.graph.node_count(), 6);
        assert!(generation.graph.node_pos.iter().all(|&p| bbox.contains(p)));
    }

    #[test]
    fn failed_reconfigure_keeps_previous_generation() {
        let service = testville();
        let before = service.shortest_path_by_id(city_id(0, 0), city_id(2, 2));
        let held = service.registry().current().unwrap();

        let malformed = service.reconfigure_json(r#"[{"type": "city", "location": "Testville"}]"#);
        assert!(matches!(malformed, Err(BuildError::NoValidLocation(_))));
        let unknown = service.reconfigure(vec![RegionDescriptor::place("Atlantis")]);
        assert!(matches!(unknown, Err(BuildError::NoValidLocation(_))));
        let partial = service.reconfigure(vec![
            RegionDescriptor::place("Island"),
            RegionDescriptor::place("Atlantis"),
        ]);
        assert!(partial.is_err());

        let current = service.registry().current().unwrap();
        assert!(Arc::ptr_eq(&held, &current));
        assert_eq!(current.epoch, 1);
        assert_eq!(service.shortest_path_by_id(city_id(0, 0), city_id(2, 2)), before);
        assert_eq!(
            service.registry().descriptors(),
            Some(vec![RegionDescriptor::place("Testville")])
        );
    }

    #[test]
    fn reconfigure_json_accepts_all_shapes() {
        let service = testville();
        assert_eq!(service.reconfigure_json(r#"{"type":"location","location":"Island"}"#).unwrap(), 2);
        assert_eq!(service.health().nodes, 2);
        assert_eq!(
            service
                .reconfigure_json(r#"{"locations":[{"type":"bbox","bbox":[48.69,9.09,48.73,9.13]}]}"#)
                .unwrap(),
            3
        );
        assert_eq!(service.health().nodes, 9);
        assert_eq!(service.reconfigure_json(r#"[{"type":"location","location":"Testville"}]"#).unwrap(), 4);
        assert!(matches!(service.reconfigure_json("[]"), Err(BuildError::NoValidLocation(_))));
        assert!(matches!(service.reconfigure_json("{oops"), Err(BuildError::NoValidLocation(_))));
        assert_eq!(service.health().epoch, Some(4));
    }

    #[test]
    fn readers_keep_serving_during_rebuild() {
        let source = Arc::new(GatedSource::new());
        let service = PathfinderService::with_config(
            source.clone(),
            &config(vec![RegionDescriptor::place("Testville")]),
        )
        .unwrap();
        service.reconfigure(vec![RegionDescriptor::place("Testville")]).unwrap();

        thread::scope(|s| {
            let rebuild = s.spawn(|| service.reconfigure(vec![RegionDescriptor::place("Slow")]));
            source.entered.wait();

            let readers: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        for _ in 0..25 {
                            let generation = service.registry().current().unwrap();
                            assert_eq!(generation.epoch, 1);
                            assert_eq!(generation.graph.node_count(), 9);
                            let route = generation
                                .engine()
                                .shortest_path(city_id(0, 0), city_id(2, 2), Metric::Length)
                                .unwrap();
                            assert_eq!(route.nodes.len(), 5);
                        }
                    })
                })
                .collect();
            for reader in readers {
                reader.join().unwrap();
            }

            // A query that grabbed generation 1 keeps it across the swap.
            let pinned = service.registry().current().unwrap();
            source.release.wait();
            assert_eq!(rebuild.join().unwrap().unwrap(), 2);
            assert_eq!(pinned.epoch, 1);
            assert_eq!(pinned.graph.node_count(), 9);
        });

        let health = service.health();
        assert_eq!(health.epoch, Some(2));
        assert_eq!(health.nodes, 11);
    }
}

// ── Wire shapes ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod dto_tests {
    use serde_json::json;

    use super::*;
    use crate::{
        Coordinates, Health, ReconfigureRequest, ShortestPathByCoordinatesRequest,
        ShortestPathByIdRequest, ShortestPathResponse,
    };

    #[test]
    fn response_field_names() {
        let service = testville();
        let ok = serde_json::to_value(service.shortest_path_by_id(city_id(0, 0), city_id(0, 1))).unwrap();
        assert_eq!(ok["error"], json!(null));
        assert_eq!(ok["shortestByTravelTime"], json!([{ "lat": 48.70, "lon": 9.10 }, { "lat": 48.70, "lon": 9.10 + 0.01 }]));
        assert!(ok["shortestByLength"].is_array());

        let err = serde_json::to_value(ShortestPathResponse::failure("graph is empty")).unwrap();
        assert_eq!(
            err,
            json!({ "error": "graph is empty", "shortestByTravelTime": null, "shortestByLength": null })
        );
    }

    #[test]
    fn requests_parse() {
        let by_id: ShortestPathByIdRequest = serde_json::from_value(json!({ "sourceId": 1, "targetId": 2 })).unwrap();
        assert_eq!(by_id, ShortestPathByIdRequest { source_id: NodeId(1), target_id: NodeId(2) });

        // Both the `lon` and the legacy `long` spelling are accepted.
        let by_coords: ShortestPathByCoordinatesRequest = serde_json::from_value(json!({
            "source": { "lat": 48.7, "long": 9.1 },
            "target": { "lat": 48.8, "lon": 9.2 },
        }))
        .unwrap();
        assert_eq!(by_coords.source, Coordinates { lat: 48.7, lon: 9.1 });
        assert_eq!(by_coords.target, Coordinates { lat: 48.8, lon: 9.2 });

        let reconfigure: ReconfigureRequest = serde_json::from_value(json!({
            "locations": [{ "type": "location", "location": "Testville" }]
        }))
        .unwrap();
        assert_eq!(reconfigure.locations, vec![RegionDescriptor::place("Testville")]);

        let bad: Result<ReconfigureRequest, _> =
            serde_json::from_value(json!({ "locations": [{ "type": "bbox", "bbox": [1, 2] }] }));
        assert!(bad.is_err());

        // Same body shapes as the reconfigure endpoint.
        let bare: ReconfigureRequest =
            serde_json::from_value(json!([{ "type": "location", "location": "Testville" }])).unwrap();
        assert_eq!(bare, reconfigure);
        let parsed: ReconfigureRequest = r#"{"type":"location","location":"Testville"}"#.parse().unwrap();
        assert_eq!(parsed, reconfigure);
    }

    #[test]
    fn snapshot_and_health_shape() {
        let service = testville();
        let snapshot = serde_json::to_value(service.graph_snapshot()).unwrap();
        assert_eq!(snapshot["vertices"][0], json!({ "id": 100, "lat": 48.70, "lon": 9.10 }));
        assert_eq!(snapshot["edges"][0][0], json!({ "lat": 48.70, "lon": 9.10 }));

        let health: Health = serde_json::from_value(serde_json::to_value(service.health()).unwrap()).unwrap();
        assert_eq!(health, Health { loaded: true, epoch: Some(1), nodes: 9, edges: 24, components: 1 });
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use pf_core::CoreError;

    use super::*;
    use crate::config::{STUTTGART_BBOX, STUTTGART_PLACE};
    use crate::ServiceError;

    #[test]
    fn default_is_stuttgart() {
        let config = ServiceConfig::default();
        assert_eq!(config.locations[0], RegionDescriptor::place(STUTTGART_PLACE));
        let [a, b, c, d] = STUTTGART_BBOX;
        assert_eq!(config.locations[1], RegionDescriptor::bbox(a, b, c, d).unwrap());
        assert_eq!(config.fallback_speed_kph, 50.0);
        assert_eq!(config.speed_policy().unwrap().fallback_kph(), 50.0);
    }

    #[test]
    fn parses_every_document_shape() {
        let full = ServiceConfig::from_json_str(
            r#"{"locations":[{"type":"location","location":"Testville"}],"fallbackSpeedKph":30}"#,
        )
        .unwrap();
        assert_eq!(full.locations, vec![RegionDescriptor::place("Testville")]);
        assert_eq!(full.fallback_speed_kph, 30.0);

        let single = ServiceConfig::from_json_str(r#"{"type":"bbox","bbox":[48.6,9.0,48.9,9.4]}"#).unwrap();
        assert_eq!(single.locations, vec![RegionDescriptor::bbox(48.6, 9.0, 48.9, 9.4).unwrap()]);
        assert_eq!(single.fallback_speed_kph, 50.0);

        let list = ServiceConfig::from_json_str(r#"[{"type":"location","location":"A"},{"type":"location","location":"B"}]"#)
            .unwrap();
        assert_eq!(list.locations.len(), 2);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(ServiceConfig::from_json_str("{nope"), Err(CoreError::Config(_))));
        assert!(matches!(
            ServiceConfig::from_json_str(r#"{"locations":[{"type":"location","location":"A"}],"fallbackSpeedKph":0}"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            ServiceConfig::from_json_str(r#"{"locations":[{"type":"polygon"}]}"#),
            Err(CoreError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            ServiceConfig::from_json_str(r#"{"locations":[]}"#),
            Err(CoreError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        // Absent file: built-in default.
        assert_eq!(ServiceConfig::load_or_default(&path).unwrap(), ServiceConfig::default());
        assert!(matches!(ServiceConfig::from_path(&path), Err(CoreError::Io(_))));

        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"type":"location","location":"Testville"}}"#).unwrap();
        drop(file);

        let loaded = ServiceConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded.locations, vec![RegionDescriptor::place("Testville")]);

        // A config file round-trips through serde.
        let text = serde_json::to_string(&loaded).unwrap();
        assert_eq!(ServiceConfig::from_json_str(&text).unwrap(), loaded);
    }

    #[test]
    fn start_fails_on_unbuildable_config() {
        let result = PathfinderService::start(
            Arc::new(city_source()),
            &config(vec![RegionDescriptor::place("Atlantis")]),
        );
        assert!(matches!(result, Err(ServiceError::Build(_))));
    }

    #[test]
    fn serde_rejects_unusable_fallback_speed() {
        for kph in ["0", "-20", "0.5"] {
            let doc = format!(r#"{{"locations":[{{"type":"location","location":"A"}}],"fallbackSpeedKph":{kph}}}"#);
            assert!(serde_json::from_str::<ServiceConfig>(&doc).is_err(), "accepted {kph}");
            assert!(matches!(ServiceConfig::from_json_str(&doc), Err(CoreError::Config(_))));
        }

        let ok: ServiceConfig = serde_json::from_str(
            r#"{"locations":[{"type":"location","location":"A"}],"fallbackSpeedKph":18}"#,
        )
        .unwrap();
        assert_eq!(ok.speed_policy().unwrap().fallback_kph(), 18.0);
    }

    #[test]
    fn start_fails_once_on_unusable_fallback_speed() {
        let mut bad = config(vec![RegionDescriptor::place("Testville")]);
        bad.fallback_speed_kph = 0.0;
        assert!(matches!(bad.speed_policy(), Err(CoreError::Config(_))));
        assert!(matches!(
            PathfinderService::start(Arc::new(city_source()), &bad),
            Err(ServiceError::Config(CoreError::Config(_)))
        ));
    }
}
