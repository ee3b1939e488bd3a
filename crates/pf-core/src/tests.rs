//! Unit tests for pf-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeIdx, NodeId, NodeIdx};

    #[test]
    fn index_roundtrip() {
        let idx = NodeIdx(42);
        assert_eq!(idx.index(), 42);
        assert_eq!(NodeIdx::try_from(42usize).unwrap(), idx);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeIdx::INVALID.0, u32::MAX);
        assert_eq!(EdgeIdx::INVALID.0, u32::MAX);
        assert_eq!(EdgeIdx::default(), EdgeIdx::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(NodeIdx(7).to_string(), "NodeIdx(7)");
        assert_eq!(NodeId(25_161_390).to_string(), "25161390");
    }

    #[test]
    fn node_id_serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&NodeId(12)).unwrap(), "12");
        let id: NodeId = serde_json::from_str("9007199254").unwrap();
        assert_eq!(id, NodeId(9_007_199_254));
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::polyline_length_m;
    use crate::{BoundingBox, GeoPoint};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(48.7758, 9.1829);
        assert!(p.distance_m(p) < 1e-6);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111 km
        let a = GeoPoint::new(48.0, 9.0);
        let b = GeoPoint::new(49.0, 9.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn polyline_sums_segments() {
        let pts = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.0, 0.02),
        ];
        let direct = pts[0].distance_m(pts[2]);
        assert!((polyline_length_m(&pts) - direct).abs() < 1e-6);
        assert_eq!(polyline_length_m(&pts[..1]), 0.0);
    }

    #[test]
    fn bbox_validation() {
        assert!(BoundingBox::new(48.69, 9.03, 48.86, 9.31).is_ok());
        assert!(BoundingBox::new(48.86, 9.03, 48.69, 9.31).is_err(), "inverted lat");
        assert!(BoundingBox::new(48.69, 9.31, 48.86, 9.03).is_err(), "inverted lon");
        assert!(BoundingBox::new(f64::NAN, 9.0, 48.0, 9.1).is_err());
        assert!(BoundingBox::new(-91.0, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn bbox_contains_is_inclusive() {
        let b = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(b.contains(GeoPoint::new(0.0, 0.0)));
        assert!(b.contains(GeoPoint::new(1.0, 1.0)));
        assert!(b.contains(GeoPoint::new(0.5, 0.5)));
        assert!(!b.contains(GeoPoint::new(1.0001, 0.5)));
    }
}

#[cfg(test)]
mod region {
    use serde_json::json;

    use crate::{parse_descriptors, BoundingBox, CoreError, RegionDescriptor};

    #[test]
    fn parses_place_and_bbox() {
        let place = RegionDescriptor::from_value(json!({
            "type": "location",
            "location": "Stuttgart, Baden-Württemberg, Germany"
        }))
        .unwrap();
        assert_eq!(place, RegionDescriptor::place("Stuttgart, Baden-Württemberg, Germany"));

        let bbox = RegionDescriptor::from_value(json!({
            "type": "bbox",
            "bbox": [48.6920188, 9.0386007, 48.8663994, 9.3160228]
        }))
        .unwrap();
        assert_eq!(
            bbox,
            RegionDescriptor::BoundingBox(
                BoundingBox::new(48.6920188, 9.0386007, 48.8663994, 9.3160228).unwrap()
            )
        );
    }

    #[test]
    fn rejects_unknown_and_incomplete_shapes() {
        let bad = [
            json!({ "type": "city", "location": "Stuttgart" }),
            json!({ "type": "location" }),
            json!({ "type": "location", "location": "   " }),
            json!({ "type": "bbox" }),
            json!({ "type": "bbox", "bbox": [1.0, 2.0, 3.0] }),
            json!({ "type": "bbox", "bbox": [3.0, 2.0, 1.0, 4.0] }),
            json!({ "location": "Stuttgart" }),
            json!("Stuttgart"),
        ];
        for value in bad {
            let result = RegionDescriptor::from_value(value.clone());
            assert!(
                matches!(result, Err(CoreError::InvalidDescriptor(_))),
                "{value} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn wire_roundtrip_keeps_shape() {
        let region = RegionDescriptor::bbox(1.0, 2.0, 3.0, 4.0).unwrap();
        let text = serde_json::to_value(&region).unwrap();
        assert_eq!(text, json!({ "type": "bbox", "bbox": [1.0, 2.0, 3.0, 4.0] }));
        let back: RegionDescriptor = serde_json::from_value(text).unwrap();
        assert_eq!(back, region);
    }

    #[test]
    fn parse_list_or_locations_object() {
        let list = parse_descriptors(r#"[{"type":"location","location":"A"}]"#).unwrap();
        assert_eq!(list, vec![RegionDescriptor::place("A")]);

        let obj = parse_descriptors(
            r#"{"locations":[{"type":"location","location":"A"},{"type":"bbox","bbox":[0,0,1,1]}]}"#,
        )
        .unwrap();
        assert_eq!(obj.len(), 2);
        assert!(matches!(obj[1], RegionDescriptor::BoundingBox(_)));

        let single = parse_descriptors(r#"{"type":"bbox","bbox":[0,0,1,1]}"#).unwrap();
        assert_eq!(single, vec![RegionDescriptor::bbox(0.0, 0.0, 1.0, 1.0).unwrap()]);
    }

    #[test]
    fn parse_rejects_empty_and_garbage() {
        assert!(matches!(parse_descriptors("[]"), Err(CoreError::InvalidDescriptor(_))));
        assert!(matches!(parse_descriptors("{}"), Err(CoreError::InvalidDescriptor(_))));
        assert!(matches!(
            parse_descriptors(r#"{"type":"city","location":"A"}"#),
            Err(CoreError::InvalidDescriptor(_))
        ));
        assert!(matches!(parse_descriptors("42"), Err(CoreError::InvalidDescriptor(_))));
        assert!(matches!(parse_descriptors("{not json"), Err(CoreError::Json(_))));
        // One bad entry poisons the whole list.
        assert!(parse_descriptors(r#"[{"type":"location","location":"A"},{"type":"x"}]"#).is_err());
    }
}
