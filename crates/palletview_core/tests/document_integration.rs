//! Document -> graph integration tests
//!
//! Exercises the full path from JSON text through validation and graph
//! construction, using documents shaped like the packing exporter's output.

use palletview_core::{
    DocumentValidator, GraphBuilder, NodeKind, PlacedBox, SceneDocument, SceneExporter, Shading,
    SkipReason, ValidationIssue, Vec3, CONTAINER_NODE_NAME,
};

const EPSILON: f32 = 0.0001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn pallet_json() -> String {
    SceneExporter::new([120.0, 80.0, 100.0])
        .with_boxes([
            PlacedBox::new([40.0, 30.0, 20.0], [0.0, 0.0, 0.0]),
            PlacedBox::new([40.0, 30.0, 20.0], [40.0, 0.0, 0.0]),
            PlacedBox::new([40.0, 30.0, 20.0], [0.0, 30.0, 0.0]),
        ])
        .to_json()
        .expect("export should serialize")
}

#[test]
fn test_exported_document_round_trips_through_builder() {
    let doc = SceneDocument::from_json(&pallet_json()).expect("exported JSON should parse");
    assert!(DocumentValidator::validate(&doc).is_empty());

    let built = GraphBuilder::new().build(&doc);
    // One node per box plus the container
    assert_eq!(built.graph.node_count(), 4);
    assert!(built.report.is_complete());

    let (_, container) = built.graph.find_by_name(CONTAINER_NODE_NAME).unwrap();
    assert_eq!(container.kind(), NodeKind::LineSegments);
    assert_eq!(container.material().shading, Shading::Line);

    let (_, first) = built.graph.find_by_name("Box 1").unwrap();
    assert_eq!(first.kind(), NodeKind::Mesh);
    assert!(first.material().transparent);
    let center = first.world_center();
    assert!(approx_eq(center.x, 20.0) && approx_eq(center.y, 15.0) && approx_eq(center.z, 10.0));

    let bounds = built.graph.bounding_box();
    assert_eq!(bounds.min, Vec3::ZERO);
    assert_eq!(bounds.max, Vec3::new(120.0, 80.0, 100.0));
}

#[test]
fn test_hand_written_document_with_dangling_reference() {
    let json = r#"{
        "materials": [
            {"uuid": "red", "type": "MeshLambertMaterial", "color": 16711680},
            {"uuid": "odd", "type": "MeshToonMaterial", "color": 255}
        ],
        "geometries": [
            {"uuid": "cube", "type": "BoxGeometry", "data": {"width": 1, "height": 1, "depth": 1}},
            {"uuid": "knot", "type": "TorusKnotGeometry", "data": {}}
        ],
        "objects": [
            {"name": "a", "type": "Mesh", "geometry": "cube", "material": "red"},
            {"name": "b", "type": "Mesh", "geometry": "missing", "material": "red"},
            {"name": "c", "type": "Mesh", "geometry": "knot", "material": "odd"}
        ]
    }"#;
    let doc = SceneDocument::from_json(json).unwrap();

    let issues = DocumentValidator::validate(&doc);
    assert!(issues.contains(&ValidationIssue::DanglingGeometry {
        object: "b".into(),
        uuid: "missing".into()
    }));

    let built = GraphBuilder::new().build(&doc);
    assert_eq!(built.graph.node_count(), 2);
    assert_eq!(
        built.report.skipped[0].reason,
        SkipReason::MissingGeometry("missing".into())
    );

    // Unknown material -> opaque gray, unknown geometry -> unit cube
    let (_, c) = built.graph.find_by_name("c").unwrap();
    assert_eq!(c.material().color.to_hex(), 0x808080);
    assert_eq!(c.material().effective_alpha(), 1.0);
    assert_eq!(c.geometry().bounds().size(), Vec3::ONE);
}

#[test]
fn test_malformed_documents_fail_to_parse() {
    assert!(SceneDocument::from_json("").is_err());
    assert!(SceneDocument::from_json("[]").is_err());
    assert!(SceneDocument::from_json(r#"{"materials": {}, "geometries": [], "objects": []}"#).is_err());
}

#[test]
fn test_save_and_load_file() {
    let doc = SceneDocument::from_json(&pallet_json()).unwrap();
    let path = std::env::temp_dir().join(format!("palletview_doc_{}.json", std::process::id()));
    doc.save(&path).expect("save should succeed");
    let loaded = SceneDocument::load(&path).expect("load should succeed");
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, doc);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let result = SceneDocument::load("/definitely/not/here/scene.json");
    assert!(matches!(result, Err(palletview_core::DocumentError::Io(_))));
}
