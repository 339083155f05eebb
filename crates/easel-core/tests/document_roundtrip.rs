//! Integration tests: document import → export round-trip.
//!
//! Verifies that identity, stacking order, text attributes, and eraser
//! marks survive a full trip through the JSON envelope, and that re-export
//! is stable (exporting an imported document twice gives identical bytes).

use easel_core::model::{FontWeight, ObjectKind, Shape};
use easel_core::serialize::{export_json, import_json};

fn demo_scene() -> easel_core::Scene {
    let input = include_str!("fixtures/demo_scene.json");
    import_json(input).expect("fixture should import")
}

// ─── Import ──────────────────────────────────────────────────────────────

#[test]
fn fixture_imports_with_order_and_ids() {
    let scene = demo_scene();
    assert_eq!(scene.len(), 5);

    let ids: Vec<&str> = scene.objects().iter().map(|o| o.meta.id.as_str()).collect();
    assert_eq!(
        ids,
        ["rect-001", "circle-002", "text-003", "path-004", "group-005"]
    );

    let kinds: Vec<ObjectKind> = scene.objects().iter().map(|o| o.kind()).collect();
    assert_eq!(
        kinds,
        [
            ObjectKind::Rect,
            ObjectKind::Circle,
            ObjectKind::Text,
            ObjectKind::Path,
            ObjectKind::Group,
        ]
    );
}

#[test]
fn fixture_preserves_names_and_text_attributes() {
    let scene = demo_scene();

    assert_eq!(scene.objects()[0].meta.name.as_deref(), Some("hero-box"));

    let text = scene.objects()[2].text.as_ref().expect("text block");
    assert_eq!(text.text, "Quarterly report");
    assert_eq!(text.font_weight, FontWeight::Bold);
    assert!(text.underline);
}

#[test]
fn fixture_preserves_eraser_marks_and_group_children() {
    let scene = demo_scene();

    let path = &scene.objects()[3];
    assert_eq!(path.props.eraser.len(), 1);
    assert_eq!(path.props.eraser[0].points().len(), 3);

    let Shape::Group { children } = &scene.objects()[4].shape else {
        panic!("expected group payload");
    };
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].id().as_str(), "group-005-a");
    assert_eq!(children[1].id().as_str(), "group-005-b");
}

// ─── Round-trip ──────────────────────────────────────────────────────────

#[test]
fn reexport_is_stable() {
    let scene = demo_scene();
    let first = export_json(&scene).expect("export");
    let second = export_json(&import_json(&first).expect("reimport")).expect("export again");
    pretty_assertions::assert_eq!(first, second);
}

#[test]
fn roundtrip_preserves_every_id() {
    let scene = demo_scene();
    let restored = import_json(&export_json(&scene).expect("export")).expect("reimport");

    for (a, b) in scene.objects().iter().zip(restored.objects()) {
        assert_eq!(a.id(), b.id(), "id lost for {:?}", a.kind());
        assert_eq!(a.meta.name, b.meta.name);
    }
}

#[test]
fn roundtrip_keeps_data_extension_on_children() {
    let scene = demo_scene();
    let json = export_json(&scene).expect("export");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse own export");

    let group = &value["objects"][4];
    assert_eq!(group["data"]["name"], "badge-group");
    assert_eq!(group["objects"][0]["data"]["id"], "group-005-a");
    assert_eq!(group["objects"][1]["data"]["id"], "group-005-b");
}
