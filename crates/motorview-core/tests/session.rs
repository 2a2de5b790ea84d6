//! End-to-end checks of a viewer session driven by host events

use approx::assert_relative_eq;
use glam::Vec3;
use motorview_core::{
    Aabb, ClassificationTable, Color, MeshDescriptor, MeshId, PartEvent, SessionConfig,
    ViewerSession,
};

fn fixture_table() -> ClassificationTable {
    ClassificationTable::from_toml_str(
        r#"
        [[group]]
        key = "gear"
        name = "Gear"
        meshes = ["m1", "m2"]

        [[group]]
        key = "shaft"
        name = "Shaft"
        meshes = ["m3"]
        "#,
    )
    .unwrap()
}

fn fixture_asset() -> Vec<MeshDescriptor> {
    vec![
        MeshDescriptor::new(
            "m1",
            Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
            Color::from_hex(0x222222),
        ),
        MeshDescriptor::new(
            "m2",
            Aabb::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0)),
            Color::from_hex(0x333333),
        ),
        MeshDescriptor::new(
            "m3",
            Aabb::new(Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.5, 0.5, 8.0)),
            Color::BLACK,
        ),
    ]
}

fn loaded_session(config: SessionConfig) -> ViewerSession {
    let mut session = ViewerSession::new(fixture_table(), config).unwrap();
    session.load_asset(fixture_asset()).unwrap();
    session
}

fn id(s: &str) -> MeshId {
    MeshId::from(s)
}

#[test]
fn test_end_to_end_fixture() {
    let mut session = loaded_session(SessionConfig::default());

    let catalog = session.catalog().unwrap();
    assert_eq!(catalog.group("gear").unwrap().members, vec![id("m1"), id("m2")]);
    assert_eq!(catalog.group("shaft").unwrap().members, vec![id("m3")]);

    session.handle(PartEvent::PointerEnter(id("m1")));
    assert_eq!(session.interaction_state().hovered.as_ref().unwrap().group_name, "Gear");

    session.handle(PartEvent::PointerLeave(id("m1")));
    assert!(session.interaction_state().hovered.is_none());

    session.handle(PartEvent::Click(id("m3")));
    assert_eq!(session.interaction_state().selected.as_ref().unwrap().group_name, "Shaft");

    session.handle(PartEvent::Cancel);
    assert!(session.interaction_state().selected.is_none());
}

#[test]
fn test_hover_restores_exact_color() {
    let mut session = loaded_session(SessionConfig::default());
    let original = session.catalog().unwrap().base_color(&id("m2")).unwrap();

    let entered = session.handle(PartEvent::PointerEnter(id("m2")));
    assert_eq!(entered.len(), 1);
    assert_ne!(session.current_highlight(&id("m2")), Some(original));

    let left = session.handle(PartEvent::PointerLeave(id("m2")));
    assert_eq!(left[0].mesh, id("m2"));
    assert_eq!(left[0].color, original);
    assert_eq!(session.current_highlight(&id("m2")), Some(original));
}

#[test]
fn test_last_click_wins() {
    let mut session = loaded_session(SessionConfig::default());
    let selected_color = session.config().highlight.selected_color;

    session.handle(PartEvent::Click(id("m1")));
    session.handle(PartEvent::Click(id("m3")));

    assert_eq!(session.interaction_state().selected.as_ref().unwrap().group_name, "Shaft");
    assert_ne!(session.current_highlight(&id("m1")), Some(selected_color));
    assert_eq!(session.current_highlight(&id("m3")), Some(selected_color));
}

#[test]
fn test_cancel_leaves_hover() {
    let mut session = loaded_session(SessionConfig::default());
    session.handle(PartEvent::Click(id("m1")));
    session.handle(PartEvent::PointerEnter(id("m3")));
    session.handle(PartEvent::Cancel);

    let state = session.interaction_state();
    assert!(state.selected.is_none());
    assert_eq!(state.hovered.as_ref().unwrap().mesh, id("m3"));
}

#[test]
fn test_label_distance() {
    let session = loaded_session(SessionConfig::default());
    let catalog = session.catalog().unwrap();

    for key in ["gear", "shaft"] {
        let group = catalog.group(key).unwrap();
        let max_radius = catalog
            .member_bounds(group)
            .iter()
            .map(Aabb::diagonal)
            .fold(0.0_f32, f32::max);
        let anchor = session.label_anchor_for(key).unwrap();
        let offset = anchor.label_position - anchor.group_center;
        assert_relative_eq!(offset.truncate().length(), max_radius * 3.0, epsilon = 1e-4);
        assert_relative_eq!(offset.z, 0.0);
    }
}

#[test]
fn test_rotation_over_ticks() {
    let mut config = SessionConfig::default();
    config.rotation.increment = 0.005;
    let mut session = loaded_session(config);

    for _ in 0..100 {
        assert_eq!(session.tick(), 0.005);
    }
    assert_relative_eq!(session.rotation().angle(), 0.5, epsilon = 1e-4);

    session.handle(PartEvent::PointerEnter(id("m1")));
    for _ in 0..100 {
        assert_eq!(session.tick(), 0.0);
    }

    session.handle(PartEvent::Click(id("m1")));
    session.handle(PartEvent::PointerLeave(id("m1")));
    for _ in 0..10 {
        assert_eq!(session.tick(), 0.0);
    }

    // Both cleared: rotation resumes immediately
    session.handle(PartEvent::Cancel);
    assert_eq!(session.tick(), 0.005);
    assert_relative_eq!(session.rotation().angle(), 0.505, epsilon = 1e-4);
}

#[test]
fn test_builtin_engine_catalog() {
    let mut session =
        ViewerSession::new(ClassificationTable::builtin_engine().unwrap(), SessionConfig::default()).unwrap();
    let asset = (0..60)
        .map(|i| {
            let min = Vec3::new(i as f32, 0.0, 0.0);
            MeshDescriptor::new(format!("mesh_{i}").as_str(), Aabb::new(min, min + Vec3::ONE), Color::BLACK)
        })
        .collect();
    let catalog = session.load_asset(asset).unwrap();

    let names: Vec<&str> = catalog.groups().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Gear", "Shaft", "Cylinder", "Piston 1", "Piston 2", "Piston 3"]);
    assert_eq!(session.label_anchors().len(), 6);
}
