//! Pointer observers, highlight application and idle rotation

use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_picking::prelude::*;
use motorview_core::{HighlightChange, InteractionState, PartEvent, RotationAxis};

use crate::types::*;

/// Plugin wiring picking events into the part session
pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingPartEvents>()
            .add_observer(on_part_over)
            .add_observer(on_part_out)
            .add_observer(on_part_click)
            .add_systems(
                Update,
                (handle_deselection, apply_part_events, update_cursor, rotate_assembly).chain(),
            );
    }
}

fn on_part_over(
    trigger: On<Pointer<Over>>,
    parts: Query<&PartMesh>,
    mut pending: ResMut<PendingPartEvents>,
) {
    if let Ok(part) = parts.get(trigger.event().event_target()) {
        pending.push(PartEvent::PointerEnter(part.id.clone()));
    }
}

fn on_part_out(
    trigger: On<Pointer<Out>>,
    parts: Query<&PartMesh>,
    mut pending: ResMut<PendingPartEvents>,
) {
    if let Ok(part) = parts.get(trigger.event().event_target()) {
        pending.push(PartEvent::PointerLeave(part.id.clone()));
    }
}

fn on_part_click(
    trigger: On<Pointer<Click>>,
    parts: Query<&PartMesh>,
    mut pending: ResMut<PendingPartEvents>,
) {
    if trigger.event().button != PointerButton::Primary {
        return;
    }
    if let Ok(part) = parts.get(trigger.event().event_target()) {
        pending.push(PartEvent::Click(part.id.clone()));
    }
}

/// Handle Escape key to deselect current selection
fn handle_deselection(keyboard: Res<ButtonInput<KeyCode>>, mut pending: ResMut<PendingPartEvents>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        pending.push(PartEvent::Cancel);
    }
}

/// Feed queued events to the session in order and recolor affected meshes
fn apply_part_events(
    mut pending: ResMut<PendingPartEvents>,
    mut session: ResMut<PartSession>,
    part_entities: Res<PartEntities>,
    parts: Query<(&PartMesh, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    while let Some(event) = pending.0.pop_front() {
        let changes = session.handle(event);
        for change in &changes {
            recolor(change, &session, &part_entities, &parts, &mut materials);
        }
    }
}

fn recolor(
    change: &HighlightChange,
    session: &PartSession,
    part_entities: &PartEntities,
    parts: &Query<(&PartMesh, &MeshMaterial3d<StandardMaterial>)>,
    materials: &mut Assets<StandardMaterial>,
) {
    let Some(entities) = part_entities.0.get(&change.mesh) else {
        tracing::warn!("No render entities for mesh {}", change.mesh);
        return;
    };
    let base = session.catalog().and_then(|c| c.base_color(&change.mesh));
    let restoring = base == Some(change.color);

    for &entity in entities {
        let Ok((part, material)) = parts.get(entity) else {
            continue;
        };
        if let Some(material) = materials.get_mut(&material.0) {
            // Restore the captured value exactly rather than round-tripping it
            material.emissive = if restoring {
                part.original_emissive
            } else {
                emissive_from(change.color)
            };
        }
    }
}

/// Pointer cursor while a part is under the mouse
pub fn cursor_for(state: &InteractionState) -> SystemCursorIcon {
    if state.hovered.is_some() {
        SystemCursorIcon::Pointer
    } else {
        SystemCursorIcon::Default
    }
}

fn update_cursor(
    mut commands: Commands,
    session: Res<PartSession>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut current: Local<Option<SystemCursorIcon>>,
) {
    let wanted = cursor_for(session.interaction_state());
    if *current == Some(wanted) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    commands.entity(window).insert(CursorIcon::from(wanted));
    *current = Some(wanted);
}

/// Spin the assembly about its local axis while nothing is hovered or selected
fn rotate_assembly(
    mut session: ResMut<PartSession>,
    mut assembly: Query<&mut Transform, With<AssemblyRoot>>,
) {
    let delta = session.tick();
    if delta == 0.0 {
        return;
    }
    let axis = session.rotation().axis;
    for mut transform in assembly.iter_mut() {
        match axis {
            RotationAxis::X => transform.rotate_local_x(delta),
            RotationAxis::Y => transform.rotate_local_y(delta),
            RotationAxis::Z => transform.rotate_local_z(delta),
        }
    }
}
