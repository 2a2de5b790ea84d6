//! Picture-in-picture view framing the part under inspection
//!
//! A second camera renders into a square viewport in the bottom-left corner,
//! aimed at the hovered group (the selected one when nothing is hovered) from
//! the same side as the main camera.

use bevy::camera::Viewport;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use motorview_core::{Aabb, InteractionState, PartRef};

use crate::camera::{fit_distance, MainCamera, FOV_DEGREES, FRAME_MARGIN};
use crate::types::*;

/// Share of the window height used by the inspect view
pub const INSPECT_FRACTION: f32 = 0.3;

/// Gap to the window edges in physical pixels
pub const INSPECT_INSET: u32 = 12;

/// Marker component for the inspect camera
#[derive(Component)]
pub struct InspectCamera;

pub struct InspectPlugin;

impl Plugin for InspectPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (spawn_inspect_camera, update_inspect_camera).chain());
    }
}

/// Part the inspect view shows: hover first, then selection
pub fn inspected_part(state: &InteractionState) -> Option<&PartRef> {
    state.hovered.as_ref().or(state.selected.as_ref())
}

/// Center and radius of the sphere around a set of boxes
pub fn bounding_sphere(bounds: &[Aabb]) -> Option<(Vec3, f32)> {
    let total = bounds.iter().copied().reduce(|acc, b| acc.union(&b))?;
    Some((total.center(), (total.diagonal() * 0.5).max(0.01)))
}

/// Position and size of the inspect viewport, `None` if the window is too small
pub fn inspect_viewport(window: UVec2) -> Option<(UVec2, UVec2)> {
    let side = ((window.y as f32 * INSPECT_FRACTION) as u32)
        .min(window.x.saturating_sub(2 * INSPECT_INSET));
    if side == 0 || window.y < side + INSPECT_INSET {
        return None;
    }
    Some((
        UVec2::new(INSPECT_INSET, window.y - side - INSPECT_INSET),
        UVec2::splat(side),
    ))
}

/// Spawned once the model is ready so the main camera keeps the egui context
fn spawn_inspect_camera(
    mut commands: Commands,
    status: Res<ModelStatus>,
    existing: Query<(), With<InspectCamera>>,
) {
    if !matches!(*status, ModelStatus::Ready { .. }) || !existing.is_empty() {
        return;
    }
    commands.spawn((
        Camera3d::default(),
        Camera {
            order: 1,
            is_active: false,
            clear_color: ClearColorConfig::Custom(Color::srgb(0.14, 0.14, 0.17)),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            ..default()
        }),
        Transform::default(),
        InspectCamera,
    ));
}

fn update_inspect_camera(
    ui_state: Res<UiState>,
    session: Res<PartSession>,
    windows: Query<&Window, With<PrimaryWindow>>,
    main_camera: Query<&Transform, (With<MainCamera>, Without<InspectCamera>)>,
    assembly: Query<&GlobalTransform, With<AssemblyRoot>>,
    mut inspect: Query<(&mut Camera, &mut Transform), (With<InspectCamera>, Without<MainCamera>)>,
) {
    let Ok((mut camera, mut transform)) = inspect.single_mut() else {
        return;
    };

    let sphere = inspected_part(session.interaction_state()).and_then(|part| {
        let catalog = session.catalog()?;
        let group = catalog.group(&part.group_key)?;
        bounding_sphere(&catalog.member_bounds(group))
    });
    let viewport = windows
        .single()
        .ok()
        .and_then(|window| inspect_viewport(window.physical_size()));

    let (true, Some((center, radius)), Some((position, size)), Ok(root), Ok(eye)) = (
        ui_state.show_inspect,
        sphere,
        viewport,
        assembly.single(),
        main_camera.single(),
    ) else {
        if camera.is_active {
            camera.is_active = false;
        }
        return;
    };

    camera.is_active = true;
    camera.viewport = Some(Viewport {
        physical_position: position,
        physical_size: size,
        ..default()
    });

    let center = root.transform_point(center);
    let direction = (eye.translation - center).normalize_or(Vec3::Z);
    let distance = fit_distance(radius, FOV_DEGREES.to_radians(), FRAME_MARGIN);
    transform.translation = center + direction * distance;
    transform.look_at(center, Vec3::Y);
}
