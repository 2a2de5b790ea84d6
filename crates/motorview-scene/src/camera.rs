//! Camera controls and orbit navigation (Y up)

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll};
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::types::{AssemblyRoot, ModelStatus, PartSession};

/// Initial eye position looking at the origin
pub const INITIAL_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 2.0, 10.0);

/// Vertical field of view in degrees
pub const FOV_DEGREES: f32 = 45.0;

/// Space left around the model when it is framed, relative to its radius
pub const FRAME_MARGIN: f32 = 1.2;

/// Orbit controller state.
///
/// `polar` is measured from +Y and clamped to `[min_polar, max_polar]`,
/// `azimuth` is measured around +Y starting from +Z.
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub polar: f32,
    pub target: Vec3,
    pub target_focus: Vec3,
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::looking_from(INITIAL_CAMERA_POSITION, Vec3::ZERO)
    }
}

impl CameraSettings {
    /// Settings that place the eye at `eye` looking at `target`
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let min_polar = FRAC_PI_4;
        let max_polar = PI / 1.5;
        let (distance, azimuth, polar) = spherical_from_offset(eye - target);
        Self {
            distance,
            target_distance: distance,
            azimuth,
            polar: polar.clamp(min_polar, max_polar),
            target,
            target_focus: target,
            min_polar,
            max_polar,
            min_distance: 2.0,
            max_distance: 50.0,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
        }
    }

    /// Apply a drag delta in pixels
    pub fn orbit(&mut self, delta: Vec2) {
        self.azimuth -= delta.x * self.sensitivity;
        self.polar = (self.polar - delta.y * self.sensitivity).clamp(self.min_polar, self.max_polar);
    }

    /// Apply scroll lines; positive zooms in
    pub fn zoom(&mut self, scroll: f32) {
        let zoom_factor = 1.0 - scroll * self.zoom_speed;
        self.target_distance =
            (self.target_distance * zoom_factor).clamp(self.min_distance, self.max_distance);
    }

    /// Aim at a bounding sphere and back off until it fits the view.
    /// Returns the new viewing distance.
    pub fn frame(&mut self, center: Vec3, radius: f32) -> f32 {
        let distance = fit_distance(radius, FOV_DEGREES.to_radians(), FRAME_MARGIN);
        self.target_focus = center;
        self.min_distance = self.min_distance.min(radius);
        self.max_distance = self.max_distance.max(distance * 4.0);
        self.target_distance = distance.clamp(self.min_distance, self.max_distance);
        distance
    }

    /// Current eye position
    pub fn eye(&self) -> Vec3 {
        self.target + orbit_offset(self.distance, self.azimuth, self.polar)
    }
}

/// Offset from the orbit target for the given spherical coordinates
pub fn orbit_offset(distance: f32, azimuth: f32, polar: f32) -> Vec3 {
    Vec3::new(
        distance * polar.sin() * azimuth.sin(),
        distance * polar.cos(),
        distance * polar.sin() * azimuth.cos(),
    )
}

/// Distance at which a sphere of `radius` fills a vertical `fov` with `margin`
pub fn fit_distance(radius: f32, fov: f32, margin: f32) -> f32 {
    radius * margin / (fov * 0.5).sin()
}

/// Inverse of [`orbit_offset`]: `(distance, azimuth, polar)`
pub fn spherical_from_offset(offset: Vec3) -> (f32, f32, f32) {
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return (0.0, 0.0, FRAC_PI_2);
    }
    let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
    let azimuth = offset.x.atan2(offset.z);
    (distance, azimuth, polar)
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (frame_assembly, update_camera).chain());
    }
}

fn setup_camera(mut commands: Commands, settings: Res<CameraSettings>) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            ..default()
        }),
        Transform::from_translation(settings.eye()).looking_at(settings.target, Vec3::Y),
        MainCamera,
    ));
}

/// Fit the camera to the model once its catalog is ready, and move the
/// clip planes with it
fn frame_assembly(
    status: Res<ModelStatus>,
    session: Res<PartSession>,
    assembly: Query<&Transform, With<AssemblyRoot>>,
    mut settings: ResMut<CameraSettings>,
    mut projections: Query<&mut Projection, With<MainCamera>>,
) {
    if !status.is_changed() || !matches!(*status, ModelStatus::Ready { .. }) {
        return;
    }
    let Some(extent) = session.catalog().and_then(|catalog| catalog.extent()) else {
        return;
    };
    let Ok(root) = assembly.single() else {
        return;
    };

    let bounds = extent.transformed(&root.compute_affine());
    let radius = (bounds.diagonal() * 0.5).max(0.01);
    let distance = settings.frame(bounds.center(), radius);

    for mut projection in projections.iter_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.near = (distance - radius * FRAME_MARGIN).max(distance * 0.001);
            perspective.far = settings.max_distance + radius * 2.0;
        }
    }
    tracing::info!(radius, distance, "Framed model");
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    // Panels and labels keep the pointer while egui is using it
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    if !egui_wants_pointer {
        let motion = mouse_motion.delta;

        if mouse_button.pressed(MouseButton::Left) {
            settings.orbit(motion);
        }

        // Pan in the view plane
        if mouse_button.pressed(MouseButton::Right) {
            let right = Vec3::new(settings.azimuth.cos(), 0.0, -settings.azimuth.sin());
            let pan_speed = settings.distance * 0.002;
            settings.target_focus -= right * motion.x * pan_speed;
            settings.target_focus += Vec3::Y * motion.y * pan_speed;
        }

        if mouse_scroll.delta.y != 0.0 {
            settings.zoom(mouse_scroll.delta.y);
        }
    }

    // Smooth interpolation for zoom and target
    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.distance += (settings.target_distance - settings.distance) * lerp_factor;
    settings.target = settings.target.lerp(settings.target_focus, lerp_factor);

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = settings.eye();
        transform.look_at(settings.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_eye_matches_position() {
        let settings = CameraSettings::default();
        let eye = settings.eye();
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(eye.y, 2.0, epsilon = 1e-4);
        assert_relative_eq!(eye.z, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_spherical_round_trip() {
        let offset = Vec3::new(3.0, -1.0, 4.0);
        let (distance, azimuth, polar) = spherical_from_offset(offset);
        let back = orbit_offset(distance, azimuth, polar);
        assert_relative_eq!(back.x, offset.x, epsilon = 1e-4);
        assert_relative_eq!(back.y, offset.y, epsilon = 1e-4);
        assert_relative_eq!(back.z, offset.z, epsilon = 1e-4);
    }

    #[test]
    fn test_polar_clamped() {
        let mut settings = CameraSettings::default();
        settings.orbit(Vec2::new(0.0, 10_000.0));
        assert_relative_eq!(settings.polar, FRAC_PI_4);
        settings.orbit(Vec2::new(0.0, -10_000.0));
        assert_relative_eq!(settings.polar, PI / 1.5);
    }

    #[test]
    fn test_zoom_limits() {
        let mut settings = CameraSettings::default();
        for _ in 0..100 {
            settings.zoom(5.0);
        }
        assert_eq!(settings.target_distance, settings.min_distance);
        for _ in 0..100 {
            settings.zoom(-5.0);
        }
        assert_eq!(settings.target_distance, settings.max_distance);
    }

    #[test]
    fn test_fit_distance() {
        // A 45 degree view fits radius r at r / sin(22.5 deg) without margin
        let d = fit_distance(2.0, FOV_DEGREES.to_radians(), 1.0);
        assert_relative_eq!(d, 2.0 / (FOV_DEGREES.to_radians() * 0.5).sin(), epsilon = 1e-5);
        assert_relative_eq!(fit_distance(2.0, FOV_DEGREES.to_radians(), FRAME_MARGIN), d * 1.2, epsilon = 1e-4);
    }

    #[test]
    fn test_frame_large_and_small_models() {
        let mut settings = CameraSettings::default();
        let center = Vec3::new(0.0, 1.0, 0.0);
        let distance = settings.frame(center, 40.0);
        assert_eq!(settings.target_focus, center);
        assert_relative_eq!(settings.target_distance, distance);
        assert!(settings.max_distance >= distance);

        let distance = settings.frame(Vec3::ZERO, 0.05);
        assert_relative_eq!(settings.target_distance, distance);
        assert!(settings.min_distance <= 0.05);
    }

    #[test]
    fn test_degenerate_offset() {
        assert_eq!(spherical_from_offset(Vec3::ZERO), (0.0, 0.0, FRAC_PI_2));
    }
}
