//! Scene setup - lights and ground

use bevy::prelude::*;

/// Key light position, casting shadows onto the ground
pub const KEY_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 15.0, 10.0);

/// Fill light position, below and behind the model
pub const FILL_LIGHT_POSITION: Vec3 = Vec3::new(-10.0, -10.0, -10.0);

/// Height of the shadow-receiving ground plane
pub const GROUND_HEIGHT: f32 = -0.8;

/// Side length of the ground plane
pub const GROUND_SIZE: f32 = 10.0;

/// Spot cone half-angle in radians
pub const SPOT_ANGLE: f32 = 0.3;

/// Fraction of the spot cone that fades out
pub const SPOT_PENUMBRA: f32 = 0.5;

/// Marker component for the ground plane
#[derive(Component)]
pub struct Ground;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.1)))
            .add_systems(Startup, setup_scene);
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Sky/ground ambient
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.9, 0.92),
        brightness: 300.0,
        ..default()
    });

    // Key spot light
    commands.spawn((
        SpotLight {
            intensity: 4_000_000.0,
            range: 60.0,
            shadows_enabled: true,
            outer_angle: SPOT_ANGLE,
            inner_angle: SPOT_ANGLE * (1.0 - SPOT_PENUMBRA),
            ..default()
        },
        Transform::from_translation(KEY_LIGHT_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Fill point light
    commands.spawn((
        PointLight {
            intensity: 1_000_000.0,
            range: 60.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(FILL_LIGHT_POSITION),
    ));

    // Hemisphere: white from above, grey bounce from below
    commands.spawn((
        DirectionalLight {
            color: Color::WHITE,
            illuminance: 1500.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-4.0, 8.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(0.5, 0.5, 0.5),
            illuminance: 600.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(2.0, -8.0, -3.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Ground plane; not a part, so picking ignores it
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.18, 0.18, 0.2),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_xyz(0.0, GROUND_HEIGHT, 0.0),
        bevy_picking::Pickable::IGNORE,
        Ground,
    ));
}
