//! Motorview Scene - Bevy rendering host for the engine viewer
//!
//! This crate turns a glTF engine model into an interactive scene:
//! the model is loaded under a rotating assembly root, its meshes are
//! registered with the part catalog, and pointer events on them drive the
//! highlight, label and inspect overlays.
//!
//! The host app is expected to insert [`PartSession`] and [`ModelSource`]
//! and to add the picking and egui plugins before [`MotorviewScenePlugin`].

pub mod camera;
pub mod inspect;
pub mod interaction;
pub mod models;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;

/// Plugin that sets up the engine scene, part interaction and overlays
pub struct MotorviewScenePlugin;

impl Plugin for MotorviewScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(interaction::InteractionPlugin)
            .add_plugins(inspect::InspectPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use camera::CameraSettings;
pub use types::*;
