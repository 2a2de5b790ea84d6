//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use motorview_core::ViewerSession;
use motorview_scene::{ModelSource, MotorviewScenePlugin, PartSession};

use crate::config::Config;

/// Open the viewer window and run until it is closed
pub fn run(config: &Config, session: ViewerSession) -> AppExit {
    let (asset_root, model_path) = config.asset_paths();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: config.window.title.clone(),
                        resolution: (config.window.width, config.window.height).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: asset_root,
                    ..default()
                }),
        )
        // Picking must be added before EguiPlugin so egui can detect it
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .insert_resource(PartSession(session))
        .insert_resource(ModelSource { path: model_path })
        .add_plugins(MotorviewScenePlugin)
        .run()
}
