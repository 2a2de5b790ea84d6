//! Shared resources and components for the engine scene

use bevy::color::{LinearRgba, Srgba};
use bevy::prelude::*;
use motorview_core::{Color as PartColor, MeshId, PartEvent, ViewerSession};
use std::collections::{HashMap, VecDeque};

/// The viewer session owning the catalog and the interaction state
#[derive(Resource, Deref, DerefMut)]
pub struct PartSession(pub ViewerSession);

/// Asset path of the glTF model to display, relative to the asset root
#[derive(Debug, Clone, Resource)]
pub struct ModelSource {
    pub path: String,
}

/// Loading progress of the model
#[derive(Debug, Clone, Default, PartialEq, Resource)]
pub enum ModelStatus {
    #[default]
    Loading,
    Ready {
        meshes: usize,
        groups: usize,
    },
    Failed(String),
}

/// Part events in delivery order, drained once per frame
#[derive(Debug, Default, Resource)]
pub struct PendingPartEvents(pub VecDeque<PartEvent>);

impl PendingPartEvents {
    pub fn push(&mut self, event: PartEvent) {
        self.0.push_back(event);
    }
}

/// Render entities sharing each mesh id (one per glTF primitive)
#[derive(Debug, Default, Resource)]
pub struct PartEntities(pub HashMap<MeshId, Vec<Entity>>);

/// Overlay visibility toggles
#[derive(Debug, Clone, Resource)]
pub struct UiState {
    pub show_instructions: bool,
    pub show_inspect: bool,
    pub show_labels: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_instructions: true,
            show_inspect: true,
            show_labels: true,
        }
    }
}

/// Root entity the model is spawned under; auto-rotation spins this
#[derive(Component)]
pub struct AssemblyRoot;

/// A pickable primitive of a cataloged mesh
#[derive(Debug, Clone, Component)]
pub struct PartMesh {
    pub id: MeshId,
    /// Emissive of the cloned material before any highlight
    pub original_emissive: LinearRgba,
}

/// Convert a catalog color to an emissive value
pub fn emissive_from(color: PartColor) -> LinearRgba {
    Srgba::rgb(color.r, color.g, color.b).into()
}

/// Convert an emissive value back to a catalog color, clamped to `[0, 1]`
pub fn part_color_from(emissive: LinearRgba) -> PartColor {
    let srgb = Srgba::from(emissive);
    PartColor::rgb(
        srgb.red.clamp(0.0, 1.0),
        srgb.green.clamp(0.0, 1.0),
        srgb.blue.clamp(0.0, 1.0),
    )
}

/// Catalog color as an egui color for overlays
pub fn egui_color(color: PartColor) -> bevy_egui::egui::Color32 {
    let [r, g, b] = color.to_srgb8();
    bevy_egui::egui::Color32::from_rgb(r, g, b)
}
