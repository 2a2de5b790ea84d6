//! egui overlays: controls help, part inspector and floating group labels

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use motorview_core::{Aabb, GroupLabel, PartRef};

use crate::camera::MainCamera;
use crate::types::*;

/// Group labels for the loaded catalog, refreshed when the model changes
#[derive(Debug, Default, Resource)]
pub struct GroupLabels(pub Vec<GroupLabel>);

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiState>()
            .init_resource::<GroupLabels>()
            .add_systems(Update, (toggle_overlays, refresh_group_labels))
            // egui systems run in EguiPrimaryContextPass (bevy_egui 0.38+)
            .add_systems(
                EguiPrimaryContextPass,
                (instructions_panel, inspect_panel, floating_labels),
            );
    }
}

fn toggle_overlays(keyboard: Res<ButtonInput<KeyCode>>, mut ui_state: ResMut<UiState>) {
    if keyboard.just_pressed(KeyCode::KeyH) {
        ui_state.show_instructions = !ui_state.show_instructions;
    }
    if keyboard.just_pressed(KeyCode::KeyL) {
        ui_state.show_labels = !ui_state.show_labels;
    }
    if keyboard.just_pressed(KeyCode::KeyI) {
        ui_state.show_inspect = !ui_state.show_inspect;
    }
}

/// Anchors are computed once per load so random angles do not jitter
fn refresh_group_labels(
    status: Res<ModelStatus>,
    session: Res<PartSession>,
    mut labels: ResMut<GroupLabels>,
) {
    if status.is_changed() {
        labels.0 = session.label_anchors();
        tracing::debug!("Placed {} group labels", labels.0.len());
    }
}

fn instructions_panel(
    mut contexts: EguiContexts,
    ui_state: Res<UiState>,
    status: Res<ModelStatus>,
    source: Res<ModelSource>,
) {
    if !ui_state.show_instructions {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Window::new("Controls")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            egui::Grid::new("controls_grid")
                .num_columns(2)
                .spacing([10.0, 4.0])
                .show(ui, |ui| {
                    for (input, action) in [
                        ("Left drag", "Orbit"),
                        ("Right drag", "Pan"),
                        ("Scroll", "Zoom"),
                        ("Hover", "Highlight part"),
                        ("Click", "Select part"),
                        ("Esc", "Clear selection"),
                        ("H / I / L", "Help / inspector / labels"),
                    ] {
                        ui.label(egui::RichText::new(input).strong());
                        ui.label(action);
                        ui.end_row();
                    }
                });

            ui.separator();
            match &*status {
                ModelStatus::Loading => {
                    ui.label(format!("Loading {}...", source.path));
                }
                ModelStatus::Ready { meshes, groups } => {
                    ui.label(format!("{} meshes in {} groups", meshes, groups));
                }
                ModelStatus::Failed(err) => {
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 80), err);
                }
            }
        });
}

fn inspect_panel(mut contexts: EguiContexts, ui_state: Res<UiState>, session: Res<PartSession>) {
    if !ui_state.show_inspect {
        return;
    }
    let Some(catalog) = session.catalog() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let state = session.interaction_state();
    let palette = session.config().highlight.clone();

    egui::SidePanel::right("inspect_panel")
        .default_width(260.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Inspect");
            ui.separator();

            let sections = [
                ("Hovered", state.hovered.as_ref(), palette.hover_color),
                ("Selected", state.selected.as_ref(), palette.selected_color),
            ];
            for (title, part, color) in sections {
                ui.label(egui::RichText::new(title).strong().color(egui_color(color)));
                match part {
                    Some(part) => part_details(ui, title, part, catalog),
                    None => {
                        ui.label(egui::RichText::new("None").color(egui::Color32::GRAY));
                    }
                }
                ui.add_space(8.0);
            }

            ui.separator();
            ui.collapsing("Groups", |ui| {
                for group in catalog.groups() {
                    ui.horizontal(|ui| {
                        ui.label(&group.name);
                        ui.label(
                            egui::RichText::new(format!("{} meshes", group.members.len()))
                                .small()
                                .color(egui::Color32::GRAY),
                        );
                    });
                }
            });
        });
}

fn part_details(ui: &mut egui::Ui, id: &str, part: &PartRef, catalog: &motorview_core::Catalog) {
    egui::Grid::new(id).num_columns(2).spacing([10.0, 4.0]).show(ui, |ui| {
        ui.label("Part:");
        ui.label(&part.group_name);
        ui.end_row();

        ui.label("Mesh:");
        ui.label(part.mesh.as_str());
        ui.end_row();

        if let Some(group) = catalog.group(&part.group_key) {
            ui.label("Members:");
            ui.label(group.members.len().to_string());
            ui.end_row();

            if let Some(size) = extent(&catalog.member_bounds(group)) {
                ui.label("Extent:");
                ui.label(format!("{:.3} x {:.3} x {:.3}", size.x, size.y, size.z));
                ui.end_row();
            }
        }
    });
}

/// Size of the box enclosing all `bounds`
pub fn extent(bounds: &[Aabb]) -> Option<Vec3> {
    let (first, rest) = bounds.split_first()?;
    let total = rest.iter().fold(*first, |acc, b| acc.union(b));
    Some(total.max - total.min)
}

/// Draw each group name at its anchor with a leader line to the group center
fn floating_labels(
    mut contexts: EguiContexts,
    ui_state: Res<UiState>,
    session: Res<PartSession>,
    labels: Res<GroupLabels>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    assembly: Query<&GlobalTransform, With<AssemblyRoot>>,
) {
    if !ui_state.show_labels || !session.config().labels.enabled || labels.0.is_empty() {
        return;
    }
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(root) = assembly.single() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let state = session.interaction_state();
    let highlight = &session.config().highlight;
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("group_labels"),
    ));

    for label in &labels.0 {
        // Anchors live in assembly space and follow its rotation
        let center = root.transform_point(label.anchor.group_center);
        let position = root.transform_point(label.anchor.label_position);
        let (Ok(center), Ok(position)) = (
            camera.world_to_viewport(camera_transform, center),
            camera.world_to_viewport(camera_transform, position),
        ) else {
            continue;
        };

        let is_group = |part: Option<&PartRef>| part.is_some_and(|p| p.group_key == label.key);
        let color = if is_group(state.hovered.as_ref()) {
            egui_color(highlight.hover_color)
        } else if is_group(state.selected.as_ref()) {
            egui_color(highlight.selected_color)
        } else {
            egui::Color32::from_gray(220)
        };

        let center = egui::pos2(center.x, center.y);
        let position = egui::pos2(position.x, position.y);
        painter.line_segment([center, position], egui::Stroke::new(1.0, color));
        painter.circle_filled(center, 2.5, color);
        painter.text(
            position,
            egui::Align2::CENTER_BOTTOM,
            &label.name,
            egui::FontId::proportional(15.0),
            color,
        );
    }
}
