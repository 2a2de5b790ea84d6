//! Hover/selection state and the per-mesh highlight colors derived from it
//!
//! [`InteractionState::apply`] is a pure transition: it takes the current
//! state, the catalog and one pointer event and returns the next state.
//! Colors are never stored on meshes; they are recomputed from the state and
//! the base colors captured in the [`Catalog`], so repeated hover/unhover
//! cannot drift.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::catalog::{Catalog, LookupError};
use crate::mesh::{Color, MeshId};

/// Event delivered by the rendering host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartEvent {
    PointerEnter(MeshId),
    PointerLeave(MeshId),
    Click(MeshId),
    /// Explicit deselect (Escape)
    Cancel,
}

/// A hovered or selected mesh and the group it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartRef {
    pub mesh: MeshId,
    pub group_key: String,
    pub group_name: String,
}

/// Coarse state of the interaction machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Hovering,
    Selected,
    SelectedAndHovering,
}

/// Transient hover and selection, independent of each other
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionState {
    pub hovered: Option<PartRef>,
    pub selected: Option<PartRef>,
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        self.hovered.is_none() && self.selected.is_none()
    }

    pub fn phase(&self) -> InteractionPhase {
        match (&self.hovered, &self.selected) {
            (None, None) => InteractionPhase::Idle,
            (Some(_), None) => InteractionPhase::Hovering,
            (None, Some(_)) => InteractionPhase::Selected,
            (Some(_), Some(_)) => InteractionPhase::SelectedAndHovering,
        }
    }

    /// Compute the state following `event`
    pub fn apply(&self, catalog: &Catalog, event: &PartEvent) -> Result<InteractionState, LookupError> {
        let mut next = self.clone();
        match event {
            PartEvent::PointerEnter(mesh) => {
                next.hovered = Some(resolve(catalog, mesh)?);
            }
            PartEvent::PointerLeave(mesh) => {
                let group = catalog.group_of(mesh)?;
                // A late leave for a group that is no longer hovered is stale
                if next.hovered.as_ref().is_some_and(|h| h.group_key == group.key) {
                    next.hovered = None;
                }
            }
            PartEvent::Click(mesh) => {
                next.selected = Some(resolve(catalog, mesh)?);
            }
            PartEvent::Cancel => {
                next.selected = None;
            }
        }
        Ok(next)
    }
}

fn resolve(catalog: &Catalog, mesh: &MeshId) -> Result<PartRef, LookupError> {
    let group = catalog.group_of(mesh)?;
    Ok(PartRef {
        mesh: mesh.clone(),
        group_key: group.key.clone(),
        group_name: group.name.clone(),
    })
}

/// Which meshes a hover or selection colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightScope {
    /// Only the mesh under the pointer
    #[default]
    Mesh,
    /// Every member of the group owning that mesh
    Group,
}

/// Highlight colors for hover and selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightPalette {
    pub hover: Color,
    pub selected: Color,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            hover: Color::from_hex(0xffffff),
            selected: Color::from_hex(0x5d3fd3),
        }
    }
}

/// New color for one mesh, emitted after a transition
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightChange {
    pub mesh: MeshId,
    pub color: Color,
}

/// Rules for turning an [`InteractionState`] into mesh colors
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Highlighter {
    pub scope: HighlightScope,
    pub palette: HighlightPalette,
}

impl Highlighter {
    pub fn new(scope: HighlightScope, palette: HighlightPalette) -> Self {
        Self { scope, palette }
    }

    /// Current color of `mesh`, `None` if the catalog does not know it
    pub fn color_of(&self, catalog: &Catalog, state: &InteractionState, mesh: &MeshId) -> Option<Color> {
        let base = catalog.base_color(mesh)?;
        if self.covers(catalog, state.hovered.as_ref(), mesh) {
            Some(self.palette.hover)
        } else if self.covers(catalog, state.selected.as_ref(), mesh) {
            Some(self.palette.selected)
        } else {
            Some(base)
        }
    }

    /// Meshes whose color differs between `before` and `after`, with their new color
    pub fn changes(
        &self,
        catalog: &Catalog,
        before: &InteractionState,
        after: &InteractionState,
    ) -> Vec<HighlightChange> {
        let mut seen = HashSet::new();
        let mut changes = Vec::new();
        let parts = [&before.hovered, &before.selected, &after.hovered, &after.selected];
        for part in parts.into_iter().flatten() {
            for mesh in self.affected(catalog, part) {
                if !seen.insert(mesh) {
                    continue;
                }
                let old = self.color_of(catalog, before, mesh);
                let new = self.color_of(catalog, after, mesh);
                if let Some(color) = new.filter(|c| Some(*c) != old) {
                    changes.push(HighlightChange {
                        mesh: mesh.clone(),
                        color,
                    });
                }
            }
        }
        changes
    }

    fn covers(&self, catalog: &Catalog, part: Option<&PartRef>, mesh: &MeshId) -> bool {
        let Some(part) = part else { return false };
        if &part.mesh == mesh {
            return true;
        }
        self.scope == HighlightScope::Group
            && catalog
                .group_of(mesh)
                .is_ok_and(|g| g.classified && g.key == part.group_key)
    }

    /// Meshes recolored by `part` under this scope, borrowed from the catalog
    fn affected<'c>(&self, catalog: &'c Catalog, part: &PartRef) -> Vec<&'c MeshId> {
        let Ok(group) = catalog.group_of(&part.mesh) else {
            return Vec::new();
        };
        if self.scope == HighlightScope::Group && group.classified {
            group.members.iter().collect()
        } else {
            group.members.iter().filter(|m| **m == part.mesh).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnclassifiedPolicy;
    use crate::classification::{ClassificationTable, GroupSpec};
    use crate::mesh::{Aabb, MeshDescriptor};
    use glam::Vec3;

    fn id(s: &str) -> MeshId {
        MeshId::from(s)
    }

    fn catalog() -> Catalog {
        let table = ClassificationTable::new(vec![
            GroupSpec {
                key: "gear".into(),
                name: Some("Gear".into()),
                meshes: vec![id("m1"), id("m2")],
            },
            GroupSpec {
                key: "shaft".into(),
                name: Some("Shaft".into()),
                meshes: vec![id("m3")],
            },
        ])
        .unwrap();
        let bounds = Aabb::new(Vec3::ZERO, Vec3::ONE);
        Catalog::build(
            &table,
            vec![
                MeshDescriptor::new("m1", bounds, Color::from_hex(0x101010)),
                MeshDescriptor::new("m2", bounds, Color::from_hex(0x202020)),
                MeshDescriptor::new("m3", bounds, Color::from_hex(0x303030)),
                MeshDescriptor::new("stray", bounds, Color::BLACK),
            ],
            UnclassifiedPolicy::Bucket,
        )
        .unwrap()
    }

    fn step(state: &InteractionState, catalog: &Catalog, event: PartEvent) -> InteractionState {
        state.apply(catalog, &event).unwrap()
    }

    #[test]
    fn test_phases() {
        let catalog = catalog();
        let s0 = InteractionState::default();
        assert_eq!(s0.phase(), InteractionPhase::Idle);

        let s1 = step(&s0, &catalog, PartEvent::PointerEnter(id("m1")));
        assert_eq!(s1.phase(), InteractionPhase::Hovering);
        assert_eq!(s1.hovered.as_ref().unwrap().group_name, "Gear");

        let s2 = step(&s1, &catalog, PartEvent::Click(id("m1")));
        assert_eq!(s2.phase(), InteractionPhase::SelectedAndHovering);

        let s3 = step(&s2, &catalog, PartEvent::PointerLeave(id("m1")));
        assert_eq!(s3.phase(), InteractionPhase::Selected);

        let s4 = step(&s3, &catalog, PartEvent::Cancel);
        assert_eq!(s4.phase(), InteractionPhase::Idle);
        assert!(s4.is_idle());
    }

    #[test]
    fn test_last_click_wins() {
        let catalog = catalog();
        let s = step(&InteractionState::default(), &catalog, PartEvent::Click(id("m1")));
        let s = step(&s, &catalog, PartEvent::Click(id("m3")));
        assert_eq!(s.selected.as_ref().unwrap().group_name, "Shaft");

        // Re-clicking the same part keeps it selected
        let s = step(&s, &catalog, PartEvent::Click(id("m3")));
        assert_eq!(s.selected.as_ref().unwrap().mesh, id("m3"));
    }

    #[test]
    fn test_stale_leave_ignored() {
        let catalog = catalog();
        let s = step(&InteractionState::default(), &catalog, PartEvent::PointerEnter(id("m3")));
        // Leave for a gear mesh arrives after the pointer is already over the shaft
        let s = step(&s, &catalog, PartEvent::PointerLeave(id("m1")));
        assert_eq!(s.hovered.as_ref().unwrap().group_key, "shaft");
    }

    #[test]
    fn test_cancel_keeps_hover() {
        let catalog = catalog();
        let s = step(&InteractionState::default(), &catalog, PartEvent::Click(id("m1")));
        let s = step(&s, &catalog, PartEvent::PointerEnter(id("m2")));
        let s = step(&s, &catalog, PartEvent::Cancel);
        assert!(s.selected.is_none());
        assert_eq!(s.hovered.as_ref().unwrap().mesh, id("m2"));
    }

    #[test]
    fn test_unknown_mesh() {
        let catalog = catalog();
        let s = InteractionState::default();
        for event in [
            PartEvent::PointerEnter(id("ghost")),
            PartEvent::PointerLeave(id("ghost")),
            PartEvent::Click(id("ghost")),
        ] {
            assert_eq!(s.apply(&catalog, &event), Err(LookupError::UnknownMesh(id("ghost"))));
        }
        assert!(s.apply(&catalog, &PartEvent::Cancel).is_ok());
    }

    #[test]
    fn test_mesh_scope_colors() {
        let catalog = catalog();
        let hl = Highlighter::default();
        let s0 = InteractionState::default();
        let s1 = step(&s0, &catalog, PartEvent::PointerEnter(id("m1")));

        assert_eq!(hl.color_of(&catalog, &s1, &id("m1")), Some(hl.palette.hover));
        // Same group, not under the pointer
        assert_eq!(hl.color_of(&catalog, &s1, &id("m2")), Some(Color::from_hex(0x202020)));

        let changes = hl.changes(&catalog, &s0, &s1);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].mesh, id("m1"));
        assert_eq!(changes[0].color, hl.palette.hover);
    }

    #[test]
    fn test_hover_unhover_restores_original() {
        let catalog = catalog();
        let hl = Highlighter::default();
        let mut state = InteractionState::default();
        let original = catalog.base_color(&id("m1")).unwrap();

        for _ in 0..10 {
            state = step(&state, &catalog, PartEvent::PointerEnter(id("m1")));
            state = step(&state, &catalog, PartEvent::PointerLeave(id("m1")));
        }
        assert_eq!(hl.color_of(&catalog, &state, &id("m1")), Some(original));

        let entered = step(&InteractionState::default(), &catalog, PartEvent::PointerEnter(id("m1")));
        let left = step(&entered, &catalog, PartEvent::PointerLeave(id("m1")));
        let changes = hl.changes(&catalog, &entered, &left);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].color, original);
    }

    #[test]
    fn test_hover_and_selection_distinguishable() {
        let catalog = catalog();
        let hl = Highlighter::default();
        assert_ne!(hl.palette.hover, hl.palette.selected);

        let s = step(&InteractionState::default(), &catalog, PartEvent::Click(id("m1")));
        assert_eq!(hl.color_of(&catalog, &s, &id("m1")), Some(hl.palette.selected));

        let hovered = step(&s, &catalog, PartEvent::PointerEnter(id("m1")));
        assert_eq!(hl.color_of(&catalog, &hovered, &id("m1")), Some(hl.palette.hover));

        let left = step(&hovered, &catalog, PartEvent::PointerLeave(id("m1")));
        assert_eq!(hl.color_of(&catalog, &left, &id("m1")), Some(hl.palette.selected));
    }

    #[test]
    fn test_previous_selection_cleared() {
        let catalog = catalog();
        let hl = Highlighter::default();
        let a = step(&InteractionState::default(), &catalog, PartEvent::Click(id("m1")));
        let b = step(&a, &catalog, PartEvent::Click(id("m3")));

        assert_ne!(hl.color_of(&catalog, &b, &id("m1")), Some(hl.palette.selected));
        let changes = hl.changes(&catalog, &a, &b);
        let meshes: Vec<&MeshId> = changes.iter().map(|c| &c.mesh).collect();
        assert_eq!(meshes, vec![&id("m1"), &id("m3")]);
        assert_eq!(changes[0].color, Color::from_hex(0x101010));
    }

    #[test]
    fn test_group_scope() {
        let catalog = catalog();
        let hl = Highlighter::new(HighlightScope::Group, HighlightPalette::default());
        let s0 = InteractionState::default();
        let s1 = step(&s0, &catalog, PartEvent::PointerEnter(id("m2")));

        assert_eq!(hl.color_of(&catalog, &s1, &id("m1")), Some(hl.palette.hover));
        assert_eq!(hl.color_of(&catalog, &s1, &id("m2")), Some(hl.palette.hover));
        assert_eq!(hl.color_of(&catalog, &s1, &id("m3")), Some(Color::from_hex(0x303030)));
        assert_eq!(hl.changes(&catalog, &s0, &s1).len(), 2);
    }

    #[test]
    fn test_group_scope_skips_unclassified() {
        let catalog = catalog();
        let hl = Highlighter::new(HighlightScope::Group, HighlightPalette::default());
        let s = step(&InteractionState::default(), &catalog, PartEvent::PointerEnter(id("stray")));
        assert_eq!(s.hovered.as_ref().unwrap().group_name, "Unclassified");
        assert_eq!(hl.color_of(&catalog, &s, &id("stray")), Some(hl.palette.hover));
        assert_eq!(hl.changes(&catalog, &InteractionState::default(), &s).len(), 1);
    }
}
