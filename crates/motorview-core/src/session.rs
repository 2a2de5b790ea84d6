//! Viewer session: one classification table, at most one loaded asset

use tracing::{debug, info, warn};

use crate::anchor::LabelAnchor;
use crate::catalog::{Catalog, CatalogError};
use crate::classification::ClassificationTable;
use crate::config::{ConfigError, SessionConfig};
use crate::interaction::{HighlightChange, Highlighter, InteractionState, PartEvent};
use crate::mesh::{Color, MeshDescriptor, MeshId};
use crate::rotation::AutoRotation;

/// Label text and placement for one group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLabel {
    pub key: String,
    pub name: String,
    pub anchor: LabelAnchor,
}

/// Owns the catalog of the loaded asset and the interaction state driven by
/// host events. Events are processed strictly in delivery order.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    table: ClassificationTable,
    config: SessionConfig,
    highlighter: Highlighter,
    catalog: Option<Catalog>,
    state: InteractionState,
    rotation: AutoRotation,
}

impl ViewerSession {
    pub fn new(table: ClassificationTable, config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            table,
            highlighter: config.highlighter(),
            rotation: config.auto_rotation(),
            config,
            catalog: None,
            state: InteractionState::default(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn table(&self) -> &ClassificationTable {
        &self.table
    }

    /// Build the catalog for a freshly loaded asset, replacing any previous one
    pub fn load_asset(&mut self, meshes: Vec<MeshDescriptor>) -> Result<&Catalog, CatalogError> {
        self.unload();
        let count = meshes.len();
        let catalog = Catalog::build(&self.table, meshes, self.config.unclassified)?;
        info!(meshes = count, groups = catalog.group_count(), "Asset catalog ready");
        Ok(&*self.catalog.insert(catalog))
    }

    /// Drop the catalog and clear hover and selection
    pub fn unload(&mut self) {
        if self.catalog.take().is_some() {
            debug!("Asset unloaded");
        }
        self.state = InteractionState::default();
        self.rotation.reset();
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn interaction_state(&self) -> &InteractionState {
        &self.state
    }

    /// Apply one host event and return the color changes it causes.
    /// Lookup failures are logged and the event is dropped.
    pub fn handle(&mut self, event: PartEvent) -> Vec<HighlightChange> {
        let Some(catalog) = self.catalog.as_ref() else {
            debug!(?event, "No asset loaded, ignoring event");
            return Vec::new();
        };

        let next = match self.state.apply(catalog, &event) {
            Ok(next) => next,
            Err(e) => {
                warn!(?event, "Ignoring event: {}", e);
                return Vec::new();
            }
        };

        if let (PartEvent::Click(_), Some(part)) = (&event, &next.selected) {
            info!(part = %part.group_name, mesh = %part.mesh, "Clicked part");
        }

        let changes = self.highlighter.changes(catalog, &self.state, &next);
        self.state = next;
        changes
    }

    /// Color the host should currently show on `mesh`
    pub fn current_highlight(&self, mesh: &MeshId) -> Option<Color> {
        let catalog = self.catalog.as_ref()?;
        self.highlighter.color_of(catalog, &self.state, mesh)
    }

    /// Label anchor for a classified, non-empty group
    pub fn label_anchor_for(&self, group_key: &str) -> Option<LabelAnchor> {
        let catalog = self.catalog.as_ref()?;
        let group = catalog.group(group_key).filter(|g| g.classified)?;
        let angle = self.config.labels.angle.angle_for(&group.key);
        LabelAnchor::compute(
            &catalog.member_bounds(group),
            angle,
            self.config.labels.scale_factor,
        )
    }

    /// Labels for every classified, non-empty group in catalog order
    pub fn label_anchors(&self) -> Vec<GroupLabel> {
        let Some(catalog) = self.catalog.as_ref() else {
            return Vec::new();
        };
        catalog
            .groups()
            .filter_map(|g| {
                self.label_anchor_for(&g.key).map(|anchor| GroupLabel {
                    key: g.key.clone(),
                    name: g.name.clone(),
                    anchor,
                })
            })
            .collect()
    }

    /// Advance idle rotation by one frame; returns the angle to apply
    pub fn tick(&mut self) -> f32 {
        if self.catalog.is_none() {
            return 0.0;
        }
        self.rotation.tick(&self.state)
    }

    pub fn rotation(&self) -> &AutoRotation {
        &self.rotation
    }
}
