//! Motorview Core - Part catalog and interaction model for the engine viewer
//!
//! This crate holds everything about the viewer that does not need a renderer:
//! - Classification tables mapping glTF mesh names to named part groups
//! - The catalog partitioning a loaded asset's meshes into those groups
//! - Hover/selection state, its transitions and the highlight colors it implies
//! - Label anchor placement and idle auto-rotation

pub mod anchor;
pub mod catalog;
pub mod classification;
pub mod config;
pub mod interaction;
pub mod mesh;
pub mod rotation;
pub mod session;

pub use anchor::{AnglePolicy, LabelAnchor};
pub use catalog::{Catalog, CatalogError, LookupError, PartGroup, UnclassifiedPolicy};
pub use classification::{ClassificationError, ClassificationTable, GroupSpec, UNCLASSIFIED_KEY};
pub use config::{ConfigError, SessionConfig};
pub use interaction::{
    HighlightChange, HighlightPalette, HighlightScope, Highlighter, InteractionPhase,
    InteractionState, PartEvent, PartRef,
};
pub use mesh::{Aabb, Color, MeshDescriptor, MeshId};
pub use rotation::{AutoRotation, RotationAxis};
pub use session::{GroupLabel, ViewerSession};
