//! Classification tables mapping mesh identifiers to part groups
//!
//! A table is authored by hand against a specific asset and stored as TOML:
//!
//! ```toml
//! [[group]]
//! key = "gear"
//! name = "Gear"
//! meshes = ["mesh_0", "mesh_1"]
//! ```
//!
//! The table only describes the intended grouping. Checking it against the
//! meshes actually present in a loaded asset is done by [`crate::Catalog::build`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::mesh::MeshId;

/// Group key reserved for meshes the table does not mention
pub const UNCLASSIFIED_KEY: &str = "unclassified";

const ENGINE_TABLE: &str = include_str!("../tables/engine.toml");

#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse classification table: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize classification table: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Group key must not be empty")]
    EmptyKey,
    #[error("Group key '{0}' is defined more than once")]
    DuplicateKey(String),
    #[error("Group key '{0}' is reserved")]
    ReservedKey(String),
}

/// One named group as authored in the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Stable lookup key (e.g. "piston1")
    pub key: String,
    /// Human-readable name; falls back to the key when omitted
    #[serde(default)]
    pub name: Option<String>,
    /// Member meshes in authoring order
    #[serde(default)]
    pub meshes: Vec<MeshId>,
}

impl GroupSpec {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

/// Ordered set of group definitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTable {
    #[serde(default, rename = "group")]
    groups: Vec<GroupSpec>,
}

impl ClassificationTable {
    /// Build a table from group specs, checking keys
    pub fn new(groups: Vec<GroupSpec>) -> Result<Self, ClassificationError> {
        let table = Self { groups };
        table.validate()?;
        Ok(table)
    }

    /// Parse a table from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ClassificationError> {
        let table: ClassificationTable = toml::from_str(content)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ClassificationError> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), groups = table.groups.len(), "Loaded classification table");
        Ok(table)
    }

    /// Table for the bundled `machine.glb` engine asset
    pub fn builtin_engine() -> Result<Self, ClassificationError> {
        Self::from_toml_str(ENGINE_TABLE)
    }

    pub fn to_toml_string(&self) -> Result<String, ClassificationError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn groups(&self) -> &[GroupSpec] {
        &self.groups
    }

    pub fn group(&self, key: &str) -> Option<&GroupSpec> {
        self.groups.iter().find(|g| g.key == key)
    }

    /// Total number of mesh references, duplicates included
    pub fn mesh_reference_count(&self) -> usize {
        self.groups.iter().map(|g| g.meshes.len()).sum()
    }

    fn validate(&self) -> Result<(), ClassificationError> {
        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.key.trim().is_empty() {
                return Err(ClassificationError::EmptyKey);
            }
            if group.key == UNCLASSIFIED_KEY {
                return Err(ClassificationError::ReservedKey(group.key.clone()));
            }
            if !seen.insert(group.key.as_str()) {
                return Err(ClassificationError::DuplicateKey(group.key.clone()));
            }
        }
        Ok(())
    }
}
