//! Catalog: the partition of a loaded asset's meshes into named part groups

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::classification::{ClassificationTable, UNCLASSIFIED_KEY};
use crate::mesh::{Aabb, Color, MeshDescriptor, MeshId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Mesh '{0}' is not assigned to any group")]
    UnclassifiedMesh(MeshId),
    #[error("Mesh '{mesh}' is assigned to both '{first}' and '{second}'")]
    DuplicateAssignment {
        mesh: MeshId,
        first: String,
        second: String,
    },
    #[error("Group '{group}' references mesh '{mesh}' which is not in the asset")]
    MissingMesh { mesh: MeshId, group: String },
    #[error("Asset reports mesh '{0}' more than once")]
    DuplicateAssetMesh(MeshId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Unknown mesh '{0}'")]
    UnknownMesh(MeshId),
}

/// What to do with asset meshes the classification table does not mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnclassifiedPolicy {
    /// Collect them in an implicit "Unclassified" group
    #[default]
    Bucket,
    /// Fail the build
    Reject,
}

/// A named semantic part of the machine
#[derive(Debug, Clone, PartialEq)]
pub struct PartGroup {
    pub key: String,
    pub name: String,
    /// Members in authoring order
    pub members: Vec<MeshId>,
    /// False only for the implicit unclassified bucket
    pub classified: bool,
}

impl PartGroup {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone)]
struct MeshEntry {
    group: usize,
    bounds: Aabb,
    base_color: Color,
}

/// Immutable mapping from every mesh of one loaded asset to exactly one group
#[derive(Debug, Clone)]
pub struct Catalog {
    groups: Vec<PartGroup>,
    by_key: HashMap<String, usize>,
    meshes: HashMap<MeshId, MeshEntry>,
}

impl Catalog {
    /// Partition `meshes` according to `table`
    pub fn build(
        table: &ClassificationTable,
        meshes: Vec<MeshDescriptor>,
        policy: UnclassifiedPolicy,
    ) -> Result<Self, CatalogError> {
        let mut asset: HashMap<MeshId, MeshDescriptor> = HashMap::with_capacity(meshes.len());
        let mut asset_order = Vec::with_capacity(meshes.len());
        for mesh in meshes {
            if asset.contains_key(&mesh.id) {
                return Err(CatalogError::DuplicateAssetMesh(mesh.id));
            }
            asset_order.push(mesh.id.clone());
            asset.insert(mesh.id.clone(), mesh);
        }

        let mut groups = Vec::with_capacity(table.groups().len() + 1);
        let mut owner: HashMap<MeshId, usize> = HashMap::with_capacity(asset.len());

        for entry in table.groups() {
            let index = groups.len();
            for mesh in &entry.meshes {
                if let Some(&first) = owner.get(mesh) {
                    // The current group is not pushed yet
                    let first_key = groups
                        .get(first)
                        .map(|g: &PartGroup| g.key.clone())
                        .unwrap_or_else(|| entry.key.clone());
                    return Err(CatalogError::DuplicateAssignment {
                        mesh: mesh.clone(),
                        first: first_key,
                        second: entry.key.clone(),
                    });
                }
                if !asset.contains_key(mesh) {
                    return Err(CatalogError::MissingMesh {
                        mesh: mesh.clone(),
                        group: entry.key.clone(),
                    });
                }
                owner.insert(mesh.clone(), index);
            }
            groups.push(PartGroup {
                key: entry.key.clone(),
                name: entry.display_name().to_string(),
                members: entry.meshes.clone(),
                classified: true,
            });
        }

        let unclassified: Vec<MeshId> = asset_order
            .into_iter()
            .filter(|id| !owner.contains_key(id))
            .collect();

        if let Some(first) = unclassified.first() {
            if policy == UnclassifiedPolicy::Reject {
                return Err(CatalogError::UnclassifiedMesh(first.clone()));
            }
            let index = groups.len();
            for mesh in &unclassified {
                warn!(mesh = %mesh, "Mesh not in classification table, placing in unclassified group");
                owner.insert(mesh.clone(), index);
            }
            groups.push(PartGroup {
                key: UNCLASSIFIED_KEY.to_string(),
                name: "Unclassified".to_string(),
                members: unclassified,
                classified: false,
            });
        }

        let by_key = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.key.clone(), i))
            .collect();

        let meshes = owner
            .into_iter()
            .map(|(id, group)| {
                // Every owned id was checked against the asset above
                let descriptor = &asset[&id];
                let entry = MeshEntry {
                    group,
                    bounds: descriptor.bounds,
                    base_color: descriptor.base_color,
                };
                (id, entry)
            })
            .collect::<HashMap<_, _>>();

        debug!(groups = groups.len(), meshes = meshes.len(), "Catalog built");

        Ok(Self {
            groups,
            by_key,
            meshes,
        })
    }

    /// Groups in table order, the unclassified bucket (if any) last
    pub fn groups(&self) -> impl Iterator<Item = &PartGroup> {
        self.groups.iter()
    }

    pub fn group(&self, key: &str) -> Option<&PartGroup> {
        self.by_key.get(key).map(|&i| &self.groups[i])
    }

    /// Group owning `mesh`
    pub fn group_of(&self, mesh: &MeshId) -> Result<&PartGroup, LookupError> {
        self.meshes
            .get(mesh)
            .map(|entry| &self.groups[entry.group])
            .ok_or_else(|| LookupError::UnknownMesh(mesh.clone()))
    }

    pub fn contains(&self, mesh: &MeshId) -> bool {
        self.meshes.contains_key(mesh)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Color captured when the catalog was built
    pub fn base_color(&self, mesh: &MeshId) -> Option<Color> {
        self.meshes.get(mesh).map(|e| e.base_color)
    }

    pub fn bounds(&self, mesh: &MeshId) -> Option<Aabb> {
        self.meshes.get(mesh).map(|e| e.bounds)
    }

    /// Bounds of every member of a group, in member order
    pub fn member_bounds(&self, group: &PartGroup) -> Vec<Aabb> {
        group
            .members
            .iter()
            .filter_map(|m| self.bounds(m))
            .collect()
    }

    /// Box enclosing every mesh of the asset
    pub fn extent(&self) -> Option<Aabb> {
        self.meshes
            .values()
            .map(|e| e.bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    pub fn unclassified(&self) -> Option<&PartGroup> {
        self.group(UNCLASSIFIED_KEY)
    }
}
