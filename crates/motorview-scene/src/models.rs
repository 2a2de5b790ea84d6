//! Model loading and mesh discovery
//!
//! The glTF file named by [`ModelSource`] is loaded once. When its default
//! scene has been spawned under the [`AssemblyRoot`], every mesh primitive is
//! given its own material, tagged with [`PartMesh`], and reported to the
//! [`PartSession`] so the catalog can be built.

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;
use motorview_core::{Aabb, MeshDescriptor, MeshId};
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use crate::types::*;

/// Handle of the glTF being loaded, dropped once it has been spawned
#[derive(Resource, Default)]
pub struct ModelHandle {
    pub gltf: Option<Handle<Gltf>>,
    pub spawned: bool,
}

/// Plugin for model loading
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelHandle>()
            .init_resource::<ModelStatus>()
            .init_resource::<PartEntities>()
            .add_systems(Startup, start_model_load)
            .add_systems(Update, (load_models, sync_assembly_visibility));
    }
}

fn start_model_load(
    mut model: ResMut<ModelHandle>,
    source: Res<ModelSource>,
    asset_server: Res<AssetServer>,
) {
    tracing::info!("Starting to load model: {}", source.path);
    model.gltf = Some(asset_server.load(source.path.clone()));
}

/// Check loading state and spawn the default scene once the glTF is ready
fn load_models(
    mut commands: Commands,
    mut model: ResMut<ModelHandle>,
    mut status: ResMut<ModelStatus>,
    source: Res<ModelSource>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
) {
    if model.spawned {
        return;
    }
    let Some(handle) = model.gltf.clone() else {
        return;
    };

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            model.spawned = true;
            let scene = gltf_assets
                .get(&handle)
                .and_then(|gltf| gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()));
            let Some(scene) = scene else {
                tracing::error!("Model {} contains no scenes", source.path);
                *status = ModelStatus::Failed(format!("{} contains no scenes", source.path));
                return;
            };
            tracing::info!("Model loaded: {}", source.path);
            spawn_assembly(&mut commands, scene);
        }
        Some(LoadState::Failed(err)) => {
            model.spawned = true;
            tracing::error!("Failed to load model {}: {}", source.path, err);
            *status = ModelStatus::Failed(err.to_string());
        }
        _ => {
            // Still loading
        }
    }
}

/// Spawn the scene under a root rotated a quarter turn about X
fn spawn_assembly(commands: &mut Commands, scene: Handle<Scene>) {
    commands
        .spawn((
            Name::new("assembly"),
            AssemblyRoot,
            Transform::from_rotation(Quat::from_rotation_x(FRAC_PI_2)),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn(SceneRoot(scene)).observe(on_scene_ready);
        });
}

/// All primitives found for one mesh id
struct DiscoveredMesh {
    id: MeshId,
    bounds: Aabb,
    emissive: LinearRgba,
    entities: Vec<Entity>,
}

fn on_scene_ready(
    trigger: On<SceneInstanceReady>,
    mut commands: Commands,
    children: Query<&Children>,
    mesh_query: Query<(&Mesh3d, Option<&MeshMaterial3d<StandardMaterial>>)>,
    names: Query<&Name>,
    parents: Query<&ChildOf>,
    transforms: Query<&Transform>,
    meshes: Res<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut session: ResMut<PartSession>,
    mut part_entities: ResMut<PartEntities>,
    mut status: ResMut<ModelStatus>,
) {
    let scene_root = trigger.event().event_target();
    let mut discovered: Vec<DiscoveredMesh> = Vec::new();
    let mut index: HashMap<MeshId, usize> = HashMap::new();

    for entity in children.iter_descendants(scene_root) {
        let Ok((mesh3d, material)) = mesh_query.get(entity) else {
            continue;
        };
        let Some(id) = mesh_id_for(entity, &names, &parents) else {
            tracing::warn!("Skipping unnamed mesh entity {:?}", entity);
            continue;
        };
        let Some(local_bounds) = meshes.get(&mesh3d.0).and_then(mesh_bounds) else {
            tracing::warn!("Mesh {} has no vertex positions", id);
            continue;
        };
        let bounds = local_bounds.transformed(&relative_affine(entity, scene_root, &parents, &transforms));

        // Give every primitive its own material so highlights never leak
        // through materials shared inside the glTF
        let original = material.and_then(|m| materials.get(&m.0)).cloned();
        let emissive = match original {
            Some(own) => {
                let emissive = own.emissive;
                commands.entity(entity).insert(MeshMaterial3d(materials.add(own)));
                emissive
            }
            None => {
                tracing::warn!("Mesh {} has no MeshMaterial3d<StandardMaterial>", id);
                LinearRgba::BLACK
            }
        };
        commands.entity(entity).insert(PartMesh {
            id: id.clone(),
            original_emissive: emissive,
        });

        match index.get(&id) {
            Some(&i) => {
                let entry = &mut discovered[i];
                entry.bounds = entry.bounds.union(&bounds);
                entry.entities.push(entity);
            }
            None => {
                index.insert(id.clone(), discovered.len());
                discovered.push(DiscoveredMesh {
                    id,
                    bounds,
                    emissive,
                    entities: vec![entity],
                });
            }
        }
    }

    let descriptors: Vec<MeshDescriptor> = discovered
        .iter()
        .map(|d| MeshDescriptor::new(d.id.clone(), d.bounds, part_color_from(d.emissive)))
        .collect();
    part_entities.0 = discovered.into_iter().map(|d| (d.id, d.entities)).collect();

    match session.load_asset(descriptors) {
        Ok(catalog) => {
            *status = ModelStatus::Ready {
                meshes: catalog.mesh_count(),
                groups: catalog.group_count(),
            };
        }
        Err(e) => {
            tracing::error!("Failed to build part catalog, hiding model: {}", e);
            *status = ModelStatus::Failed(e.to_string());
        }
    }
}

/// A model without a catalog is not drawn
fn sync_assembly_visibility(
    status: Res<ModelStatus>,
    mut assembly: Query<&mut Visibility, With<AssemblyRoot>>,
) {
    if !status.is_changed() {
        return;
    }
    let visibility = match *status {
        ModelStatus::Failed(_) => Visibility::Hidden,
        _ => Visibility::Inherited,
    };
    for mut current in assembly.iter_mut() {
        *current = visibility;
    }
}

/// glTF node name of a primitive: the parent's name, else its own
pub fn mesh_id_for(entity: Entity, names: &Query<&Name>, parents: &Query<&ChildOf>) -> Option<MeshId> {
    parents
        .get(entity)
        .ok()
        .and_then(|child_of| names.get(child_of.parent()).ok())
        .or_else(|| names.get(entity).ok())
        .map(|name| MeshId::new(name.as_str()))
}

/// Bounds of the vertex positions in mesh space
pub fn mesh_bounds(mesh: &Mesh) -> Option<Aabb> {
    let positions = mesh.attribute(Mesh::ATTRIBUTE_POSITION)?.as_float3()?;
    Aabb::from_points(positions.iter().map(|p| Vec3::from_array(*p)))
}

/// Transform from `entity`'s space into `root`'s space, composed from the
/// local transforms along the parent chain
pub fn relative_affine(
    entity: Entity,
    root: Entity,
    parents: &Query<&ChildOf>,
    transforms: &Query<&Transform>,
) -> Affine3A {
    let mut affine = Affine3A::IDENTITY;
    let mut current = entity;
    while current != root {
        if let Ok(transform) = transforms.get(current) {
            affine = transform.compute_affine() * affine;
        }
        match parents.get(current) {
            Ok(child_of) => current = child_of.parent(),
            Err(_) => break,
        }
    }
    affine
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy::ecs::system::SystemState;

    #[test]
    fn test_failed_catalog_hides_assembly() {
        let mut app = App::new();
        app.init_resource::<ModelStatus>()
            .add_systems(Update, sync_assembly_visibility);
        let root = app.world_mut().spawn((AssemblyRoot, Visibility::default())).id();

        app.update();
        assert_eq!(app.world().get::<Visibility>(root), Some(&Visibility::Inherited));

        *app.world_mut().resource_mut::<ModelStatus>() =
            ModelStatus::Failed("mesh mesh_3 is not classified".to_string());
        app.update();
        assert_eq!(app.world().get::<Visibility>(root), Some(&Visibility::Hidden));

        *app.world_mut().resource_mut::<ModelStatus>() = ModelStatus::Ready { meshes: 1, groups: 1 };
        app.update();
        assert_eq!(app.world().get::<Visibility>(root), Some(&Visibility::Inherited));
    }

    #[test]
    fn test_mesh_bounds_cuboid() {
        let mesh = Mesh::from(Cuboid::new(2.0, 4.0, 6.0));
        let bounds = mesh_bounds(&mesh).unwrap();
        assert_relative_eq!(bounds.min.x, -1.0);
        assert_relative_eq!(bounds.max.y, 2.0);
        assert_relative_eq!(bounds.max.z, 3.0);
    }

    #[test]
    fn test_relative_affine_composes_chain() {
        let mut world = World::new();
        let root = world.spawn(Transform::from_xyz(100.0, 0.0, 0.0)).id();
        let node = world.spawn((Transform::from_xyz(1.0, 0.0, 0.0), ChildOf(root))).id();
        let primitive = world
            .spawn((Transform::from_scale(Vec3::splat(2.0)), ChildOf(node)))
            .id();

        let mut state: SystemState<(Query<&ChildOf>, Query<&Transform>)> = SystemState::new(&mut world);
        let (parents, transforms) = state.get(&world);

        // Root's own transform is excluded
        let affine = relative_affine(primitive, root, &parents, &transforms);
        let p = affine.transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 2.0);

        let identity = relative_affine(root, root, &parents, &transforms);
        assert_eq!(identity, Affine3A::IDENTITY);
    }

    #[test]
    fn test_mesh_id_prefers_parent_name() {
        let mut world = World::new();
        let node = world.spawn(Name::new("mesh_7")).id();
        let primitive = world.spawn((Name::new("mesh_7.0"), ChildOf(node))).id();
        let orphan = world.spawn(Name::new("loose")).id();
        let nameless = world.spawn_empty().id();

        let mut state: SystemState<(Query<&Name>, Query<&ChildOf>)> = SystemState::new(&mut world);
        let (names, parents) = state.get(&world);

        assert_eq!(mesh_id_for(primitive, &names, &parents), Some(MeshId::from("mesh_7")));
        assert_eq!(mesh_id_for(orphan, &names, &parents), Some(MeshId::from("loose")));
        assert_eq!(mesh_id_for(nameless, &names, &parents), None);
    }
}
