// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use plinth_core::scene::{NodeKind, Scene};
use serde::{Deserialize, Serialize};

/// The global material parameters the updater applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSettings {
    /// Strength of environment reflections on every standard material.
    pub env_map_intensity: f32,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            env_map_intensity: 1.0,
        }
    }
}

/// Applies `settings` to every mesh with a standard material.
///
/// Such meshes cast and receive shadows, take the global environment
/// intensity, and are flagged for re-upload. Other nodes are untouched.
/// Returns the number of materials visited; zero before any model exists.
pub fn update_all_materials(scene: &mut Scene, settings: &MaterialSettings) -> usize {
    let mut visited = 0;
    scene.traverse_mut(|node| {
        let NodeKind::Mesh(mesh) = &mut node.kind else {
            return;
        };
        let Some(material) = mesh.material.as_standard_mut() else {
            return;
        };
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;
        material.env_map_intensity = settings.env_map_intensity;
        material.mark_needs_update();
        visited += 1;
    });
    log::debug!("Material update touched {visited} materials.");
    visited
}

/// Lowers every material's update flag once the renderer has consumed it.
pub fn clear_material_updates(scene: &mut Scene) {
    scene.traverse_mut(|node| {
        if let NodeKind::Mesh(mesh) = &mut node.kind {
            if let Some(material) = mesh.material.as_standard_mut() {
                material.needs_update = false;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_core::math::Vec3;
    use plinth_core::scene::{
        Material, Mesh, MeshNode, Node, StandardMaterial, UnlitMaterial,
    };
    use std::sync::Arc;

    fn triangle() -> Arc<Mesh> {
        Arc::new(Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], None, None, None))
    }

    fn mesh_node(material: Material) -> Node {
        let mut node = MeshNode::new(triangle(), material);
        node.cast_shadow = false;
        node.receive_shadow = false;
        Node::mesh(None, node)
    }

    fn standard_state(scene: &Scene) -> Vec<(StandardMaterial, bool, bool)> {
        let mut out = Vec::new();
        scene.traverse(|node, _| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                if let Some(m) = mesh.material.as_standard() {
                    out.push((m.clone(), mesh.cast_shadow, mesh.receive_shadow));
                }
            }
        });
        out
    }

    #[test]
    fn empty_scene_is_a_no_op() {
        let mut scene = Scene::new();
        assert_eq!(update_all_materials(&mut scene, &MaterialSettings::default()), 0);
    }

    #[test]
    fn standard_meshes_get_settings_and_shadows() {
        let mut scene = Scene::new();
        let mut model = Node::group(Some("model"));
        model.add_child(mesh_node(Material::Standard(StandardMaterial::default())));
        model.add_child(mesh_node(Material::Unlit(UnlitMaterial::default())));
        scene.add(model);
        clear_material_updates(&mut scene);

        let settings = MaterialSettings {
            env_map_intensity: 2.5,
        };
        assert_eq!(update_all_materials(&mut scene, &settings), 1);

        let state = standard_state(&scene);
        assert_eq!(state.len(), 1);
        let (material, cast, receive) = &state[0];
        assert_eq!(material.env_map_intensity, 2.5);
        assert!(material.needs_update);
        assert!(*cast && *receive);

        // The unlit mesh keeps its flags.
        let mut unlit_shadows = None;
        scene.traverse(|node, _| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                if matches!(mesh.material, Material::Unlit(_)) {
                    unlit_shadows = Some(mesh.cast_shadow);
                }
            }
        });
        assert_eq!(unlit_shadows, Some(false));
    }

    #[test]
    fn second_update_changes_nothing() {
        let mut scene = Scene::new();
        scene.add(mesh_node(Material::Standard(StandardMaterial::default())));
        let settings = MaterialSettings {
            env_map_intensity: 7.0,
        };

        update_all_materials(&mut scene, &settings);
        let first = standard_state(&scene);
        update_all_materials(&mut scene, &settings);
        assert_eq!(standard_state(&scene), first);
    }

    #[test]
    fn clearing_lowers_the_flag() {
        let mut scene = Scene::new();
        scene.add(mesh_node(Material::Standard(StandardMaterial::default())));
        update_all_materials(&mut scene, &MaterialSettings::default());
        clear_material_updates(&mut scene);
        assert!(standard_state(&scene).iter().all(|(m, _, _)| !m.needs_update));
    }
}
