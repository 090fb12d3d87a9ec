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

//! The scene: a tree of nodes plus the environment cube map.

pub mod material;
pub mod mesh;
pub mod node;
pub mod transform;

pub use material::{AlphaMode, Material, StandardMaterial, UnlitMaterial};
pub use mesh::{compute_vertex_normals, Mesh, MeshId};
pub use node::{MeshNode, Node, NodeId, NodeKind};
pub use transform::Transform;

use crate::asset::CubeMap;
use crate::math::Mat4;
use std::sync::Arc;

/// The root container handed to the renderer each frame.
///
/// The environment serves both as the background and as the default
/// reflection source for standard materials.
#[derive(Debug, Clone)]
pub struct Scene {
    root: Node,
    /// Background and reflection cube map, once loaded.
    pub environment: Option<Arc<CubeMap>>,
}

impl Scene {
    /// An empty scene with no environment.
    pub fn new() -> Self {
        Self {
            root: Node::group(Some("Scene")),
            environment: None,
        }
    }

    /// Adds a node under the root and returns its id.
    pub fn add(&mut self, node: Node) -> NodeId {
        self.root.add_child(node)
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Looks a node up anywhere in the tree.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    /// Mutable lookup.
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.root.find_mut(id)
    }

    /// Whether `id` is attached to this scene.
    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Visits every node with its world matrix.
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(&Node, &Mat4),
    {
        self.root.traverse(&Mat4::IDENTITY, &mut visit);
    }

    /// Visits every node mutably.
    pub fn traverse_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut Node),
    {
        self.root.traverse_mut(&mut visit);
    }

    /// Number of mesh nodes in the whole scene.
    pub fn mesh_count(&self) -> usize {
        self.root.mesh_count()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scene_is_empty() {
        let scene = Scene::new();
        assert!(scene.environment.is_none());
        assert_eq!(scene.mesh_count(), 0);
        assert!(scene.root().children().is_empty());
    }

    #[test]
    fn added_nodes_are_contained() {
        let mut scene = Scene::new();
        let id = scene.add(Node::group(None));
        assert!(scene.contains(id));
        assert!(!scene.contains(Node::group(None).id()));
    }
}
