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

//! Scene graph nodes.

use super::material::Material;
use super::mesh::Mesh;
use super::transform::Transform;
use crate::math::Mat4;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A drawable primitive: geometry plus its surface.
#[derive(Debug, Clone)]
pub struct MeshNode {
    /// Shared geometry.
    pub mesh: Arc<Mesh>,
    /// Owned material, mutated in place by the material updater.
    pub material: Material,
    /// Rendered into the shadow map.
    pub cast_shadow: bool,
    /// Samples the shadow map.
    pub receive_shadow: bool,
}

impl MeshNode {
    /// A mesh node that casts and receives shadows.
    pub fn new(mesh: Arc<Mesh>, material: Material) -> Self {
        Self {
            mesh,
            material,
            cast_shadow: true,
            receive_shadow: true,
        }
    }
}

/// What a node carries besides its transform.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A pure grouping node.
    Group,
    /// A drawable mesh.
    Mesh(MeshNode),
}

/// A node in the scene tree. Children are owned.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    /// Optional human-readable name, usually from the source file.
    pub name: Option<String>,
    /// Transform relative to the parent.
    pub transform: Transform,
    /// Node payload.
    pub kind: NodeKind,
    children: Vec<Node>,
}

impl Node {
    /// An empty group node.
    pub fn group(name: Option<&str>) -> Self {
        Self::with_kind(name.map(str::to_owned), NodeKind::Group)
    }

    /// A mesh node.
    pub fn mesh(name: Option<&str>, mesh: MeshNode) -> Self {
        Self::with_kind(name.map(str::to_owned), NodeKind::Mesh(mesh))
    }

    fn with_kind(name: Option<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            name,
            transform: Transform::IDENTITY,
            kind,
            children: Vec::new(),
        }
    }

    /// This node's identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Appends a child and returns its id.
    pub fn add_child(&mut self, child: Node) -> NodeId {
        let id = child.id;
        self.children.push(child);
        id
    }

    /// Direct children.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Depth-first search for a node in this subtree, including `self`.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Mutable variant of [`Node::find`].
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Visits every node in the subtree, pre-order, with its world matrix.
    pub fn traverse<F>(&self, parent_world: &Mat4, visit: &mut F)
    where
        F: FnMut(&Node, &Mat4),
    {
        let world = *parent_world * self.transform.to_matrix();
        visit(self, &world);
        for child in &self.children {
            child.traverse(&world, visit);
        }
    }

    /// Visits every node in the subtree mutably, pre-order.
    pub fn traverse_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut Node),
    {
        visit(self);
        for child in &mut self.children {
            child.traverse_mut(visit);
        }
    }

    /// Number of mesh nodes in the subtree.
    pub fn mesh_count(&self) -> usize {
        let own = usize::from(matches!(self.kind, NodeKind::Mesh(_)));
        own + self.children.iter().map(Node::mesh_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn tiny_mesh() -> Arc<Mesh> {
        Arc::new(Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], None, None, None))
    }

    #[test]
    fn ids_are_unique() {
        let a = Node::group(None);
        let b = Node::group(None);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn find_reaches_grandchildren() {
        let mut root = Node::group(Some("root"));
        let mut mid = Node::group(None);
        let leaf = Node::mesh(None, MeshNode::new(tiny_mesh(), Material::default()));
        let leaf_id = mid.add_child(leaf);
        root.add_child(mid);
        assert!(root.find(leaf_id).is_some());
        assert_eq!(root.mesh_count(), 1);
    }

    #[test]
    fn traverse_composes_world_matrices() {
        let mut root = Node::group(None);
        root.transform = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let mut child = Node::group(None);
        child.transform = Transform::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let child_id = root.add_child(child);

        let mut seen = None;
        root.traverse(&Mat4::IDENTITY, &mut |node, world| {
            if node.id() == child_id {
                seen = Some(world.transform_point3(Vec3::ZERO));
            }
        });
        assert_eq!(seen, Some(Vec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn traverse_mut_visits_all() {
        let mut root = Node::group(None);
        root.add_child(Node::group(None));
        root.add_child(Node::group(None));
        let mut count = 0;
        root.traverse_mut(&mut |_| count += 1);
        assert_eq!(count, 3);
    }
}
