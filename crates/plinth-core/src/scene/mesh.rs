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

//! Triangle mesh geometry.

use crate::math::{Aabb, Vec2, Vec3, Vec4};
use uuid::Uuid;

/// A unique identifier for mesh geometry, used to cache GPU buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub Uuid);

/// Indexed triangle-list geometry.
///
/// Meshes are immutable once built and shared through `Arc` between the scene
/// graph and the renderer's upload cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Stable identifier for GPU caching.
    pub id: MeshId,
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals, one per position.
    pub normals: Vec<Vec3>,
    /// First UV set, if present.
    pub tex_coords: Option<Vec<Vec2>>,
    /// Tangents with handedness in `w`, if present.
    pub tangents: Option<Vec<Vec4>>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Local-space bounds.
    pub bounds: Aabb,
}

impl Mesh {
    /// Builds a mesh. Missing normals are computed from the triangles;
    /// missing indices become a sequential list.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        tex_coords: Option<Vec<Vec2>>,
        indices: Option<Vec<u32>>,
    ) -> Self {
        let indices = indices.unwrap_or_else(|| (0..positions.len() as u32).collect());
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => compute_vertex_normals(&positions, &indices),
        };
        let bounds = Aabb::from_points(&positions);
        Self {
            id: MeshId(Uuid::new_v4()),
            positions,
            normals,
            tex_coords,
            tangents: None,
            indices,
            bounds,
        }
    }

    /// Attaches per-vertex tangents.
    pub fn with_tangents(mut self, tangents: Vec<Vec4>) -> Self {
        if tangents.len() == self.positions.len() {
            self.tangents = Some(tangents);
        } else {
            log::warn!(
                "Ignoring {} tangents for a mesh with {} vertices.",
                tangents.len(),
                self.positions.len()
            );
        }
        self
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Area-weighted smooth normals: each face normal is accumulated unnormalized
/// into its three vertices.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.iter().map(|n| n.normalize()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Vec3> {
        vec![Vec3::ZERO, Vec3::X, Vec3::Y]
    }

    #[test]
    fn missing_normals_are_computed() {
        let mesh = Mesh::new(triangle(), None, None, None);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.normals.iter().all(|n| *n == Vec3::Z));
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn mismatched_normals_are_replaced() {
        let mesh = Mesh::new(triangle(), Some(vec![Vec3::X]), None, Some(vec![0, 2, 1]));
        assert!(mesh.normals.iter().all(|n| *n == -Vec3::Z));
    }

    #[test]
    fn bounds_cover_positions() {
        let mesh = Mesh::new(triangle(), None, None, None);
        assert_eq!(mesh.bounds.min, Vec3::ZERO);
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn each_mesh_gets_its_own_id() {
        let a = Mesh::new(triangle(), None, None, None);
        let b = Mesh::new(triangle(), None, None, None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let normals = compute_vertex_normals(&triangle(), &[0, 1, 7]);
        assert!(normals.iter().all(|n| *n == Vec3::ZERO));
    }
}
