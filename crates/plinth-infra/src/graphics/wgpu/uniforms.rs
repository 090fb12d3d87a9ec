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

//! CPU-side mirrors of the WGSL uniform structs and the mesh vertex layout.
//!
//! Every struct here is `#[repr(C)]` and laid out in `vec4` multiples so it
//! matches WGSL's uniform address-space rules without explicit padding fields
//! on the shader side.

use super::conversions::IntoWgpu;
use bytemuck::{Pod, Zeroable};
use plinth_core::camera::PerspectiveCamera;
use plinth_core::math::{Mat4, Vec4};
use plinth_core::renderer::{DirectionalLight, RenderSettings};
use plinth_core::scene::{AlphaMode, Material, Mesh};

/// Interleaved mesh vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Zero when the mesh carries no tangents; the shader then derives a
    /// tangent frame from screen-space derivatives.
    pub tangent: [f32; 4],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x4
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleaves the attribute streams of a mesh.
    pub fn interleave(mesh: &Mesh) -> Vec<MeshVertex> {
        (0..mesh.positions.len())
            .map(|i| MeshVertex {
                position: mesh.positions[i].to_array(),
                normal: mesh.normals.get(i).map_or([0.0, 1.0, 0.0], |n| n.to_array()),
                uv: mesh
                    .tex_coords
                    .as_ref()
                    .and_then(|uvs| uvs.get(i))
                    .map_or([0.0, 0.0], |uv| [uv.x, uv.y]),
                tangent: mesh
                    .tangents
                    .as_ref()
                    .and_then(|t| t.get(i))
                    .map_or([0.0; 4], |t| t.to_array()),
            })
            .collect()
    }
}

/// Per-frame data shared by the shadow, skybox and PBR passes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    /// xyz: eye position.
    pub camera_position: [f32; 4],
    /// xyz: direction the light travels; w: intensity.
    pub light_direction: [f32; 4],
    /// rgb: light color; a: 1 when shadows are sampled.
    pub light_color: [f32; 4],
    /// x: depth bias; y: shadow texel size; z: environment mip count;
    /// w: 1 when an environment is bound.
    pub shadow_params: [f32; 4],
}

impl FrameUniforms {
    pub fn new(
        camera: &PerspectiveCamera,
        light: &DirectionalLight,
        settings: &RenderSettings,
        environment_mips: Option<u32>,
    ) -> Self {
        let view_proj = camera.view_projection_matrix();
        let inv_view_proj = view_proj.inverse().unwrap_or(Mat4::IDENTITY);
        let direction = light.direction();
        let shadows = settings.shadows_enabled && light.cast_shadow;
        Self {
            view_proj: view_proj.into_wgpu(),
            inv_view_proj: inv_view_proj.into_wgpu(),
            light_view_proj: light.shadow_view_projection().into_wgpu(),
            camera_position: Vec4::from_vec3(camera.position, 1.0).to_array(),
            light_direction: Vec4::from_vec3(direction, light.intensity).to_array(),
            light_color: [
                light.color.r,
                light.color.g,
                light.color.b,
                if shadows { 1.0 } else { 0.0 },
            ],
            shadow_params: [
                light.shadow.bias,
                1.0 / light.shadow.map_size.max(1) as f32,
                environment_mips.unwrap_or(1) as f32,
                if environment_mips.is_some() { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// Per-draw transform, bound with a dynamic offset.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`.
    pub normal_matrix: [[f32; 4]; 4],
    /// x: 1 when the mesh receives shadows.
    pub params: [f32; 4],
}

impl ObjectUniforms {
    pub fn new(world: &Mat4, receive_shadow: bool) -> Self {
        let normal_matrix = world
            .inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(*world);
        Self {
            model: (*world).into_wgpu(),
            normal_matrix: normal_matrix.into_wgpu(),
            params: [if receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Scalar material parameters; textures are bound alongside.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub base_color: [f32; 4],
    pub emissive: [f32; 4],
    /// metallic, roughness, normal scale, environment intensity.
    pub params: [f32; 4],
    /// x: alpha cutoff or -1; y: 1 for unlit.
    pub flags: [f32; 4],
}

impl MaterialUniforms {
    pub fn new(material: &Material) -> Self {
        match material {
            Material::Standard(m) => Self {
                base_color: m.base_color.to_array(),
                emissive: m.emissive.to_array(),
                params: [
                    m.metallic.clamp(0.0, 1.0),
                    m.roughness.clamp(0.0, 1.0),
                    m.normal_scale,
                    m.env_map_intensity,
                ],
                flags: [alpha_cutoff(m.alpha_mode), 0.0, 0.0, 0.0],
            },
            Material::Unlit(m) => Self {
                base_color: m.color.to_array(),
                emissive: [0.0; 4],
                params: [0.0, 1.0, 1.0, 0.0],
                flags: [-1.0, 1.0, 0.0, 0.0],
            },
        }
    }
}

fn alpha_cutoff(mode: AlphaMode) -> f32 {
    match mode {
        AlphaMode::Mask(cutoff) => cutoff,
        AlphaMode::Opaque | AlphaMode::Blend => -1.0,
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ToneMapUniforms {
    pub operator: u32,
    pub exposure: f32,
    pub encode_srgb: u32,
    pub _pad: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct OverlayUniforms {
    pub screen_size_points: [f32; 2],
    /// 1 when the target format linearizes on write.
    pub linear_output: u32,
    pub _pad: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_core::math::Vec3;
    use plinth_core::scene::{StandardMaterial, UnlitMaterial};

    #[test]
    fn uniform_sizes_are_vec4_multiples() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 256);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 144);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 64);
        assert_eq!(std::mem::size_of::<ToneMapUniforms>(), 16);
        assert_eq!(std::mem::size_of::<OverlayUniforms>(), 16);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 48);
    }

    #[test]
    fn interleave_fills_missing_streams() {
        let mesh = Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            None,
            None,
        );
        let vertices = MeshVertex::interleave(&mesh);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[2].uv, [0.0, 0.0]);
        assert_eq!(vertices[0].tangent, [0.0; 4]);
    }

    #[test]
    fn standard_material_carries_env_intensity() {
        let mut m = StandardMaterial::default();
        m.env_map_intensity = 0.4;
        m.alpha_mode = AlphaMode::Mask(0.5);
        let u = MaterialUniforms::new(&Material::Standard(m));
        assert_eq!(u.params[3], 0.4);
        assert_eq!(u.flags, [0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn unlit_material_sets_flag() {
        let u = MaterialUniforms::new(&Material::Unlit(UnlitMaterial::default()));
        assert_eq!(u.flags[1], 1.0);
    }

    #[test]
    fn shadows_off_when_disabled_in_settings() {
        let settings = RenderSettings {
            shadows_enabled: false,
            ..RenderSettings::default()
        };
        let u = FrameUniforms::new(
            &PerspectiveCamera::default(),
            &DirectionalLight::default(),
            &settings,
            Some(9),
        );
        assert_eq!(u.light_color[3], 0.0);
        assert_eq!(u.shadow_params[2], 9.0);
        assert_eq!(u.shadow_params[3], 1.0);
        assert_eq!(u.light_direction[3], 3.0);
    }
}
