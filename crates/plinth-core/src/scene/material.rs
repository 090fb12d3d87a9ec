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

//! Surface materials attached to mesh nodes.

use crate::asset::CpuTexture;
use crate::math::LinearRgba;
use std::sync::Arc;

/// Determines how the alpha channel of a material is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    /// Alpha is ignored.
    #[default]
    Opaque,
    /// Fragments below the cutoff are discarded.
    Mask(f32),
    /// Alpha blending. Drawn without depth writes.
    Blend,
}

/// A physically-based material following the metallic-roughness workflow.
///
/// This is the only material the material updater touches: it receives the
/// global environment intensity and is flagged for re-upload whenever its
/// parameters change.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    /// Base color factor (linear).
    pub base_color: LinearRgba,
    /// Optional base color texture (sRGB).
    pub base_color_texture: Option<Arc<CpuTexture>>,
    /// Metallic factor in `[0, 1]`.
    pub metallic: f32,
    /// Perceptual roughness in `[0, 1]`.
    pub roughness: f32,
    /// Metallic in B, roughness in G (linear).
    pub metallic_roughness_texture: Option<Arc<CpuTexture>>,
    /// Tangent-space normal map (linear).
    pub normal_texture: Option<Arc<CpuTexture>>,
    /// Strength of the normal map.
    pub normal_scale: f32,
    /// Ambient occlusion in R (linear).
    pub occlusion_texture: Option<Arc<CpuTexture>>,
    /// Emissive color factor (linear RGB).
    pub emissive: LinearRgba,
    /// Optional emissive texture (sRGB).
    pub emissive_texture: Option<Arc<CpuTexture>>,
    /// Multiplier applied to environment-map lighting.
    pub env_map_intensity: f32,
    /// How alpha is interpreted.
    pub alpha_mode: AlphaMode,
    /// Disable back-face culling.
    pub double_sided: bool,
    /// Set when parameters changed and the GPU copy must be rewritten.
    /// Cleared once a frame carrying the change has been submitted.
    pub needs_update: bool,
}

impl StandardMaterial {
    /// Flags the material for re-upload on the next frame.
    #[inline]
    pub fn mark_needs_update(&mut self) {
        self.needs_update = true;
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            base_color: LinearRgba::WHITE,
            base_color_texture: None,
            metallic: 0.0,
            roughness: 1.0,
            metallic_roughness_texture: None,
            normal_texture: None,
            normal_scale: 1.0,
            occlusion_texture: None,
            emissive: LinearRgba::BLACK,
            emissive_texture: None,
            env_map_intensity: 1.0,
            alpha_mode: AlphaMode::Opaque,
            double_sided: false,
            needs_update: true,
        }
    }
}

/// A flat-colored material that ignores lighting.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlitMaterial {
    /// Surface color (linear).
    pub color: LinearRgba,
    /// Optional color texture (sRGB).
    pub texture: Option<Arc<CpuTexture>>,
    /// Disable back-face culling.
    pub double_sided: bool,
}

impl Default for UnlitMaterial {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            texture: None,
            double_sided: false,
        }
    }
}

/// The material variants a mesh node can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Physically-based, lit, environment-mapped.
    Standard(StandardMaterial),
    /// Unlit flat color. glTF `KHR_materials_unlit` maps here.
    Unlit(UnlitMaterial),
}

impl Material {
    /// Returns the standard material if this is one.
    pub fn as_standard(&self) -> Option<&StandardMaterial> {
        match self {
            Material::Standard(m) => Some(m),
            Material::Unlit(_) => None,
        }
    }

    /// Mutable access to the standard material if this is one.
    pub fn as_standard_mut(&mut self) -> Option<&mut StandardMaterial> {
        match self {
            Material::Standard(m) => Some(m),
            Material::Unlit(_) => None,
        }
    }

    /// Whether back faces should be drawn.
    pub fn double_sided(&self) -> bool {
        match self {
            Material::Standard(m) => m.double_sided,
            Material::Unlit(m) => m.double_sided,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::Standard(StandardMaterial::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_defaults_match_gltf() {
        let m = StandardMaterial::default();
        assert_eq!(m.base_color, LinearRgba::WHITE);
        assert_eq!(m.metallic, 0.0);
        assert_eq!(m.roughness, 1.0);
        assert_eq!(m.env_map_intensity, 1.0);
        assert!(m.needs_update);
    }

    #[test]
    fn unlit_is_not_standard() {
        let mut m = Material::Unlit(UnlitMaterial::default());
        assert!(m.as_standard().is_none());
        assert!(m.as_standard_mut().is_none());
        assert!(Material::default().as_standard().is_some());
    }
}
