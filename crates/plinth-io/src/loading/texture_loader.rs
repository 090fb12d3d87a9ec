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

//! Texture decoding.

use crate::loader::AssetLoader;
use anyhow::{Context, Result};
use plinth_core::asset::{ColorSpace, CpuTexture};

/// Decodes PNG/JPEG/... into an RGBA8 [`CpuTexture`] with a full mip chain.
#[derive(Debug, Clone, Copy)]
pub struct TextureLoader {
    /// How the decoded channels are to be interpreted.
    pub color_space: ColorSpace,
}

impl TextureLoader {
    /// A loader for color data (base color, emissive, environment faces).
    pub fn srgb() -> Self {
        Self {
            color_space: ColorSpace::Srgb,
        }
    }

    /// A loader for non-color data (normals, metallic-roughness, occlusion).
    pub fn linear() -> Self {
        Self {
            color_space: ColorSpace::Linear,
        }
    }
}

impl AssetLoader<CpuTexture> for TextureLoader {
    fn load(
        &self,
        bytes: &[u8],
    ) -> Result<CpuTexture, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let img = image::load_from_memory(bytes).context("Failed to decode image from memory")?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        CpuTexture::from_rgba8(width, height, rgba_img.into_raw(), self.color_space)
            .ok_or_else(|| format!("Decoded image has invalid size {width}x{height}").into())
    }
}
