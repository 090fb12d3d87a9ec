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

//! CPU-side texture data, decoded and ready for GPU upload.

use crate::math::color::{linear_to_srgb, srgb_to_linear};
use uuid::Uuid;

/// A unique identifier for a decoded texture, used by the renderer to cache
/// its GPU counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub Uuid);

impl TextureId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TextureId {
    fn default() -> Self {
        Self::new()
    }
}

/// How the 8-bit channels of a texture are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// sRGB-encoded color data (base color, emissive, environment faces).
    Srgb,
    /// Raw linear data (normals, metallic-roughness).
    Linear,
}

/// A single level of a mip chain, stored as tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

/// A decoded RGBA8 texture with a full mip chain.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTexture {
    /// Stable identifier for GPU caching.
    pub id: TextureId,
    /// Encoding of the color channels.
    pub color_space: ColorSpace,
    /// Mip levels, base level first. Never empty.
    pub levels: Vec<MipLevel>,
}

impl CpuTexture {
    /// Wraps a base level and generates the remaining mips.
    ///
    /// Returns `None` when `pixels` does not hold exactly `width * height`
    /// RGBA8 texels, or when either dimension is zero.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>, color_space: ColorSpace) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        let base = MipLevel {
            width,
            height,
            pixels,
        };
        Some(Self {
            id: TextureId::new(),
            color_space,
            levels: generate_mip_chain(base, color_space),
        })
    }

    /// Width of the base level.
    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    /// Height of the base level.
    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    /// Number of mip levels, including the base.
    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }
}

/// Builds a box-filtered mip chain down to 1x1.
///
/// sRGB data is averaged in linear space so bright texels are not darkened
/// in the smaller levels.
pub fn generate_mip_chain(base: MipLevel, color_space: ColorSpace) -> Vec<MipLevel> {
    let mut levels = vec![base];
    loop {
        let prev = &levels[levels.len() - 1];
        if prev.width == 1 && prev.height == 1 {
            break;
        }
        let next = downsample(prev, color_space);
        levels.push(next);
    }
    levels
}

fn downsample(src: &MipLevel, color_space: ColorSpace) -> MipLevel {
    let width = (src.width / 2).max(1);
    let height = (src.height / 2).max(1);
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);

    let texel = |x: u32, y: u32, c: usize| -> f32 {
        let x = x.min(src.width - 1);
        let y = y.min(src.height - 1);
        let v = src.pixels[((y * src.width + x) * 4) as usize + c] as f32 / 255.0;
        match (color_space, c) {
            (ColorSpace::Srgb, 0..=2) => srgb_to_linear(v),
            _ => v,
        }
    };

    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = (x * 2, y * 2);
            for c in 0..4 {
                let avg = (texel(sx, sy, c)
                    + texel(sx + 1, sy, c)
                    + texel(sx, sy + 1, c)
                    + texel(sx + 1, sy + 1, c))
                    * 0.25;
                let encoded = match (color_space, c) {
                    (ColorSpace::Srgb, 0..=2) => linear_to_srgb(avg),
                    _ => avg,
                };
                pixels.push((encoded * 255.0 + 0.5).clamp(0.0, 255.0) as u8);
            }
        }
    }

    MipLevel {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_reaches_one_by_one() {
        let tex = CpuTexture::from_rgba8(8, 4, vec![255; 8 * 4 * 4], ColorSpace::Linear).unwrap();
        let sizes: Vec<_> = tex.levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(8, 4), (4, 2), (2, 1), (1, 1)]);
        assert_eq!(tex.mip_level_count(), 4);
        assert!(tex.levels.iter().all(|l| l.pixels.iter().all(|&p| p == 255)));
    }

    #[test]
    fn rejects_wrong_buffer_size() {
        assert!(CpuTexture::from_rgba8(2, 2, vec![0; 15], ColorSpace::Srgb).is_none());
        assert!(CpuTexture::from_rgba8(0, 2, vec![], ColorSpace::Srgb).is_none());
    }

    #[test]
    fn srgb_average_is_done_in_linear_space() {
        // Black and white checker: linear average is 0.5, which encodes to ~188.
        let mut pixels = Vec::new();
        for v in [0u8, 255, 255, 0] {
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
        let tex = CpuTexture::from_rgba8(2, 2, pixels.clone(), ColorSpace::Srgb).unwrap();
        assert_eq!(tex.levels[1].pixels[0], 188);
        assert_eq!(tex.levels[1].pixels[3], 255);

        let linear = CpuTexture::from_rgba8(2, 2, pixels, ColorSpace::Linear).unwrap();
        assert_eq!(linear.levels[1].pixels[0], 128);
    }
}
