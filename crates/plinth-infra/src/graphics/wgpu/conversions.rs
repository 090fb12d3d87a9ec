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

use plinth_core::asset::ColorSpace;
use plinth_core::math::{LinearRgba, Mat4};

/// A local extension trait to convert viewer types into WGPU-compatible types.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a WGPU-compatible type.
    fn into_wgpu(self) -> T;
}

impl IntoWgpu<wgpu::Color> for LinearRgba {
    fn into_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl IntoWgpu<wgpu::TextureFormat> for ColorSpace {
    fn into_wgpu(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

impl IntoWgpu<[[f32; 4]; 4]> for Mat4 {
    fn into_wgpu(self) -> [[f32; 4]; 4] {
        self.to_cols_array_2d()
    }
}

impl IntoWgpu<wgpu::FilterMode> for egui::TextureFilter {
    fn into_wgpu(self) -> wgpu::FilterMode {
        match self {
            egui::TextureFilter::Nearest => wgpu::FilterMode::Nearest,
            egui::TextureFilter::Linear => wgpu::FilterMode::Linear,
        }
    }
}

impl IntoWgpu<wgpu::AddressMode> for egui::TextureWrapMode {
    fn into_wgpu(self) -> wgpu::AddressMode {
        match self {
            egui::TextureWrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            egui::TextureWrapMode::Repeat => wgpu::AddressMode::Repeat,
            egui::TextureWrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

/// Physical render size for a logical size and pixel ratio. Never zero.
pub fn physical_size(logical: (u32, u32), pixel_ratio: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * pixel_ratio).round() as u32).max(1);
    (scale(logical.0), scale(logical.1))
}

/// Rounds `value` up to a multiple of `alignment`, which must be a power of two.
pub fn align_to(value: u64, alignment: u64) -> u64 {
    (value + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_space_conversion() {
        assert_eq!(
            wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Srgb.into_wgpu()
        );
        assert_eq!(
            wgpu::TextureFormat::Rgba8Unorm,
            ColorSpace::Linear.into_wgpu()
        );
    }

    #[test]
    fn test_color_conversion() {
        let color: wgpu::Color = LinearRgba::new(0.25, 0.5, 1.0, 0.75).into_wgpu();
        assert_eq!(color.r, 0.25);
        assert_eq!(color.g, 0.5);
        assert_eq!(color.b, 1.0);
        assert_eq!(color.a, 0.75);
    }

    #[test]
    fn test_egui_sampler_conversion() {
        assert_eq!(
            wgpu::FilterMode::Nearest,
            egui::TextureFilter::Nearest.into_wgpu()
        );
        assert_eq!(
            wgpu::AddressMode::MirrorRepeat,
            egui::TextureWrapMode::MirroredRepeat.into_wgpu()
        );
    }

    #[test]
    fn test_physical_size_scales_and_rounds() {
        assert_eq!(physical_size((1280, 720), 1.0), (1280, 720));
        assert_eq!(physical_size((1280, 720), 2.0), (2560, 1440));
        assert_eq!(physical_size((801, 601), 1.5), (1202, 902));
        assert_eq!(physical_size((1, 1), 0.25), (1, 1));
    }

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(144, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
        assert_eq!(align_to(0, 256), 0);
    }
}
