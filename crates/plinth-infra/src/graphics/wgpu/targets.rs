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

//! Size-dependent render targets and the fixed-size shadow map.

use super::context::HDR_FORMAT;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub(crate) const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The HDR color target (multisampled when MSAA is on), its single-sample
/// resolve, and the depth buffer, all at the physical render size.
#[derive(Debug)]
pub struct RenderTargets {
    pub size: (u32, u32),
    msaa_view: Option<wgpu::TextureView>,
    resolve_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
    /// Binds `resolve_view` for the tone-map pass.
    pub tonemap_bind_group: wgpu::BindGroup,
}

impl RenderTargets {
    pub fn new(
        device: &wgpu::Device,
        size: (u32, u32),
        sample_count: u32,
        tonemap_layout: &wgpu::BindGroupLayout,
        tonemap_uniforms: &wgpu::Buffer,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.0.max(1),
            height: size.1.max(1),
            depth_or_array_layers: 1,
        };
        let create = |label: &str, format, samples, usage| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: extent,
                    mip_level_count: 1,
                    sample_count: samples,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };

        let msaa_view = (sample_count > 1).then(|| {
            create(
                "HDR MSAA Target",
                HDR_FORMAT,
                sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        });
        let resolve_view = create(
            "HDR Target",
            HDR_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let depth_view = create(
            "Depth Texture",
            DEPTH_FORMAT,
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );

        let tonemap_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Tone Map Bind Group"),
            layout: tonemap_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&resolve_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: tonemap_uniforms.as_entire_binding(),
                },
            ],
        });

        log::info!(
            "Render targets created: {}x{} ({:?}, {}x MSAA)",
            extent.width,
            extent.height,
            HDR_FORMAT,
            sample_count
        );

        Self {
            size: (extent.width, extent.height),
            msaa_view,
            resolve_view,
            depth_view,
            tonemap_bind_group,
        }
    }

    /// Color attachment for the scene pass, resolving into the HDR target
    /// when multisampled.
    pub fn color_attachment(&self, clear: wgpu::Color) -> wgpu::RenderPassColorAttachment<'_> {
        let (view, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&self.resolve_view)),
            None => (&self.resolve_view, None),
        };
        wgpu::RenderPassColorAttachment {
            view,
            depth_slice: None,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: if self.msaa_view.is_some() {
                    wgpu::StoreOp::Discard
                } else {
                    wgpu::StoreOp::Store
                },
            },
        }
    }
}

/// Depth map rendered from the directional light.
#[derive(Debug)]
pub struct ShadowMap {
    pub size: u32,
    pub view: wgpu::TextureView,
}

impl ShadowMap {
    pub fn new(device: &wgpu::Device, size: u32) -> Self {
        let size = size.clamp(1, device.limits().max_texture_dimension_2d);
        let view = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Shadow Map"),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: SHADOW_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default());
        log::info!("Shadow map created: {size}x{size} ({SHADOW_FORMAT:?})");
        Self { size, view }
    }
}
