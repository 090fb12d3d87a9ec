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

//! Draws the egui debug panel on top of the tone-mapped frame.

use super::conversions::IntoWgpu;
use super::pipelines::{pipeline_layout, sampler_entry, uniform_entry};
use super::uniforms::OverlayUniforms;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use std::collections::HashMap;

/// Tessellated overlay output for one frame, handed to the renderer through
/// `FrameInput::overlay`.
#[derive(Debug, Default)]
pub struct OverlayFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct OverlayVertex {
    pos: [f32; 2],
    uv: [f32; 2],
    color: [u8; 4],
}

impl OverlayVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Unorm8x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<&egui::epaint::Vertex> for OverlayVertex {
    fn from(v: &egui::epaint::Vertex) -> Self {
        Self {
            pos: [v.pos.x, v.pos.y],
            uv: [v.uv.x, v.uv.y],
            color: v.color.to_array(),
        }
    }
}

/// One mesh of the overlay, already placed in the shared buffers.
#[derive(Debug, Clone)]
struct OverlayDraw {
    texture: egui::TextureId,
    indices: std::ops::Range<u32>,
    base_vertex: i32,
    scissor: [u32; 4],
}

#[derive(Debug)]
struct OverlayTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Owns the overlay pipeline, egui's textures and the streaming geometry.
#[derive(Debug)]
pub struct OverlayPainter {
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    textures: HashMap<egui::TextureId, OverlayTexture>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    draws: Vec<OverlayDraw>,
}

impl OverlayPainter {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Uniform Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT, false, None)],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                sampler_entry(1, wgpu::SamplerBindingType::Filtering),
            ],
        });

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Uniforms"),
            size: std::mem::size_of::<OverlayUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/overlay.wgsl"))),
        });
        let layout = pipeline_layout(device, "Overlay", &[&uniform_layout, &texture_layout]);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[OverlayVertex::layout()],
            },
            // egui's winding order is not consistent.
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview_mask: None,
            cache: None,
        });

        log::info!("Overlay painter created for {target_format:?}.");

        Self {
            pipeline,
            uniforms,
            uniform_bind_group,
            texture_layout,
            textures: HashMap::new(),
            vertex_buffer: geometry_buffer(device, "Overlay Vertices", wgpu::BufferUsages::VERTEX, 1024 * 20),
            index_buffer: geometry_buffer(device, "Overlay Indices", wgpu::BufferUsages::INDEX, 1024 * 12),
            draws: Vec::new(),
        }
    }

    /// Uploads new and patched egui textures.
    pub fn update_textures(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, delta: &egui::TexturesDelta) {
        for (id, image_delta) in &delta.set {
            let egui::ImageData::Color(image) = &image_delta.image;
            let [width, height] = image.size;
            let pixels: Vec<u8> = image.pixels.iter().flat_map(|c| c.to_array()).collect();
            let size = wgpu::Extent3d {
                width: width as u32,
                height: height as u32,
                depth_or_array_layers: 1,
            };

            let origin = match image_delta.pos {
                Some([x, y]) => {
                    if !self.textures.contains_key(id) {
                        log::warn!("Partial update for unknown overlay texture {id:?}; skipped.");
                        continue;
                    }
                    wgpu::Origin3d {
                        x: x as u32,
                        y: y as u32,
                        z: 0,
                    }
                }
                None => {
                    let texture = device.create_texture(&wgpu::TextureDescriptor {
                        label: Some("Overlay Texture"),
                        size,
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format: wgpu::TextureFormat::Rgba8UnormSrgb,
                        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                        view_formats: &[],
                    });
                    let bind_group = self.texture_bind_group(device, &texture, &image_delta.options);
                    self.textures.insert(*id, OverlayTexture { texture, bind_group });
                    wgpu::Origin3d::ZERO
                }
            };

            if let Some(entry) = self.textures.get(id) {
                queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: &entry.texture,
                        mip_level: 0,
                        origin,
                        aspect: wgpu::TextureAspect::All,
                    },
                    &pixels,
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(4 * size.width),
                        rows_per_image: Some(size.height),
                    },
                    size,
                );
            }
        }
    }

    /// Drops textures egui no longer needs. Call after the frame is submitted.
    pub fn free_textures(&mut self, delta: &egui::TexturesDelta) {
        for id in &delta.free {
            self.textures.remove(id);
        }
    }

    /// Streams the frame's geometry and records where each mesh landed.
    ///
    /// `target_size` is in physical pixels; `scale` converts egui points to
    /// those pixels.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        primitives: &[egui::ClippedPrimitive],
        target_size: (u32, u32),
        scale: f32,
        linear_output: bool,
    ) {
        self.draws.clear();
        let uniforms = OverlayUniforms {
            screen_size_points: [target_size.0 as f32 / scale, target_size.1 as f32 / scale],
            linear_output: linear_output as u32,
            _pad: 0,
        };
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));

        let mut vertices: Vec<OverlayVertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        for clipped in primitives {
            let egui::epaint::Primitive::Mesh(mesh) = &clipped.primitive else {
                log::trace!("Overlay paint callbacks are not supported; skipped.");
                continue;
            };
            if mesh.indices.is_empty() {
                continue;
            }
            let Some(scissor) = scissor_rect(clipped.clip_rect, scale, target_size) else {
                continue;
            };
            let first = indices.len() as u32;
            self.draws.push(OverlayDraw {
                texture: mesh.texture_id,
                indices: first..first + mesh.indices.len() as u32,
                base_vertex: vertices.len() as i32,
                scissor,
            });
            vertices.extend(mesh.vertices.iter().map(OverlayVertex::from));
            indices.extend_from_slice(&mesh.indices);
        }
        if self.draws.is_empty() {
            return;
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&indices);
        if vertex_bytes.len() as u64 > self.vertex_buffer.size() {
            self.vertex_buffer = geometry_buffer(
                device,
                "Overlay Vertices",
                wgpu::BufferUsages::VERTEX,
                (vertex_bytes.len() as u64).next_power_of_two(),
            );
        }
        if index_bytes.len() as u64 > self.index_buffer.size() {
            self.index_buffer = geometry_buffer(
                device,
                "Overlay Indices",
                wgpu::BufferUsages::INDEX,
                (index_bytes.len() as u64).next_power_of_two(),
            );
        }
        queue.write_buffer(&self.vertex_buffer, 0, vertex_bytes);
        queue.write_buffer(&self.index_buffer, 0, index_bytes);
    }

    /// Records the prepared draws into a pass targeting the surface.
    pub fn paint(&self, pass: &mut wgpu::RenderPass<'_>) -> u32 {
        if self.draws.is_empty() {
            return 0;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        let mut draw_calls = 0;
        for draw in &self.draws {
            let Some(texture) = self.textures.get(&draw.texture) else {
                log::warn!("Overlay mesh references missing texture {:?}.", draw.texture);
                continue;
            };
            let [x, y, width, height] = draw.scissor;
            pass.set_scissor_rect(x, y, width, height);
            pass.set_bind_group(1, &texture.bind_group, &[]);
            pass.draw_indexed(draw.indices.clone(), draw.base_vertex, 0..1);
            draw_calls += 1;
        }
        draw_calls
    }

    fn texture_bind_group(
        &self,
        device: &wgpu::Device,
        texture: &wgpu::Texture,
        options: &egui::TextureOptions,
    ) -> wgpu::BindGroup {
        let address_mode = options.wrap_mode.into_wgpu();
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Overlay Sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: options.magnification.into_wgpu(),
            min_filter: options.minification.into_wgpu(),
            ..Default::default()
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }
}

fn geometry_buffer(device: &wgpu::Device, label: &str, usage: wgpu::BufferUsages, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: super::conversions::align_to(size.max(4), wgpu::COPY_BUFFER_ALIGNMENT),
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Converts a clip rectangle in points to a scissor rectangle in pixels,
/// clamped to the target. `None` when nothing of it is visible.
fn scissor_rect(clip: egui::Rect, scale: f32, target: (u32, u32)) -> Option<[u32; 4]> {
    let min_x = ((clip.min.x * scale).round().max(0.0) as u32).min(target.0);
    let min_y = ((clip.min.y * scale).round().max(0.0) as u32).min(target.1);
    let max_x = ((clip.max.x * scale).round().max(0.0) as u32).min(target.0);
    let max_y = ((clip.max.y * scale).round().max(0.0) as u32).min(target.1);
    let width = max_x.saturating_sub(min_x);
    let height = max_y.saturating_sub(min_y);
    (width > 0 && height > 0).then_some([min_x, min_y, width, height])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scissor_scales_points_to_pixels() {
        let clip = egui::Rect::from_min_max(egui::pos2(10.0, 20.0), egui::pos2(110.0, 70.0));
        assert_eq!(scissor_rect(clip, 2.0, (1000, 1000)), Some([20, 40, 200, 100]));
    }

    #[test]
    fn scissor_is_clamped_to_target() {
        let clip = egui::Rect::from_min_max(egui::pos2(-5.0, -5.0), egui::pos2(500.0, 500.0));
        assert_eq!(scissor_rect(clip, 1.0, (200, 100)), Some([0, 0, 200, 100]));
    }

    #[test]
    fn offscreen_clip_is_skipped() {
        let clip = egui::Rect::from_min_max(egui::pos2(300.0, 0.0), egui::pos2(400.0, 50.0));
        assert_eq!(scissor_rect(clip, 1.0, (200, 100)), None);
        assert_eq!(scissor_rect(egui::Rect::NOTHING, 1.0, (200, 100)), None);
    }

    #[test]
    fn vertex_keeps_premultiplied_color() {
        let v = egui::epaint::Vertex {
            pos: egui::pos2(1.0, 2.0),
            uv: egui::pos2(0.5, 0.25),
            color: egui::Color32::from_rgba_premultiplied(10, 20, 30, 40),
        };
        let out = OverlayVertex::from(&v);
        assert_eq!(out.pos, [1.0, 2.0]);
        assert_eq!(out.uv, [0.5, 0.25]);
        assert_eq!(out.color, [10, 20, 30, 40]);
        assert_eq!(std::mem::size_of::<OverlayVertex>(), 20);
    }
}
