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

//! The concrete, WGPU-based implementation of the `RenderSystem` trait.

use super::context::WgpuGraphicsContext;
use super::conversions::{physical_size, IntoWgpu};
use super::egui_painter::{OverlayFrame, OverlayPainter};
use super::pipelines::ScenePipelines;
use super::resources::{DrawItem, GpuResources};
use super::targets::{RenderTargets, ShadowMap};
use super::uniforms::ToneMapUniforms;
use plinth_core::platform::{ViewerWindow, ViewerWindowHandle};
use plinth_core::renderer::{
    FrameInput, RenderError, RenderStats, RenderSystem, ResourceError, ShaderError, ShadowSettings,
};
use plinth_core::Stopwatch;
use std::fmt;

/// Attempts at acquiring a swapchain image before giving up on a frame.
const MAX_ACQUIRE_ATTEMPTS: u32 = 2;

/// Everything that only exists once a device is up.
#[derive(Debug)]
struct GpuState {
    context: WgpuGraphicsContext,
    pipelines: ScenePipelines,
    resources: GpuResources,
    targets: RenderTargets,
    shadow_map: ShadowMap,
    tonemap_uniforms: wgpu::Buffer,
    overlay: OverlayPainter,
}

/// The concrete, WGPU-based implementation of the [`RenderSystem`] trait.
///
/// Draws the scene into a multisampled HDR target, tone maps it onto the
/// window surface, then paints the debug overlay on top. Sizes handed to
/// [`RenderSystem::resize`] are logical; the surface is configured at that
/// size times the pixel ratio.
pub struct WgpuRenderSystem {
    state: Option<GpuState>,
    // Keeps the window alive for as long as the surface points at it.
    window: Option<ViewerWindowHandle>,
    logical_size: (u32, u32),
    pixel_ratio: f32,
    size_dirty: bool,
    frame_count: u64,
    last_frame_stats: RenderStats,
}

impl fmt::Debug for WgpuRenderSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WgpuRenderSystem")
            .field("state", &self.state)
            .field("window", &self.window.as_ref().map(|_| "ViewerWindowHandle(...)"))
            .field("logical_size", &self.logical_size)
            .field("pixel_ratio", &self.pixel_ratio)
            .field("size_dirty", &self.size_dirty)
            .field("frame_count", &self.frame_count)
            .field("last_frame_stats", &self.last_frame_stats)
            .finish()
    }
}

impl Default for WgpuRenderSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl WgpuRenderSystem {
    /// Creates a new, uninitialized `WgpuRenderSystem`.
    ///
    /// The system is not usable until [`RenderSystem::init`] is called.
    pub fn new() -> Self {
        log::info!("WgpuRenderSystem created (uninitialized).");
        Self {
            state: None,
            window: None,
            logical_size: (1, 1),
            pixel_ratio: 1.0,
            size_dirty: false,
            frame_count: 0,
            last_frame_stats: RenderStats::default(),
        }
    }

    /// The physical size frames are drawn at.
    pub fn render_size(&self) -> (u32, u32) {
        physical_size(self.logical_size, self.pixel_ratio)
    }

    /// The current pixel ratio.
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Name and backend of the adapter in use, once initialized.
    pub fn adapter_summary(&self) -> Option<String> {
        self.state.as_ref().map(|s| {
            format!(
                "{} ({:?}, {:?})",
                s.context.adapter_name, s.context.adapter_backend, s.context.adapter_device_type
            )
        })
    }

    async fn initialize(
        &mut self,
        window_handle: ViewerWindowHandle,
        surface_size: (u32, u32),
    ) -> Result<(), RenderError> {
        if self.state.is_some() {
            return Err(RenderError::InitializationFailed(
                "WgpuRenderSystem is already initialized.".to_string(),
            ));
        }
        log::info!("WgpuRenderSystem: Initializing...");

        let context = WgpuGraphicsContext::new(window_handle.clone(), surface_size)
            .await
            .map_err(|e| RenderError::InitializationFailed(e.to_string()))?;

        let device = &context.device;
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipelines = ScenePipelines::new(device, context.surface_format(), context.sample_count);
        let overlay = OverlayPainter::new(device, context.surface_format());
        if let Some(error) = scope.pop().await {
            return Err(ResourceError::Shader(ShaderError::CompilationError {
                label: "scene pipelines".to_string(),
                details: error.to_string(),
            })
            .into());
        }
        let resources = GpuResources::new(device, &context.queue, &pipelines);
        let tonemap_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Tone Map Uniforms"),
            size: std::mem::size_of::<ToneMapUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let targets = RenderTargets::new(
            device,
            context.get_size(),
            context.sample_count,
            &pipelines.tonemap_layout,
            &tonemap_uniforms,
        );
        let shadow_map = ShadowMap::new(device, ShadowSettings::default().map_size);

        self.state = Some(GpuState {
            context,
            pipelines,
            resources,
            targets,
            shadow_map,
            tonemap_uniforms,
            overlay,
        });
        self.window = Some(window_handle);
        log::info!("WgpuRenderSystem: Initialized at {}x{}.", surface_size.0, surface_size.1);
        Ok(())
    }

    /// Reconfigures the surface and size-dependent targets when the logical
    /// size or pixel ratio changed since the last frame.
    fn apply_pending_size(&mut self) {
        if !self.size_dirty {
            return;
        }
        self.size_dirty = false;
        let size = self.render_size();
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.context.get_size() == size && state.targets.size == size {
            return;
        }
        state.context.resize(size.0, size.1);
        state.targets = RenderTargets::new(
            &state.context.device,
            size,
            state.context.sample_count,
            &state.pipelines.tonemap_layout,
            &state.tonemap_uniforms,
        );
        log::info!(
            "WgpuRenderSystem: Render size is now {}x{} ({}x{} at ratio {}).",
            size.0,
            size.1,
            self.logical_size.0,
            self.logical_size.1,
            self.pixel_ratio
        );
    }
}

impl GpuState {
    /// Acquires the next swapchain image. `Ok(None)` means the frame should
    /// be skipped without error, e.g. while the window is occluded.
    fn acquire(&mut self) -> Result<Option<(wgpu::SurfaceTexture, bool)>, RenderError> {
        for attempt in 1..=MAX_ACQUIRE_ATTEMPTS {
            match self.context.get_current_texture() {
                wgpu::CurrentSurfaceTexture::Success(texture) => return Ok(Some((texture, false))),
                wgpu::CurrentSurfaceTexture::Suboptimal(texture) => {
                    log::debug!(
                        "WgpuRenderSystem: Suboptimal swapchain image; reconfiguring after present."
                    );
                    return Ok(Some((texture, true)));
                }
                wgpu::CurrentSurfaceTexture::Timeout => {
                    log::warn!("WgpuRenderSystem: Swapchain timeout acquiring frame; skipping it.");
                    return Ok(None);
                }
                wgpu::CurrentSurfaceTexture::Occluded => {
                    log::debug!("WgpuRenderSystem: Surface occluded; skipping frame.");
                    return Ok(None);
                }
                wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
                    let (width, height) = self.context.get_size();
                    log::warn!(
                        "WgpuRenderSystem: Swapchain surface lost or outdated (attempt {attempt}). Reconfiguring at {width}x{height}."
                    );
                    self.context.reconfigure();
                }
                wgpu::CurrentSurfaceTexture::Validation => {
                    return Err(RenderError::SurfaceAcquisitionFailed(
                        "validation error while acquiring the swapchain image".to_string(),
                    ));
                }
            }
        }
        Err(RenderError::SurfaceAcquisitionFailed(format!(
            "surface still lost or outdated after {MAX_ACQUIRE_ATTEMPTS} reconfigurations"
        )))
    }

    fn sync_shadow_map(&mut self, wanted: u32) {
        let wanted = wanted.clamp(1, self.context.device.limits().max_texture_dimension_2d);
        if self.shadow_map.size != wanted {
            self.shadow_map = ShadowMap::new(&self.context.device, wanted);
        }
    }

    /// Records every pass of the frame. Returns draw calls and triangles.
    fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        draws: &[DrawItem],
        frame: &FrameInput<'_>,
        has_overlay: bool,
    ) -> (u32, u32) {
        let resources = &self.resources;
        let mut draw_calls = 0u32;
        let mut triangles = 0u32;

        // --- Shadow pass ---
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            if frame.settings.shadows_enabled && frame.light.cast_shadow {
                pass.set_pipeline(&self.pipelines.shadow);
                pass.set_bind_group(0, &resources.shadow_frame_bind_group, &[]);
                for draw in draws.iter().filter(|d| d.cast_shadow) {
                    let Some((vertices, indices, count)) = resources.mesh(draw.mesh) else {
                        continue;
                    };
                    let offset = resources.object_offset(draw.object_index);
                    pass.set_bind_group(1, &resources.object_bind_group, &[offset]);
                    pass.set_vertex_buffer(0, vertices.slice(..));
                    pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..count, 0, 0..1);
                    draw_calls += 1;
                }
            }
        }

        // --- HDR scene pass ---
        if let Some(frame_bind_group) = resources.frame_bind_group() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(
                    self.targets.color_attachment(frame.settings.clear_color.into_wgpu()),
                )],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if frame.scene.environment.is_some() {
                pass.set_pipeline(&self.pipelines.skybox);
                pass.set_bind_group(0, frame_bind_group, &[]);
                pass.draw(0..3, 0..1);
                draw_calls += 1;
            }

            pass.set_bind_group(0, frame_bind_group, &[]);
            for draw in draws {
                let (Some((vertices, indices, count)), Some(material)) =
                    (resources.mesh(draw.mesh), resources.material(draw.material))
                else {
                    continue;
                };
                pass.set_pipeline(self.pipelines.pbr(draw.double_sided, draw.blend));
                let offset = resources.object_offset(draw.object_index);
                pass.set_bind_group(1, &resources.object_bind_group, &[offset]);
                pass.set_bind_group(2, material, &[]);
                pass.set_vertex_buffer(0, vertices.slice(..));
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..count, 0, 0..1);
                draw_calls += 1;
                triangles += count / 3;
            }
        }

        // --- Tone map onto the surface ---
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Tone Map Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: surface_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.pipelines.tonemap);
            pass.set_bind_group(0, &self.targets.tonemap_bind_group, &[]);
            pass.draw(0..3, 0..1);
            draw_calls += 1;
        }

        // --- Overlay ---
        if has_overlay {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: surface_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            draw_calls += self.overlay.paint(&mut pass);
        }

        (draw_calls, triangles)
    }
}

impl RenderSystem for WgpuRenderSystem {
    fn init(&mut self, window: &dyn ViewerWindow) -> Result<(), RenderError> {
        let surface_size = window.inner_size();
        let ratio = window.scale_factor() as f32;
        self.pixel_ratio = if ratio > 0.0 { ratio } else { 1.0 };
        self.logical_size = (
            ((surface_size.0 as f32 / self.pixel_ratio).round() as u32).max(1),
            ((surface_size.1 as f32 / self.pixel_ratio).round() as u32).max(1),
        );
        let handle = window.clone_handle_arc();
        pollster::block_on(self.initialize(handle, self.render_size()))
    }

    fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == 0 || new_height == 0 {
            log::warn!(
                "WgpuRenderSystem::resize called with zero size ({new_width}, {new_height}). Ignoring."
            );
            return;
        }
        if self.logical_size != (new_width, new_height) {
            log::debug!("WgpuRenderSystem: Logical size {new_width}x{new_height} requested.");
            self.logical_size = (new_width, new_height);
            self.size_dirty = true;
        }
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        if !(ratio.is_finite() && ratio > 0.0) {
            log::warn!("WgpuRenderSystem: Ignoring invalid pixel ratio {ratio}.");
            return;
        }
        if (self.pixel_ratio - ratio).abs() > f32::EPSILON {
            log::debug!("WgpuRenderSystem: Pixel ratio {ratio} requested.");
            self.pixel_ratio = ratio;
            self.size_dirty = true;
        }
    }

    fn render(&mut self, frame: &FrameInput<'_>) -> Result<RenderStats, RenderError> {
        let full_frame_timer = Stopwatch::new();
        self.apply_pending_size();
        let pixel_ratio = self.pixel_ratio;
        let state = self.state.as_mut().ok_or(RenderError::NotInitialized)?;
        if state.context.is_device_lost() {
            return Err(RenderError::DeviceLost);
        }

        if let Err(e) = state.context.device.poll(wgpu::PollType::Poll) {
            log::warn!("WgpuRenderSystem: Device poll failed: {e}");
        }

        state.sync_shadow_map(frame.light.shadow.map_size);

        // --- 1. Upload scene data and uniforms ---
        let draws = state.resources.prepare(
            &state.context.device,
            &state.context.queue,
            &state.pipelines,
            &state.shadow_map,
            frame,
        );
        let surface_format = state.context.surface_format();
        let tonemap = ToneMapUniforms {
            operator: frame.settings.tone_mapping.shader_index(),
            exposure: frame.settings.exposure,
            encode_srgb: (!surface_format.is_srgb()) as u32,
            _pad: 0,
        };
        state
            .context
            .queue
            .write_buffer(&state.tonemap_uniforms, 0, bytemuck::bytes_of(&tonemap));

        let overlay = frame.overlay.and_then(|o| o.downcast_ref::<OverlayFrame>());
        if let Some(overlay) = overlay {
            state
                .overlay
                .update_textures(&state.context.device, &state.context.queue, &overlay.textures_delta);
            state.overlay.prepare(
                &state.context.device,
                &state.context.queue,
                &overlay.primitives,
                state.context.get_size(),
                pixel_ratio,
                surface_format.is_srgb(),
            );
        }
        let preparation_ms = full_frame_timer.elapsed_ms_f32();

        // --- 2. Acquire Frame from Swap Chain ---
        // Uploads above still count when the frame is skipped, so material
        // updates and overlay textures are never lost.
        let Some((surface_texture, suboptimal)) = state.acquire()? else {
            if let Some(overlay) = overlay {
                state.overlay.free_textures(&overlay.textures_delta);
            }
            return Ok(self.last_frame_stats.clone());
        };

        // --- 3. Encode and submit ---
        let submission_timer = Stopwatch::new();
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = state
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Plinth Frame Encoder"),
            });
        let (draw_calls, triangles) =
            state.encode(&mut encoder, &surface_view, &draws, frame, overlay.is_some());
        state.context.queue.submit(std::iter::once(encoder.finish()));

        // --- 4. Present ---
        surface_texture.present();
        if suboptimal {
            state.context.reconfigure();
        }
        if let Some(overlay) = overlay {
            state.overlay.free_textures(&overlay.textures_delta);
        }

        // --- 5. Update frame statistics ---
        self.frame_count += 1;
        self.last_frame_stats = RenderStats {
            frame_number: self.frame_count,
            cpu_preparation_time_ms: preparation_ms,
            cpu_render_submission_time_ms: submission_timer.elapsed_ms_f32(),
            draw_calls,
            triangles_rendered: triangles,
        };
        log::trace!("WgpuRenderSystem: {:?}", self.last_frame_stats);
        Ok(self.last_frame_stats.clone())
    }

    fn last_frame_stats(&self) -> &RenderStats {
        &self.last_frame_stats
    }

    fn shutdown(&mut self) {
        log::info!("WgpuRenderSystem shutting down...");
        if let Some(state) = self.state.take() {
            if let Err(e) = state.context.device.poll(wgpu::PollType::wait_indefinitely()) {
                log::warn!("WgpuRenderSystem: Final device poll failed: {e}");
            }
        }
        self.window = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_render_reports_not_initialized() {
        let mut system = WgpuRenderSystem::new();
        let scene = plinth_core::scene::Scene::new();
        let camera = plinth_core::camera::PerspectiveCamera::default();
        let light = plinth_core::renderer::DirectionalLight::default();
        let settings = plinth_core::renderer::RenderSettings::default();
        let frame = FrameInput {
            scene: &scene,
            camera: &camera,
            light: &light,
            settings: &settings,
            overlay: None,
        };
        assert!(matches!(system.render(&frame), Err(RenderError::NotInitialized)));
    }

    #[test]
    fn resize_and_ratio_drive_render_size() {
        let mut system = WgpuRenderSystem::new();
        system.resize(800, 600);
        system.set_pixel_ratio(2.0);
        assert_eq!(system.render_size(), (1600, 1200));
        system.set_pixel_ratio(1.5);
        assert_eq!(system.render_size(), (1200, 900));
    }

    #[test]
    fn invalid_sizes_are_ignored() {
        let mut system = WgpuRenderSystem::new();
        system.resize(640, 480);
        system.resize(0, 480);
        system.set_pixel_ratio(0.0);
        system.set_pixel_ratio(f32::NAN);
        assert_eq!(system.render_size(), (640, 480));
        assert_eq!(system.pixel_ratio(), 1.0);
    }
}
