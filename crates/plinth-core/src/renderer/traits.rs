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

use super::error::RenderError;
use super::light::DirectionalLight;
use super::tone_mapping::ToneMapping;
use crate::camera::PerspectiveCamera;
use crate::math::LinearRgba;
use crate::platform::ViewerWindow;
use crate::scene::Scene;
use std::any::Any;

/// Global settings that affect how a frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Operator used to bring the HDR target into display range.
    pub tone_mapping: ToneMapping,
    /// Multiplier applied before tone mapping.
    pub exposure: f32,
    /// Color used where neither the environment nor geometry covers a pixel.
    pub clear_color: LinearRgba,
    /// Master switch for the shadow pass.
    pub shadows_enabled: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            tone_mapping: ToneMapping::default(),
            exposure: 1.0,
            clear_color: LinearRgba::BLACK,
            shadows_enabled: true,
        }
    }
}

/// Everything the renderer reads to draw one frame.
pub struct FrameInput<'a> {
    /// The scene graph and environment.
    pub scene: &'a Scene,
    /// The viewpoint.
    pub camera: &'a PerspectiveCamera,
    /// The scene's directional light.
    pub light: &'a DirectionalLight,
    /// Global settings.
    pub settings: &'a RenderSettings,
    /// Backend-specific overlay draw data (the debug panel), if any.
    pub overlay: Option<&'a dyn Any>,
}

/// A collection of performance statistics for a single rendered frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderStats {
    /// A sequential counter for rendered frames.
    pub frame_number: u64,
    /// The CPU time spent in pre-render preparation (resource uploads, uniforms).
    pub cpu_preparation_time_ms: f32,
    /// The CPU time spent encoding and submitting command buffers.
    pub cpu_render_submission_time_ms: f32,
    /// The number of draw calls encoded for the frame.
    pub draw_calls: u32,
    /// The total number of triangles submitted for the frame.
    pub triangles_rendered: u32,
}

/// Trait representing a render system.
pub trait RenderSystem: std::fmt::Debug {
    /// Initialize the rendering system against a window.
    fn init(&mut self, window: &dyn ViewerWindow) -> Result<(), RenderError>;

    /// Resize the drawing surface. The size is logical; the backend draws at
    /// this size times the pixel ratio.
    fn resize(&mut self, new_width: u32, new_height: u32);

    /// Set the resolution scale applied to the drawing surface.
    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Draw the frame and present it.
    fn render(&mut self, frame: &FrameInput<'_>) -> Result<RenderStats, RenderError>;

    /// Get the stats of the last rendered frame.
    fn last_frame_stats(&self) -> &RenderStats;

    /// Clean up and release the resources of the rendering system.
    fn shutdown(&mut self);
}
