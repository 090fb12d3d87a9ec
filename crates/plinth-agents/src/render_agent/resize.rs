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

use crate::world::ViewerWorld;
use plinth_core::renderer::RenderSystem;

/// Upper bound on the pixel ratio passed to the renderer.
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

/// Reacts to viewport size changes.
#[derive(Debug, Clone, Copy)]
pub struct ResizeHandler {
    max_pixel_ratio: f32,
}

impl ResizeHandler {
    /// A handler capping the pixel ratio at `max_pixel_ratio`.
    pub fn new(max_pixel_ratio: f32) -> Self {
        Self {
            max_pixel_ratio: if max_pixel_ratio > 0.0 {
                max_pixel_ratio
            } else {
                DEFAULT_MAX_PIXEL_RATIO
            },
        }
    }

    /// The ratio the renderer receives for a given device pixel ratio.
    pub fn pixel_ratio(&self, device_pixel_ratio: f32) -> f32 {
        device_pixel_ratio.min(self.max_pixel_ratio)
    }

    /// Updates the camera and renderer for a logical viewport of
    /// `width` x `height`. Zero-sized viewports (minimised windows) are
    /// ignored; returns whether anything changed.
    pub fn on_resize(
        &self,
        world: &mut ViewerWorld,
        renderer: &mut dyn RenderSystem,
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
    ) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}.");
            return false;
        }
        let ratio = self.pixel_ratio(device_pixel_ratio);
        world.camera_mut().set_aspect_ratio(width, height);
        renderer.set_pixel_ratio(ratio);
        renderer.resize(width, height);
        log::debug!("Viewport resized to {width}x{height} at pixel ratio {ratio}.");
        true
    }
}

impl Default for ResizeHandler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PIXEL_RATIO)
    }
}
