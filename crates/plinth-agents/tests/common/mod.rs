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

//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use plinth_agents::{FrameScheduler, RenderLoop, ViewerWorld, WorldSettings};
use plinth_core::platform::ViewerWindow;
use plinth_core::renderer::{FrameInput, RenderError, RenderStats, RenderSystem};
use plinth_core::scene::{Material, Mesh, MeshNode, Node, StandardMaterial};
use plinth_core::math::Vec3;
use plinth_core::ManualClock;
use plinth_io::AssetEvent;
use plinth_telemetry::TelemetryService;
use std::sync::Arc;
use std::time::Duration;

/// Records every call instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub draws: usize,
    pub model_seen: Vec<bool>,
    pub size: Option<(u32, u32)>,
    pub pixel_ratio: Option<f32>,
    pub fail_from_draw: Option<usize>,
    stats: RenderStats,
}

impl RecordingRenderer {
    /// A renderer whose `n`th draw and every later one fail.
    pub fn failing_from(n: usize) -> Self {
        Self {
            fail_from_draw: Some(n),
            ..Self::default()
        }
    }
}

impl RenderSystem for RecordingRenderer {
    fn init(&mut self, _window: &dyn ViewerWindow) -> Result<(), RenderError> {
        Ok(())
    }

    fn resize(&mut self, new_width: u32, new_height: u32) {
        self.size = Some((new_width, new_height));
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = Some(ratio);
    }

    fn render(&mut self, frame: &FrameInput<'_>) -> Result<RenderStats, RenderError> {
        self.draws += 1;
        if self.fail_from_draw.is_some_and(|n| self.draws >= n) {
            return Err(RenderError::DeviceLost);
        }
        self.model_seen.push(frame.scene.mesh_count() > 0);
        self.stats = RenderStats {
            frame_number: self.draws as u64,
            draw_calls: frame.scene.mesh_count() as u32,
            ..RenderStats::default()
        };
        Ok(self.stats.clone())
    }

    fn last_frame_stats(&self) -> &RenderStats {
        &self.stats
    }

    fn shutdown(&mut self) {}
}

/// Counts frame requests.
#[derive(Debug, Default)]
pub struct CountingScheduler {
    pub requests: usize,
}

impl FrameScheduler for CountingScheduler {
    fn request_next_frame(&mut self) {
        self.requests += 1;
    }
}

/// A world with default settings and the sending end of its asset channel.
pub fn world() -> (ViewerWorld, flume::Sender<AssetEvent>) {
    let (tx, rx) = flume::unbounded();
    (ViewerWorld::new(WorldSettings::default(), rx), tx)
}

/// A loop on a manual clock reading zero.
pub fn manual_loop() -> RenderLoop<ManualClock> {
    RenderLoop::with_clock(ManualClock::new(), TelemetryService::new(Duration::from_secs(3600)))
}

/// A one-triangle stand-in for the statue.
pub fn stub_model() -> Node {
    let mesh = Arc::new(Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], None, None, None));
    let mut root = Node::group(Some("stub"));
    root.add_child(Node::mesh(
        Some("stub-mesh"),
        MeshNode::new(mesh, Material::Standard(StandardMaterial::default())),
    ));
    root
}
