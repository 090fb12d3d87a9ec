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

use super::scheduler::FrameScheduler;
use crate::scene_agent::clear_material_updates;
use crate::world::ViewerWorld;
use plinth_core::renderer::{RenderError, RenderSystem};
use plinth_core::{Clock, MonotonicClock};
use plinth_telemetry::{FrameSnapshot, TelemetryService};
use std::any::Any;
use std::f64::consts::{PI, TAU};
use std::time::Duration;

/// Model rotation speed, in radians per second.
const YAW_RATE: f64 = PI / 4.0;

/// Drives one frame per tick.
///
/// Once a render fails the loop stops: it never schedules another frame and
/// later ticks do nothing.
#[derive(Debug)]
pub struct RenderLoop<C: Clock = MonotonicClock> {
    clock: C,
    telemetry: TelemetryService,
    running: bool,
}

impl RenderLoop<MonotonicClock> {
    /// A wall-clock loop reporting every `report_interval`. Animation time
    /// starts at the first tick.
    pub fn new(report_interval: Duration) -> Self {
        Self::with_clock(MonotonicClock::new(), TelemetryService::new(report_interval))
    }
}

impl<C: Clock> RenderLoop<C> {
    /// A loop driven by `clock`.
    pub fn with_clock(clock: C, telemetry: TelemetryService) -> Self {
        Self {
            clock,
            telemetry,
            running: true,
        }
    }

    /// Runs one frame with no overlay.
    pub fn tick(
        &mut self,
        world: &mut ViewerWorld,
        renderer: &mut dyn RenderSystem,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<(), RenderError> {
        self.tick_with_overlay(world, renderer, scheduler, None)
    }

    /// Runs one frame: apply finished loads, animate, update the camera, draw
    /// once, count the frame, then ask for the next one.
    pub fn tick_with_overlay(
        &mut self,
        world: &mut ViewerWorld,
        renderer: &mut dyn RenderSystem,
        scheduler: &mut dyn FrameScheduler,
        overlay: Option<&dyn Any>,
    ) -> Result<(), RenderError> {
        if !self.running {
            return Ok(());
        }

        world.drain_asset_events();

        let elapsed = self.clock.elapsed_seconds();
        world.set_model_yaw(model_yaw_at(elapsed));

        world.update_controls();

        if let Err(e) = renderer.render(&world.frame_input(overlay)) {
            log::error!("Render failed, stopping the render loop: {e}");
            self.running = false;
            return Err(e);
        }
        clear_material_updates(world.scene_mut());

        self.telemetry.record_frame();
        if let Some(snapshot) = self.telemetry.tick() {
            let stats = renderer.last_frame_stats();
            log::info!(
                "{:.1} fps ({:.2} ms), {} draw calls, {} triangles",
                snapshot.fps,
                snapshot.frame_time_ms,
                stats.draw_calls,
                stats.triangles_rendered
            );
        }

        scheduler.request_next_frame();
        log::trace!("Tick at {elapsed:.3}s done.");
        Ok(())
    }

    /// False once a render has failed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The clock driving the animation.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Frame timing as of the latest frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        self.telemetry.counter().snapshot()
    }
}

/// The model's yaw after `elapsed` seconds, wrapped into `[0, 2π)`.
pub fn model_yaw_at(elapsed: f64) -> f32 {
    (elapsed * YAW_RATE).rem_euclid(TAU) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn yaw_follows_wall_time() {
        assert_eq!(model_yaw_at(0.0), 0.0);
        assert_relative_eq!(model_yaw_at(2.0), FRAC_PI_2);
        assert_relative_eq!(model_yaw_at(4.0), std::f32::consts::PI);
        // One full turn every eight seconds.
        assert_relative_eq!(model_yaw_at(10.0), model_yaw_at(2.0), epsilon = 1e-5);
    }
}
