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

//! Rolling frame-rate measurement.

use std::collections::VecDeque;
use std::time::Instant;

/// A point-in-time summary of recent frame timing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameSnapshot {
    /// Frames per second over the window.
    pub fps: f32,
    /// Average time between frames over the window, in milliseconds.
    pub frame_time_ms: f32,
    /// Frames recorded since the counter was created.
    pub total_frames: u64,
}

/// Counts frames over a sliding time window.
///
/// Timestamps are seconds since the counter was created. Frames older than
/// the window are forgotten on the next record.
#[derive(Debug)]
pub struct PerformanceCounter {
    origin: Instant,
    window_secs: f64,
    timestamps: VecDeque<f64>,
    total_frames: u64,
}

impl PerformanceCounter {
    /// A counter with a one-second window.
    pub fn new() -> Self {
        Self::with_window(1.0)
    }

    /// A counter with a custom window length in seconds.
    pub fn with_window(window_secs: f64) -> Self {
        Self {
            origin: Instant::now(),
            window_secs: window_secs.max(f64::EPSILON),
            timestamps: VecDeque::new(),
            total_frames: 0,
        }
    }

    /// Records a frame now.
    pub fn record_frame(&mut self) {
        let now = self.origin.elapsed().as_secs_f64();
        self.record_frame_at(now);
    }

    /// Records a frame at an explicit timestamp.
    pub fn record_frame_at(&mut self, now_secs: f64) {
        if let Some(&last) = self.timestamps.back() {
            if now_secs < last {
                log::warn!("Frame timestamp went backwards ({now_secs} < {last}); ignored.");
                return;
            }
        }
        self.timestamps.push_back(now_secs);
        self.total_frames += 1;
        while let Some(&front) = self.timestamps.front() {
            if now_secs - front > self.window_secs {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Frames per second over the window. Zero until two frames are known.
    pub fn fps(&self) -> f32 {
        match self.span() {
            Some((frames, secs)) if secs > 0.0 => (frames as f64 / secs) as f32,
            _ => 0.0,
        }
    }

    /// Mean frame interval in milliseconds. Zero until two frames are known.
    pub fn average_frame_time_ms(&self) -> f32 {
        match self.span() {
            Some((frames, secs)) if frames > 0 => (secs * 1000.0 / frames as f64) as f32,
            _ => 0.0,
        }
    }

    /// Total frames recorded.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Current values.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            fps: self.fps(),
            frame_time_ms: self.average_frame_time_ms(),
            total_frames: self.total_frames,
        }
    }

    /// Number of intervals in the window and their total duration.
    fn span(&self) -> Option<(usize, f64)> {
        let first = *self.timestamps.front()?;
        let last = *self.timestamps.back()?;
        let intervals = self.timestamps.len().checked_sub(1)?;
        (intervals > 0).then_some((intervals, last - first))
    }
}

impl Default for PerformanceCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_counter_reports_zero() {
        let counter = PerformanceCounter::new();
        assert_eq!(counter.snapshot(), FrameSnapshot::default());
    }

    #[test]
    fn steady_sixty_hz() {
        let mut counter = PerformanceCounter::new();
        for i in 0..=60 {
            counter.record_frame_at(i as f64 / 60.0);
        }
        assert_relative_eq!(counter.fps(), 60.0, epsilon = 0.01);
        assert_relative_eq!(counter.average_frame_time_ms(), 16.666, epsilon = 0.01);
        assert_eq!(counter.total_frames(), 61);
    }

    #[test]
    fn old_frames_leave_the_window() {
        let mut counter = PerformanceCounter::new();
        for i in 0..10 {
            counter.record_frame_at(i as f64 * 0.01);
        }
        // A long stall: only the latest frame and nothing within a second of it.
        counter.record_frame_at(5.0);
        assert_eq!(counter.fps(), 0.0);
        counter.record_frame_at(5.5);
        assert_relative_eq!(counter.fps(), 2.0);
        assert_eq!(counter.total_frames(), 12);
    }

    #[test]
    fn backwards_timestamp_is_ignored() {
        let mut counter = PerformanceCounter::new();
        counter.record_frame_at(1.0);
        counter.record_frame_at(0.5);
        assert_eq!(counter.total_frames(), 1);
    }
}
