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

//! Periodic performance reporting.

use crate::metrics::{FrameSnapshot, PerformanceCounter};
use std::time::{Duration, Instant};

/// Owns the frame counter and decides when a report is due.
#[derive(Debug)]
pub struct TelemetryService {
    counter: PerformanceCounter,
    last_report: Instant,
    report_interval: Duration,
}

impl TelemetryService {
    /// Creates a service reporting every `report_interval`.
    pub fn new(report_interval: Duration) -> Self {
        Self {
            counter: PerformanceCounter::new(),
            last_report: Instant::now(),
            report_interval,
        }
    }

    /// Records one rendered frame.
    pub fn record_frame(&mut self) {
        self.counter.record_frame();
    }

    /// Should be called once per frame. Returns a snapshot when the report
    /// interval has passed since the previous one.
    pub fn tick(&mut self) -> Option<FrameSnapshot> {
        if self.last_report.elapsed() >= self.report_interval {
            self.last_report = Instant::now();
            let snapshot = self.counter.snapshot();
            log::trace!("Telemetry report due: {snapshot:?}");
            Some(snapshot)
        } else {
            None
        }
    }

    /// The underlying counter.
    pub fn counter(&self) -> &PerformanceCounter {
        &self.counter
    }
}

impl Default for TelemetryService {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
