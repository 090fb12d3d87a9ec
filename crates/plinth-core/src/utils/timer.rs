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

//! Clocks and timers.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A simple stopwatch for measuring CPU time spans.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Starts a new stopwatch.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since the stopwatch was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Elapsed time in fractional milliseconds.
    pub fn elapsed_ms_f32(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// A source of elapsed time, in seconds since the render loop started.
///
/// Implementations must be monotonic: successive calls never go backwards.
pub trait Clock {
    /// Seconds elapsed since the clock started.
    fn elapsed_seconds(&self) -> f64;
}

/// Wall-clock time based on [`Instant`].
///
/// The clock starts on its first reading, so time spent before the first
/// frame does not count.
#[derive(Debug, Clone, Default)]
pub struct MonotonicClock {
    start: Cell<Option<Instant>>,
}

impl MonotonicClock {
    /// A clock that has not started yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the clock has been read at least once.
    pub fn is_started(&self) -> bool {
        self.start.get().is_some()
    }
}

impl Clock for MonotonicClock {
    fn elapsed_seconds(&self) -> f64 {
        match self.start.get() {
            Some(start) => start.elapsed().as_secs_f64(),
            None => {
                self.start.set(Some(Instant::now()));
                0.0
            }
        }
    }
}

/// A clock that only moves when told to. Used to drive the loop
/// deterministically.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    /// A clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jumps to `seconds`. Earlier values are ignored to stay monotonic.
    pub fn set(&self, seconds: f64) {
        if seconds >= self.now.get() {
            self.now.set(seconds);
        } else {
            log::warn!(
                "ManualClock asked to go back from {} to {seconds}; ignoring.",
                self.now.get()
            );
        }
    }

    /// Moves forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        self.set(self.now.get() + seconds.max(0.0));
    }
}

impl Clock for ManualClock {
    fn elapsed_seconds(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_monotonic() {
        let clock = ManualClock::new();
        clock.set(4.0);
        clock.set(1.0);
        assert_eq!(clock.elapsed_seconds(), 4.0);
        clock.advance(0.5);
        assert_eq!(clock.elapsed_seconds(), 4.5);
    }

    #[test]
    fn monotonic_clock_moves_forward() {
        let clock = MonotonicClock::new();
        let a = clock.elapsed_seconds();
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.elapsed_seconds() > a);
    }

    #[test]
    fn monotonic_clock_starts_on_first_reading() {
        let clock = MonotonicClock::new();
        assert!(!clock.is_started());
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(clock.elapsed_seconds(), 0.0);
        assert!(clock.is_started());
        assert!(clock.elapsed_seconds() < 0.02);
    }

    #[test]
    fn stopwatch_measures() {
        let watch = Stopwatch::new();
        std::thread::sleep(Duration::from_millis(2));
        assert!(watch.elapsed_ms_f32() >= 2.0);
    }
}
