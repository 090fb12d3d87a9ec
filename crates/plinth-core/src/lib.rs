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

//! # Plinth Core
//!
//! Foundational crate containing the math, scene graph, camera, and the
//! interface contracts (renderer, window, clock) the rest of the viewer is
//! built on. Nothing here touches the GPU or the OS.

#![warn(missing_docs)]

pub mod asset;
pub mod camera;
pub mod event;
pub mod math;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod utils;

pub use utils::timer::{Clock, ManualClock, MonotonicClock, Stopwatch};
