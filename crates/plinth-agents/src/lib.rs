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

//! The viewer's behaviour, independent of any window or GPU.
//!
//! [`ViewerWorld`] owns the scene, camera, light and settings. Asset
//! completions arrive over a channel and are applied by the world; the
//! [`RenderLoop`] drives one frame per tick against any [`RenderSystem`].
//!
//! [`RenderSystem`]: plinth_core::renderer::RenderSystem

#![warn(missing_docs)]

pub mod debug_agent;
pub mod render_agent;
pub mod scene_agent;
mod world;

pub use debug_agent::{DebugEdit, DebugParameters, ParamRange};
pub use render_agent::{FrameScheduler, RenderLoop, ResizeHandler, DEFAULT_MAX_PIXEL_RATIO};
pub use scene_agent::{update_all_materials, MaterialSettings, ModelPlacement, ModelSlot};
pub use world::{ViewerWorld, WorldSettings, ASSET_LOG_TARGET};
