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

//! The renderer contract: what a backend must implement and what it is given
//! each frame. No GPU types appear here.

pub mod error;
pub mod light;
pub mod tone_mapping;
pub mod traits;

pub use self::error::{RenderError, ResourceError, ShaderError};
pub use self::light::{DirectionalLight, ShadowSettings};
pub use self::tone_mapping::ToneMapping;
pub use self::traits::{FrameInput, RenderSettings, RenderStats, RenderSystem};
