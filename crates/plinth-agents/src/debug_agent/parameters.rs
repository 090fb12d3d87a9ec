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

use plinth_core::renderer::ToneMapping;
use std::f32::consts::{FRAC_PI_2, PI};

/// Bounds and granularity of one adjustable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
    /// Slider increment.
    pub step: f32,
}

impl ParamRange {
    /// Creates a range.
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Clamps `value` into the range. NaN maps to `min`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

/// Every value the debug panel exposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugParameters {
    /// Global environment reflection strength.
    pub env_map_intensity: f32,
    /// Model rotation about +Y.
    pub model_yaw: f32,
    /// Directional light intensity.
    pub light_intensity: f32,
    /// Light position, x component.
    pub light_x: f32,
    /// Light position, y component.
    pub light_y: f32,
    /// Light position, z component.
    pub light_z: f32,
    /// Active tone-mapping operator.
    pub tone_mapping: ToneMapping,
    /// Whether the panel is shown.
    pub visible: bool,
}

impl DebugParameters {
    /// Range of [`Self::env_map_intensity`].
    pub const ENV_MAP_INTENSITY: ParamRange = ParamRange::new(0.0, 10.0, 0.001);
    /// Range of [`Self::model_yaw`].
    pub const MODEL_YAW: ParamRange = ParamRange::new(-PI, PI, 0.001);
    /// Range of [`Self::light_intensity`].
    pub const LIGHT_INTENSITY: ParamRange = ParamRange::new(0.0, 10.0, 0.001);
    /// Range of each light position component.
    pub const LIGHT_POSITION: ParamRange = ParamRange::new(-50.0, 50.0, 0.001);

    /// Flips panel visibility and returns the new state.
    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
}

impl Default for DebugParameters {
    fn default() -> Self {
        Self {
            env_map_intensity: 1.0,
            model_yaw: FRAC_PI_2,
            light_intensity: 3.0,
            light_x: 26.74,
            light_y: -24.204,
            light_z: -50.0,
            tone_mapping: ToneMapping::AcesFilmic,
            visible: false,
        }
    }
}

/// One change made through the debug panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugEdit {
    /// New environment intensity.
    EnvMapIntensity(f32),
    /// New model yaw.
    ModelYaw(f32),
    /// New light intensity.
    LightIntensity(f32),
    /// New light x position.
    LightX(f32),
    /// New light y position.
    LightY(f32),
    /// New light z position.
    LightZ(f32),
    /// New tone-mapping operator.
    ToneMapping(ToneMapping),
}

impl DebugEdit {
    /// Returns the edit with its value clamped to the parameter's range.
    pub fn clamped(self) -> Self {
        match self {
            DebugEdit::EnvMapIntensity(v) => {
                DebugEdit::EnvMapIntensity(DebugParameters::ENV_MAP_INTENSITY.clamp(v))
            }
            DebugEdit::ModelYaw(v) => DebugEdit::ModelYaw(DebugParameters::MODEL_YAW.clamp(v)),
            DebugEdit::LightIntensity(v) => {
                DebugEdit::LightIntensity(DebugParameters::LIGHT_INTENSITY.clamp(v))
            }
            DebugEdit::LightX(v) => DebugEdit::LightX(DebugParameters::LIGHT_POSITION.clamp(v)),
            DebugEdit::LightY(v) => DebugEdit::LightY(DebugParameters::LIGHT_POSITION.clamp(v)),
            DebugEdit::LightZ(v) => DebugEdit::LightZ(DebugParameters::LIGHT_POSITION.clamp(v)),
            DebugEdit::ToneMapping(t) => DebugEdit::ToneMapping(t),
        }
    }

    /// Writes the edit's value into `params`.
    pub fn write_to(self, params: &mut DebugParameters) {
        match self {
            DebugEdit::EnvMapIntensity(v) => params.env_map_intensity = v,
            DebugEdit::ModelYaw(v) => params.model_yaw = v,
            DebugEdit::LightIntensity(v) => params.light_intensity = v,
            DebugEdit::LightX(v) => params.light_x = v,
            DebugEdit::LightY(v) => params.light_y = v,
            DebugEdit::LightZ(v) => params.light_z = v,
            DebugEdit::ToneMapping(t) => params.tone_mapping = t,
        }
    }
}
