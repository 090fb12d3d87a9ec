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

//! HDR-to-display tone mapping operators.
//!
//! [`ToneMapping::apply`] is the CPU reference for the tone-map shader. Both
//! take linear input and return linear output in `[0, 1]`; sRGB encoding
//! happens afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A selectable tone-mapping operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToneMapping {
    /// Pass-through. Exposure is not applied.
    None,
    /// Exposure then clamp.
    Linear,
    /// `c / (1 + c)`.
    Reinhard,
    /// Fitted ACES reference rendering and output transforms.
    #[default]
    AcesFilmic,
    /// Hejl and Burgess-Dawson filmic curve.
    Cineon,
}

impl ToneMapping {
    /// All operators, in the order the debug panel lists them.
    pub const ALL: [ToneMapping; 5] = [
        ToneMapping::None,
        ToneMapping::Linear,
        ToneMapping::Reinhard,
        ToneMapping::AcesFilmic,
        ToneMapping::Cineon,
    ];

    /// The selector value the tone-map shader switches on.
    pub fn shader_index(self) -> u32 {
        match self {
            ToneMapping::None => 0,
            ToneMapping::Linear => 1,
            ToneMapping::Reinhard => 2,
            ToneMapping::Cineon => 3,
            ToneMapping::AcesFilmic => 4,
        }
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            ToneMapping::None => "None",
            ToneMapping::Linear => "Linear",
            ToneMapping::Reinhard => "Reinhard",
            ToneMapping::AcesFilmic => "ACESFilmic",
            ToneMapping::Cineon => "Cineon",
        }
    }

    /// Maps one linear HDR color to linear display range.
    pub fn apply(self, rgb: [f32; 3], exposure: f32) -> [f32; 3] {
        match self {
            ToneMapping::None => rgb,
            ToneMapping::Linear => rgb.map(|c| saturate(c * exposure)),
            ToneMapping::Reinhard => rgb.map(|c| {
                let c = c * exposure;
                saturate(c / (1.0 + c))
            }),
            ToneMapping::Cineon => rgb.map(|c| {
                let x = (c * exposure - 0.004).max(0.0);
                let mapped = (x * (6.2 * x + 0.5)) / (x * (6.2 * x + 1.7) + 0.06);
                mapped.powf(2.2)
            }),
            ToneMapping::AcesFilmic => aces_filmic(rgb, exposure),
        }
    }
}

impl fmt::Display for ToneMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn saturate(c: f32) -> f32 {
    c.clamp(0.0, 1.0)
}

// sRGB => XYZ => D65_2_D60 => AP1 => RRT_SAT, row-major.
const ACES_INPUT: [[f32; 3]; 3] = [
    [0.59719, 0.35458, 0.04823],
    [0.07600, 0.90834, 0.01566],
    [0.02840, 0.13383, 0.83777],
];

// ODT_SAT => XYZ => D60_2_D65 => sRGB, row-major.
const ACES_OUTPUT: [[f32; 3]; 3] = [
    [1.60475, -0.53108, -0.07367],
    [-0.10208, 1.10813, -0.00605],
    [-0.00327, -0.07276, 1.07602],
];

fn mul3(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    m.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}

fn rrt_and_odt_fit(v: f32) -> f32 {
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.4329510) + 0.238081;
    a / b
}

fn aces_filmic(rgb: [f32; 3], exposure: f32) -> [f32; 3] {
    let scaled = rgb.map(|c| c * exposure / 0.6);
    let fitted = mul3(&ACES_INPUT, scaled).map(rrt_and_odt_fit);
    mul3(&ACES_OUTPUT, fitted).map(saturate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_is_aces() {
        assert_eq!(ToneMapping::default(), ToneMapping::AcesFilmic);
    }

    #[test]
    fn shader_indices_are_distinct() {
        let mut seen: Vec<u32> = ToneMapping::ALL.iter().map(|t| t.shader_index()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), ToneMapping::ALL.len());
    }

    #[test]
    fn none_passes_through_hdr() {
        assert_eq!(ToneMapping::None.apply([4.0, 0.5, 0.0], 2.0), [4.0, 0.5, 0.0]);
    }

    #[test]
    fn linear_and_reinhard_clamp() {
        assert_eq!(ToneMapping::Linear.apply([0.25, 2.0, -1.0], 2.0), [0.5, 1.0, 0.0]);
        let r = ToneMapping::Reinhard.apply([1.0, 3.0, 0.0], 1.0);
        assert_relative_eq!(r[0], 0.5);
        assert_relative_eq!(r[1], 0.75);
        assert_eq!(r[2], 0.0);
    }

    #[test]
    fn filmic_curves_stay_in_range_and_are_monotonic() {
        for op in [ToneMapping::AcesFilmic, ToneMapping::Cineon] {
            let mut previous = -1.0;
            for i in 0..64 {
                let c = i as f32 * 0.25;
                let out = op.apply([c, c, c], 1.0);
                assert!(out.iter().all(|v| (0.0..=1.0).contains(v)), "{op} out of range at {c}");
                assert!(out[1] >= previous, "{op} not monotonic at {c}");
                previous = out[1];
            }
        }
    }

    #[test]
    fn black_stays_black() {
        for op in ToneMapping::ALL {
            let out = op.apply([0.0; 3], 1.0);
            assert!(out.iter().all(|v| *v < 1e-3), "{op} lifted black to {out:?}");
        }
    }
}
