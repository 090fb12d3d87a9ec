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

use crate::math::{Euler, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// The local transform of a scene node: translation, Euler rotation, and scale.
///
/// Rotation is kept as Euler angles rather than a quaternion so that the yaw
/// can be written directly each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to the parent.
    pub translation: Vec3,
    /// Rotation relative to the parent.
    pub rotation: Euler,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Euler::ZERO,
        scale: Vec3::ONE,
    };

    /// Identity transform moved to `translation`.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Sets the same scale factor on all three axes.
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }

    /// The yaw (rotation around Y), in radians.
    pub fn yaw(&self) -> f32 {
        self.rotation.y
    }

    /// Overwrites the yaw, leaving pitch and roll as they are.
    pub fn set_yaw(&mut self, yaw: f32) {
        self.rotation.y = yaw;
    }

    /// Composes the local matrix as `T * R * S`.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation.to_quaternion(),
            self.translation,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matrix_applies_scale_before_translation() {
        let mut t = Transform::from_translation(Vec3::new(0.0, -6.0, 0.0));
        t.set_uniform_scale(60.0);
        let p = t.to_matrix().transform_point3(Vec3::new(0.0, 0.1, 0.0));
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn set_yaw_keeps_other_axes() {
        let mut t = Transform::IDENTITY;
        t.rotation = Euler::new(0.1, 0.2, 0.3);
        t.set_yaw(1.5);
        assert_eq!(t.rotation, Euler::new(0.1, 1.5, 0.3));
        assert_eq!(t.yaw(), 1.5);
    }
}
