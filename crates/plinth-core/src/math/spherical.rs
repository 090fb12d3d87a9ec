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

//! Spherical coordinates around the Y (up) axis.

use super::{Vec3, EPSILON, PI};

/// A point expressed as radius, polar angle from +Y (`phi`), and azimuth
/// around Y measured from +Z towards +X (`theta`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    /// Distance from the origin.
    pub radius: f32,
    /// Polar angle in `[0, PI]`, zero pointing straight up.
    pub phi: f32,
    /// Azimuthal angle.
    pub theta: f32,
}

impl Spherical {
    /// Creates a new set of spherical coordinates.
    #[inline]
    pub const fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    /// Converts a cartesian offset into spherical coordinates.
    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius < EPSILON {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self::new(radius, (v.y / radius).clamp(-1.0, 1.0).acos(), v.x.atan2(v.z))
    }

    /// Converts back into a cartesian offset.
    pub fn to_vec3(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keeps `phi` away from the poles, where the view basis degenerates.
    pub fn make_safe(&mut self) {
        const POLE: f32 = 1e-6;
        self.phi = self.phi.clamp(POLE, PI - POLE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn camera_start_position_round_trips() {
        let v = Vec3::splat(8.0);
        let s = Spherical::from_vec3(v);
        assert_relative_eq!(s.radius, v.length(), epsilon = 1e-5);
        assert_relative_eq!(s.theta, std::f32::consts::FRAC_PI_4, epsilon = 1e-6);
        let back = s.to_vec3();
        assert_relative_eq!(back.x, 8.0, epsilon = 1e-4);
        assert_relative_eq!(back.y, 8.0, epsilon = 1e-4);
        assert_relative_eq!(back.z, 8.0, epsilon = 1e-4);
    }

    #[test]
    fn make_safe_clamps_poles() {
        let mut s = Spherical::new(1.0, 0.0, 0.0);
        s.make_safe();
        assert!(s.phi > 0.0);
        s.phi = 4.0;
        s.make_safe();
        assert!(s.phi < PI);
    }
}
