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

//! The scene's single directional light and its shadow camera.

use crate::math::{LinearRgba, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Parameters of the orthographic shadow camera attached to a directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    /// Edge length of the square depth map, in texels.
    pub map_size: u32,
    /// Near plane of the shadow camera, measured from the light position.
    pub near: f32,
    /// Far plane of the shadow camera.
    pub far: f32,
    /// Half-size of the orthographic frustum.
    pub extent: f32,
    /// Depth bias subtracted before the shadow comparison.
    pub bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 2048,
            near: 5.0,
            far: 15.0,
            extent: 5.0,
            bias: 0.0,
        }
    }
}

/// A directional light source.
///
/// Unlike a pure direction, the light keeps a position and a target: the
/// direction is derived from the two and the shadow camera sits at the
/// position looking at the target.
///
/// # Examples
///
/// ```
/// use plinth_core::renderer::light::DirectionalLight;
/// use plinth_core::math::Vec3;
///
/// let mut light = DirectionalLight::default();
/// light.position = Vec3::new(0.0, 10.0, 0.0);
/// light.look_at(Vec3::ZERO);
/// assert_eq!(light.direction(), Vec3::new(0.0, -1.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// Illuminance multiplier.
    pub intensity: f32,
    /// Position of the light, used for the shadow camera.
    pub position: Vec3,
    /// Point the light shines towards.
    pub target: Vec3,
    /// Whether the light renders a shadow map.
    pub cast_shadow: bool,
    /// Shadow camera parameters.
    pub shadow: ShadowSettings,
}

impl DirectionalLight {
    /// Points the light at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Unit vector from the light towards its target. Straight down when the
    /// two coincide.
    pub fn direction(&self) -> Vec3 {
        let d = self.target - self.position;
        if d.length_squared() < f32::EPSILON {
            return Vec3::new(0.0, -1.0, 0.0);
        }
        d.normalize()
    }

    /// View transform of the shadow camera.
    pub fn shadow_view(&self) -> Mat4 {
        let direction = self.direction();
        let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let eye = self.target - direction * (self.target - self.position).length().max(1.0);
        Mat4::look_at_rh(eye, self.target, up).unwrap_or(Mat4::IDENTITY)
    }

    /// `orthographic * view` for rendering and sampling the shadow map.
    pub fn shadow_view_projection(&self) -> Mat4 {
        let e = self.shadow.extent;
        let projection =
            Mat4::orthographic_rh_zo(-e, e, -e, e, self.shadow.near, self.shadow.far);
        projection * self.shadow_view()
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::from_hex(0xffffff),
            intensity: 3.0,
            position: Vec3::new(26.74, -24.204, -50.0),
            target: Vec3::ZERO,
            cast_shadow: true,
            shadow: ShadowSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn default_points_at_origin() {
        let light = DirectionalLight::default();
        let expected = (Vec3::ZERO - light.position).normalize();
        assert_relative_eq!(light.direction().x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(light.direction().z, expected.z, epsilon = 1e-6);
        assert_eq!(light.shadow.map_size, 2048);
    }

    #[test]
    fn look_at_recomputes_direction() {
        let mut light = DirectionalLight::default();
        light.position = Vec3::new(10.0, 0.0, 0.0);
        light.look_at(Vec3::ZERO);
        assert_eq!(light.direction(), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn point_inside_shadow_range_maps_into_unit_depth() {
        let mut light = DirectionalLight::default();
        light.position = Vec3::new(0.0, 10.0, 0.0);
        light.look_at(Vec3::ZERO);
        // Ten units below the light, inside [near, far] = [5, 15].
        let clip = light.shadow_view_projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(clip.z, 0.5, epsilon = 1e-5);
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-5);
    }
}
