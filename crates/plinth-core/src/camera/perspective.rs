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

use crate::math::{degrees_to_radians, Mat4, Vec3};

/// A perspective camera looking at a target point.
///
/// The projection is derived from the fields on every call, so changing the
/// aspect ratio or field of view needs no explicit refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Viewport width over height.
    pub aspect_ratio: f32,
    /// Distance to the near clipping plane.
    pub z_near: f32,
    /// Distance to the far clipping plane.
    pub z_far: f32,
    /// Eye position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// World up direction.
    pub up: Vec3,
}

impl PerspectiveCamera {
    /// Creates a camera at `position` looking at the origin.
    pub fn new(fov_y_degrees: f32, aspect_ratio: f32, z_near: f32, z_far: f32, position: Vec3) -> Self {
        Self {
            fov_y_degrees,
            aspect_ratio,
            z_near,
            z_far,
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    /// Updates the aspect ratio, typically called when the window is resized.
    /// A zero height is ignored.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    /// Vertical field of view in radians.
    pub fn fov_y_radians(&self) -> f32 {
        degrees_to_radians(self.fov_y_degrees)
    }

    /// World-to-view transform. Falls back to identity when the eye sits on
    /// the target.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up).unwrap_or(Mat4::IDENTITY)
    }

    /// View-to-clip transform with a `[0, 1]` depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_zo(self.fov_y_radians(), self.aspect_ratio, self.z_near, self.z_far)
    }

    /// `projection * view`.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit vector from the eye towards the target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(75.0, 1.0, 0.1, 100.0, Vec3::new(8.0, 8.0, 8.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_viewer_setup() {
        let camera = PerspectiveCamera::default();
        assert_eq!(camera.fov_y_degrees, 75.0);
        assert_eq!(camera.z_near, 0.1);
        assert_eq!(camera.z_far, 100.0);
        assert_eq!(camera.position, Vec3::new(8.0, 8.0, 8.0));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn aspect_ratio_is_exact_quotient() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect_ratio(1920, 1080);
        assert_eq!(camera.aspect_ratio, 1920.0 / 1080.0);
    }

    #[test]
    fn zero_height_is_ignored() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect_ratio(1920, 0);
        assert_eq!(camera.aspect_ratio, 1.0);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = PerspectiveCamera::default();
        let clip = camera.view_projection_matrix()
            * crate::math::Vec4::from_vec3(camera.target, 1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }
}
