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

//! Mouse-driven orbit camera controls with optional damping.
//!
//! Input handlers only accumulate deltas. [`OrbitControls::update`] applies
//! them to the camera once per frame, and with damping enabled the deltas
//! decay geometrically so the camera keeps gliding after the mouse stops.

use super::PerspectiveCamera;
use crate::math::{Spherical, Vec2, Vec3, PI, TAU};
use crate::platform::{InputEvent, MouseButton};

/// Squared distance under which a camera move counts as no move.
const MOVE_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    None,
    Rotate,
    Pan,
}

/// Orbits a [`PerspectiveCamera`] around its target.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Smooth camera motion over successive frames.
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per update when damping.
    pub damping_factor: f32,
    /// Multiplier on drag-to-rotate.
    pub rotate_speed: f32,
    /// Multiplier on wheel zoom.
    pub zoom_speed: f32,
    /// Multiplier on drag-to-pan.
    pub pan_speed: f32,
    /// Closest allowed distance to the target.
    pub min_distance: f32,
    /// Farthest allowed distance to the target.
    pub max_distance: f32,
    /// Lower bound of the polar angle, in radians.
    pub min_polar_angle: f32,
    /// Upper bound of the polar angle, in radians.
    pub max_polar_angle: f32,

    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
    /// Pan gesture in viewport-height units, resolved against the camera in `update`.
    pending_pan: Vec2,
    drag: DragState,
    last_cursor: Option<Vec2>,
}

impl OrbitControls {
    /// Controls with damping enabled at `damping_factor`.
    pub fn with_damping(damping_factor: f32) -> Self {
        Self {
            enable_damping: true,
            damping_factor,
            ..Self::default()
        }
    }

    /// Feeds one input event. `viewport` is the physical window size.
    ///
    /// Returns true if the event was consumed by the controls.
    pub fn handle_input(&mut self, event: &InputEvent, viewport: (u32, u32)) -> bool {
        let height = viewport.1.max(1) as f32;
        match event {
            InputEvent::MouseButtonPressed { button } => {
                self.drag = match button {
                    MouseButton::Left => DragState::Rotate,
                    MouseButton::Right | MouseButton::Middle => DragState::Pan,
                    _ => return false,
                };
                true
            }
            InputEvent::MouseButtonReleased { .. } => {
                let was_dragging = self.drag != DragState::None;
                self.drag = DragState::None;
                was_dragging
            }
            InputEvent::MouseMoved { x, y } => {
                let cursor = Vec2::new(*x, *y);
                let previous = self.last_cursor.replace(cursor);
                let Some(previous) = previous else {
                    return false;
                };
                let delta = cursor - previous;
                match self.drag {
                    DragState::Rotate => {
                        self.rotate_left(TAU * delta.x / height * self.rotate_speed);
                        self.rotate_up(TAU * delta.y / height * self.rotate_speed);
                        true
                    }
                    DragState::Pan => {
                        self.pending_pan = self.pending_pan + delta * (self.pan_speed / height);
                        true
                    }
                    DragState::None => false,
                }
            }
            InputEvent::MouseWheelScrolled { delta_y, .. } => {
                if *delta_y > 0.0 {
                    self.scale *= self.zoom_scale();
                } else if *delta_y < 0.0 {
                    self.scale /= self.zoom_scale();
                } else {
                    return false;
                }
                true
            }
            InputEvent::CursorLeft => {
                self.last_cursor = None;
                self.drag = DragState::None;
                false
            }
            _ => false,
        }
    }

    /// Applies pending motion to `camera`. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let previous_position = camera.position;
        let previous_target = camera.target;

        self.resolve_pending_pan(camera);

        let offset = camera.position - camera.target;
        let mut spherical = Spherical::from_vec3(offset);

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();

        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.target += self.pan_offset * step;
        camera.position = camera.target + spherical.to_vec3();

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::new(0.0, 0.0, 0.0);
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let moved = (camera.position - previous_position).length_squared() > MOVE_EPSILON
            || (camera.target - previous_target).length_squared() > MOVE_EPSILON;
        if moved {
            log::trace!("Orbit camera moved to {:?}", camera.position);
        }
        moved
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Converts the accumulated screen-space pan into a world-space offset.
    /// The scale keeps the point under the cursor fixed at the target depth.
    fn resolve_pending_pan(&mut self, camera: &PerspectiveCamera) {
        if self.pending_pan == Vec2::ZERO {
            return;
        }
        let offset = camera.position - camera.target;
        let target_distance = offset.length() * (camera.fov_y_radians() * 0.5).tan();

        let forward = camera.forward();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);

        let pan = self.pending_pan * (2.0 * target_distance);
        self.pan_offset += right * -pan.x;
        self.pan_offset += up * pan.y;
        self.pending_pan = Vec2::ZERO;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::new(0.0, 0.0, 0.0),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            pending_pan: Vec2::ZERO,
            drag: DragState::None,
            last_cursor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const VIEWPORT: (u32, u32) = (800, 600);

    fn drag(controls: &mut OrbitControls, button: MouseButton, from: (f32, f32), to: (f32, f32)) {
        controls.handle_input(&InputEvent::MouseMoved { x: from.0, y: from.1 }, VIEWPORT);
        controls.handle_input(&InputEvent::MouseButtonPressed { button }, VIEWPORT);
        controls.handle_input(&InputEvent::MouseMoved { x: to.0, y: to.1 }, VIEWPORT);
        controls.handle_input(&InputEvent::MouseButtonReleased { button }, VIEWPORT);
    }

    #[test]
    fn idle_update_does_not_move() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::with_damping(0.05);
        assert!(!controls.update(&mut camera));
        assert_relative_eq!(camera.position.x, 8.0, epsilon = 1e-4);
        assert_relative_eq!(camera.position.y, 8.0, epsilon = 1e-4);
    }

    #[test]
    fn rotation_keeps_distance_to_target() {
        let mut camera = PerspectiveCamera::default();
        let radius = camera.position.length();
        let mut controls = OrbitControls::default();
        drag(&mut controls, MouseButton::Left, (100.0, 100.0), (250.0, 130.0));
        assert!(controls.update(&mut camera));
        assert_relative_eq!(camera.position.length(), radius, epsilon = 1e-3);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::with_damping(0.05);
        drag(&mut controls, MouseButton::Left, (0.0, 0.0), (300.0, 0.0));

        let start = camera.position;
        assert!(controls.update(&mut camera));
        let first_step = (camera.position - start).length();
        let mid = camera.position;
        assert!(controls.update(&mut camera));
        let second_step = (camera.position - mid).length();
        assert!(second_step < first_step);
        assert!(second_step > 0.0);
    }

    #[test]
    fn wheel_up_moves_closer() {
        let mut camera = PerspectiveCamera::default();
        let before = camera.position.length();
        let mut controls = OrbitControls::default();
        let consumed = controls.handle_input(
            &InputEvent::MouseWheelScrolled {
                delta_x: 0.0,
                delta_y: 1.0,
            },
            VIEWPORT,
        );
        assert!(consumed);
        controls.update(&mut camera);
        assert_relative_eq!(camera.position.length(), before * 0.95, epsilon = 1e-3);
    }

    #[test]
    fn distance_is_clamped() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls {
            max_distance: 5.0,
            ..OrbitControls::default()
        };
        controls.update(&mut camera);
        assert_relative_eq!(camera.position.length(), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn polar_angle_never_reaches_the_pole() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::default();
        drag(&mut controls, MouseButton::Left, (0.0, 0.0), (0.0, 5000.0));
        controls.update(&mut camera);
        let offset = camera.position - camera.target;
        assert!(!offset.x.is_nan() && !offset.z.is_nan());
        assert!(offset.y > 0.0);
        assert_relative_eq!(offset.length(), Vec3::splat(8.0).length(), epsilon = 1e-3);
    }

    #[test]
    fn right_drag_pans_target() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::default();
        drag(&mut controls, MouseButton::Right, (100.0, 100.0), (200.0, 100.0));
        assert!(controls.update(&mut camera));
        assert!(camera.target.length() > 0.0);
        let offset = camera.position - camera.target;
        assert_relative_eq!(offset.length(), Vec3::splat(8.0).length(), epsilon = 1e-3);
    }

    #[test]
    fn movement_without_drag_is_not_consumed() {
        let mut controls = OrbitControls::default();
        assert!(!controls.handle_input(&InputEvent::MouseMoved { x: 1.0, y: 1.0 }, VIEWPORT));
        assert!(!controls.handle_input(&InputEvent::MouseMoved { x: 5.0, y: 1.0 }, VIEWPORT));
    }
}
