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

//! 4x4 transformation matrices.

use super::{Quaternion, Vec3, Vec4, EPSILON};
use std::ops::Mul;

/// A 4x4 column-major matrix.
///
/// This is the primary type for model transforms as well as the camera and
/// shadow view/projection matrices. The column-major layout matches WGSL's
/// `mat4x4<f32>`, so values can be uploaded without transposition.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[3]` holds the translation.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns a row of the matrix.
    #[inline]
    pub fn row(&self, index: usize) -> Vec4 {
        Vec4::new(
            self.cols[0].get(index),
            self.cols[1].get(index),
            self.cols[2].get(index),
            self.cols[3].get(index),
        )
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = Vec4::from_vec3(v, 1.0);
        m
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(s: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(s.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, s.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, s.z, 0.0),
            Vec4::W,
        )
    }

    /// Creates a rotation matrix from a unit quaternion.
    pub fn from_quat(q: Quaternion) -> Self {
        let (x2, y2, z2) = (q.x + q.x, q.y + q.y, q.z + q.z);
        let (xx, xy, xz) = (q.x * x2, q.x * y2, q.x * z2);
        let (yy, yz, zz) = (q.y * y2, q.y * z2, q.z * z2);
        let (wx, wy, wz) = (q.w * x2, q.w * y2, q.w * z2);

        Self::from_cols(
            Vec4::new(1.0 - (yy + zz), xy + wz, xz - wy, 0.0),
            Vec4::new(xy - wz, 1.0 - (xx + zz), yz + wx, 0.0),
            Vec4::new(xz + wy, yz - wx, 1.0 - (xx + yy), 0.0),
            Vec4::W,
        )
    }

    /// Composes translation, rotation, and scale as `T * R * S`.
    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quaternion, translation: Vec3) -> Self {
        let r = Self::from_quat(rotation);
        Self::from_cols(
            r.cols[0] * scale.x,
            r.cols[1] * scale.y,
            r.cols[2] * scale.z,
            Vec4::from_vec3(translation, 1.0),
        )
    }

    /// Right-handed perspective projection with a `[0, 1]` depth range.
    ///
    /// `aspect_ratio` is width over height. Callers guarantee
    /// `0 < z_near < z_far`.
    pub fn perspective_rh_zo(fov_y_radians: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        let f = 1.0 / (fov_y_radians * 0.5).tan();
        let range = z_near - z_far;
        Self::from_cols(
            Vec4::new(f / aspect_ratio, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, z_far / range, -1.0),
            Vec4::new(0.0, 0.0, z_near * z_far / range, 0.0),
        )
    }

    /// Right-handed orthographic projection with a `[0, 1]` depth range.
    pub fn orthographic_rh_zo(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let inv_w = 1.0 / (right - left);
        let inv_h = 1.0 / (top - bottom);
        let inv_d = 1.0 / (z_far - z_near);
        Self::from_cols(
            Vec4::new(2.0 * inv_w, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * inv_h, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -inv_d, 0.0),
            Vec4::new(
                -(right + left) * inv_w,
                -(top + bottom) * inv_h,
                -z_near * inv_d,
                1.0,
            ),
        )
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    ///
    /// Returns `None` when `eye` and `target` coincide or when `up` is parallel
    /// to the viewing direction.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let forward = target - eye;
        if forward.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let f = forward.normalize();
        let s = f.cross(up);
        if s.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let s = s.normalize();
        let u = s.cross(f);

        Some(Self::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-eye.dot(s), -eye.dot(u), eye.dot(f), 1.0),
        ))
    }

    /// Swaps rows and columns.
    pub fn transpose(&self) -> Self {
        Self::from_cols(self.row(0), self.row(1), self.row(2), self.row(3))
    }

    /// General inverse using 2x2 sub-determinants. Returns `None` for singular
    /// matrices.
    pub fn inverse(&self) -> Option<Self> {
        let [a, b, c, d] = self.cols;

        let s0 = a.x * b.y - b.x * a.y;
        let s1 = a.x * b.z - b.x * a.z;
        let s2 = a.x * b.w - b.x * a.w;
        let s3 = a.y * b.z - b.y * a.z;
        let s4 = a.y * b.w - b.y * a.w;
        let s5 = a.z * b.w - b.z * a.w;

        let c5 = c.z * d.w - d.z * c.w;
        let c4 = c.y * d.w - d.y * c.w;
        let c3 = c.y * d.z - d.y * c.z;
        let c2 = c.x * d.w - d.x * c.w;
        let c1 = c.x * d.z - d.x * c.z;
        let c0 = c.x * d.y - d.x * c.y;

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;

        Some(Self::from_cols(
            Vec4::new(
                (b.y * c5 - b.z * c4 + b.w * c3) * inv,
                (-a.y * c5 + a.z * c4 - a.w * c3) * inv,
                (d.y * s5 - d.z * s4 + d.w * s3) * inv,
                (-c.y * s5 + c.z * s4 - c.w * s3) * inv,
            ),
            Vec4::new(
                (-b.x * c5 + b.z * c2 - b.w * c1) * inv,
                (a.x * c5 - a.z * c2 + a.w * c1) * inv,
                (-d.x * s5 + d.z * s2 - d.w * s1) * inv,
                (c.x * s5 - c.z * s2 + c.w * s1) * inv,
            ),
            Vec4::new(
                (b.x * c4 - b.y * c2 + b.w * c0) * inv,
                (-a.x * c4 + a.y * c2 - a.w * c0) * inv,
                (d.x * s4 - d.y * s2 + d.w * s0) * inv,
                (-c.x * s4 + c.y * s2 - c.w * s0) * inv,
            ),
            Vec4::new(
                (-b.x * c3 + b.y * c1 - b.z * c0) * inv,
                (a.x * c3 - a.y * c1 + a.z * c0) * inv,
                (-d.x * s3 + d.y * s1 - d.z * s0) * inv,
                (c.x * s3 - c.y * s1 + c.z * s0) * inv,
            ),
        ))
    }

    /// Transforms a point (w = 1), including translation.
    #[inline]
    pub fn transform_point3(&self, p: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(p, 1.0)).truncate()
    }

    /// Transforms a direction (w = 0), ignoring translation.
    #[inline]
    pub fn transform_vector3(&self, v: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(v, 0.0)).truncate()
    }

    /// Flattens the matrix column by column, ready for a uniform buffer.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        [
            self.cols[0].to_array(),
            self.cols[1].to_array(),
            self.cols[2].to_array(),
            self.cols[3].to_array(),
        ]
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Mat4) -> Self {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, rhs: Vec4) -> Vec4 {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Euler, FRAC_PI_2};
    use approx::assert_relative_eq;

    fn assert_mat_eq(a: &Mat4, b: &Mat4) {
        for c in 0..4 {
            for r in 0..4 {
                assert_relative_eq!(a.cols[c].get(r), b.cols[c].get(r), epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn inverse_of_trs_round_trips() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::splat(60.0),
            Euler::from_yaw(0.5).to_quaternion(),
            Vec3::new(0.0, -6.0, 0.0),
        );
        let inv = m.inverse().expect("TRS matrix should be invertible");
        assert_mat_eq(&(m * inv), &Mat4::IDENTITY);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)).inverse().is_none());
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let p = Mat4::perspective_rh_zo(FRAC_PI_2, 1.0, 0.1, 100.0);
        let near = p * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn orthographic_maps_depth_range() {
        let o = Mat4::orthographic_rh_zo(-5.0, 5.0, -5.0, 5.0, 5.0, 15.0);
        assert_relative_eq!(o.transform_point3(Vec3::new(0.0, 0.0, -5.0)).z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(o.transform_point3(Vec3::new(0.0, 0.0, -15.0)).z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(o.transform_point3(Vec3::new(5.0, -5.0, -10.0)).x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn look_at_puts_target_on_negative_z() {
        let view = Mat4::look_at_rh(Vec3::splat(8.0), Vec3::ZERO, Vec3::Y).unwrap();
        let p = view.transform_point3(Vec3::ZERO);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, -Vec3::splat(8.0).length(), epsilon = 1e-4);
    }

    #[test]
    fn look_at_rejects_degenerate_input() {
        assert!(Mat4::look_at_rh(Vec3::ONE, Vec3::ONE, Vec3::Y).is_none());
        assert!(Mat4::look_at_rh(Vec3::ZERO, Vec3::Y, Vec3::Y).is_none());
    }
}
