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

use plinth_core::math::Vec3;
use plinth_core::scene::Node;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Fixed pose given to the model when it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPlacement {
    /// Uniform scale.
    pub scale: f32,
    /// World position of the model's root.
    pub position: Vec3,
    /// Initial rotation about +Y, in radians.
    pub yaw: f32,
}

impl ModelPlacement {
    /// Overwrites the node's transform with this placement.
    pub fn apply(&self, node: &mut Node) {
        node.transform.translation = self.position;
        node.transform.set_uniform_scale(self.scale);
        node.transform.set_yaw(self.yaw);
    }
}

impl Default for ModelPlacement {
    fn default() -> Self {
        Self {
            scale: 60.0,
            position: Vec3::new(0.0, -6.0, 0.0),
            yaw: FRAC_PI_2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pose_is_applied() {
        let mut node = Node::group(Some("statue"));
        ModelPlacement::default().apply(&mut node);
        assert_eq!(node.transform.scale, Vec3::splat(60.0));
        assert_eq!(node.transform.translation, Vec3::new(0.0, -6.0, 0.0));
        assert_eq!(node.transform.yaw(), FRAC_PI_2);
    }
}
