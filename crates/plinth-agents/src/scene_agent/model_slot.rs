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

use plinth_core::scene::NodeId;

/// Where the asynchronously loaded model lives, once it exists.
///
/// The slot goes from `Absent` to `Present` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelSlot {
    /// The model has not arrived (and may never arrive).
    #[default]
    Absent,
    /// The model's root node in the scene.
    Present(NodeId),
}

impl ModelSlot {
    /// Whether the model has been loaded.
    pub fn is_present(&self) -> bool {
        matches!(self, ModelSlot::Present(_))
    }

    /// The model's node, if loaded.
    pub fn id(&self) -> Option<NodeId> {
        match self {
            ModelSlot::Present(id) => Some(*id),
            ModelSlot::Absent => None,
        }
    }

    /// Stores the model. Returns false, leaving the slot untouched, if it was
    /// already filled.
    pub fn fill(&mut self, id: NodeId) -> bool {
        match self {
            ModelSlot::Absent => {
                *self = ModelSlot::Present(id);
                true
            }
            ModelSlot::Present(existing) => {
                log::warn!(
                    "Model slot already holds node {}; ignoring node {}.",
                    existing.get(),
                    id.get()
                );
                false
            }
        }
    }
}
