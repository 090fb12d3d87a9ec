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

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;

/// Window and display handles bundled into one object-safe trait.
pub trait WindowHandle: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle> WindowHandle for T {}

/// Shared, thread-safe handle a renderer uses to create its surface.
pub type ViewerWindowHandle = Arc<dyn WindowHandle + Send + Sync>;

/// The window the viewer draws into.
///
/// Backends (winit today) implement this so the renderer contract never names
/// a windowing crate.
pub trait ViewerWindow: HasWindowHandle + HasDisplayHandle + Send + Sync {
    /// Physical dimensions (width, height) of the inner area.
    fn inner_size(&self) -> (u32, u32);

    /// The device pixel ratio reported by the OS.
    fn scale_factor(&self) -> f64;

    /// Requests that the window be redrawn.
    fn request_redraw(&self);

    /// Clones an Arc'd handle to the window for surface creation.
    fn clone_handle_arc(&self) -> ViewerWindowHandle;

    /// Unique identifier for the window.
    fn id(&self) -> u64;
}
