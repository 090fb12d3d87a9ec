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

//! Asset input for the viewer: image, cube-map and glTF decoding, plus the
//! background service that runs those decoders off the main thread.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod loading;
pub mod service;

pub use error::AssetError;
pub use loader::AssetLoader;
pub use service::{
    AssetEvent, AssetService, RequestId, DEFAULT_CUBE_FACES, DEFAULT_ENVIRONMENT_DIR,
    DEFAULT_MODEL_PATH,
};
