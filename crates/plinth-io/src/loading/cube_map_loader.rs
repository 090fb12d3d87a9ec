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

//! Six-face cube map assembly.

use super::texture_loader::TextureLoader;
use crate::error::AssetError;
use crate::loader::AssetLoader;
use plinth_core::asset::{CpuTexture, CubeFace, CubeMap};

/// Builds a [`CubeMap`] from six encoded images.
///
/// Faces are always given in `px, nx, py, ny, pz, nz` order. Every face is
/// decoded as sRGB and gets its own mip chain, which the renderer samples for
/// rough reflections.
#[derive(Debug, Clone, Copy)]
pub struct CubeMapLoader {
    faces: TextureLoader,
}

impl CubeMapLoader {
    /// A loader for sRGB environment faces.
    pub fn new() -> Self {
        Self {
            faces: TextureLoader::srgb(),
        }
    }

    /// Decodes and validates six faces.
    pub fn load_faces(&self, faces: [&[u8]; 6]) -> Result<CubeMap, AssetError> {
        let mut decoded: Vec<CpuTexture> = Vec::with_capacity(6);
        for (face, bytes) in CubeFace::ALL.into_iter().zip(faces) {
            let texture = self.faces.load(bytes).map_err(|source| AssetError::Decode {
                what: format!("cube face '{}'", face.stem()),
                source,
            })?;
            decoded.push(texture);
        }

        let faces: [CpuTexture; 6] = decoded
            .try_into()
            .map_err(|v: Vec<CpuTexture>| AssetError::InvalidCubeMap {
                face: CubeFace::PositiveX.stem(),
                reason: format!("expected six faces, got {}", v.len()),
            })?;

        CubeMap::from_faces(faces).map_err(|(index, reason)| AssetError::InvalidCubeMap {
            face: CubeFace::ALL[index].stem(),
            reason,
        })
    }
}

impl Default for CubeMapLoader {
    fn default() -> Self {
        Self::new()
    }
}
