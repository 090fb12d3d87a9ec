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

//! Six-face cube maps used as the scene background and reflection source.

use super::texture::{CpuTexture, TextureId};

/// One face of a cube map. The discriminant is the array layer index the GPU
/// expects, so the ordering is fixed: +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// +X
    PositiveX = 0,
    /// -X
    NegativeX = 1,
    /// +Y
    PositiveY = 2,
    /// -Y
    NegativeY = 3,
    /// +Z
    PositiveZ = 4,
    /// -Z
    NegativeZ = 5,
}

impl CubeFace {
    /// All faces in layer order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// The conventional short file stem for this face (`px`, `nx`, ...).
    pub fn stem(self) -> &'static str {
        match self {
            CubeFace::PositiveX => "px",
            CubeFace::NegativeX => "nx",
            CubeFace::PositiveY => "py",
            CubeFace::NegativeY => "ny",
            CubeFace::PositiveZ => "pz",
            CubeFace::NegativeZ => "nz",
        }
    }
}

/// A cube map built from six square faces of identical size.
///
/// Construction goes through the cube-map loader, which validates the faces;
/// code holding a `CubeMap` can rely on every face sharing one size and mip
/// count.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMap {
    /// Stable identifier for GPU caching.
    pub id: TextureId,
    faces: [CpuTexture; 6],
}

impl CubeMap {
    /// Assembles a cube map from faces in [`CubeFace::ALL`] order.
    ///
    /// Returns the offending face index and a reason when the faces are not
    /// square or not all the same size.
    pub fn from_faces(faces: [CpuTexture; 6]) -> Result<Self, (usize, String)> {
        let size = faces[0].width();
        for (i, face) in faces.iter().enumerate() {
            if face.width() != face.height() {
                return Err((i, format!("face is {}x{}, expected a square", face.width(), face.height())));
            }
            if face.width() != size {
                return Err((i, format!("face is {0}x{0}, expected {size}x{size}", face.width())));
            }
        }
        Ok(Self {
            id: TextureId::new(),
            faces,
        })
    }

    /// Edge length of the base level, in texels.
    pub fn face_size(&self) -> u32 {
        self.faces[0].width()
    }

    /// Number of mip levels shared by every face.
    pub fn mip_level_count(&self) -> u32 {
        self.faces[0].mip_level_count()
    }

    /// Returns the texture for one face.
    pub fn face(&self, face: CubeFace) -> &CpuTexture {
        &self.faces[face as usize]
    }

    /// Iterates over faces in layer order.
    pub fn faces(&self) -> impl Iterator<Item = (CubeFace, &CpuTexture)> {
        CubeFace::ALL.into_iter().zip(self.faces.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::texture::ColorSpace;

    fn face(w: u32, h: u32) -> CpuTexture {
        CpuTexture::from_rgba8(w, h, vec![0; (w * h * 4) as usize], ColorSpace::Srgb).unwrap()
    }

    #[test]
    fn accepts_six_equal_squares() {
        let cube = CubeMap::from_faces(std::array::from_fn(|_| face(4, 4))).unwrap();
        assert_eq!(cube.face_size(), 4);
        assert_eq!(cube.mip_level_count(), 3);
        let stems: Vec<_> = cube.faces().map(|(f, _)| f.stem()).collect();
        assert_eq!(stems, ["px", "nx", "py", "ny", "pz", "nz"]);
    }

    #[test]
    fn rejects_mismatched_face() {
        let mut faces: [CpuTexture; 6] = std::array::from_fn(|_| face(4, 4));
        faces[3] = face(8, 8);
        let (index, _) = CubeMap::from_faces(faces).unwrap_err();
        assert_eq!(index, 3);
    }

    #[test]
    fn rejects_non_square_face() {
        let mut faces: [CpuTexture; 6] = std::array::from_fn(|_| face(4, 4));
        faces[0] = face(4, 2);
        let (index, reason) = CubeMap::from_faces(faces).unwrap_err();
        assert_eq!(index, 0);
        assert!(reason.contains("square"));
    }
}
