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

//! Errors produced while reading and decoding assets.

use std::error::Error;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while reading or decoding an asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The file could not be read.
    #[error("failed to read '{}'", path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The bytes were read but could not be decoded.
    #[error("failed to decode '{what}'")]
    Decode {
        /// What was being decoded (a path or a face name).
        what: String,
        /// The decoder's error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The six faces do not form a valid cube map.
    #[error("invalid cube map face '{face}': {reason}")]
    InvalidCubeMap {
        /// Stem of the offending face (`px`, `nx`, ...).
        face: &'static str,
        /// Why the face was rejected.
        reason: String,
    },
    /// The glTF document is structurally unusable.
    #[error("invalid glTF: {0}")]
    Gltf(String),
    /// A primitive lacks a required vertex attribute.
    #[error("mesh '{mesh}' has no {attribute} attribute")]
    MissingAttribute {
        /// Mesh name or index.
        mesh: String,
        /// The missing attribute.
        attribute: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_source() {
        let err = AssetError::Io {
            path: PathBuf::from("static/px.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to read 'static/px.png'");
        assert!(err.source().is_some());
    }

    #[test]
    fn cube_map_error_names_face() {
        let err = AssetError::InvalidCubeMap {
            face: "ny",
            reason: "face is 8x8, expected 4x4".to_string(),
        };
        assert_eq!(err.to_string(), "invalid cube map face 'ny': face is 8x8, expected 4x4");
    }
}
