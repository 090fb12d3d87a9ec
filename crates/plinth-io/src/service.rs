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

//! Background asset loading.
//!
//! Every request runs on its own thread and reports back over a channel.
//! The consumer drains that channel on its own schedule, so all scene
//! mutation stays on the consumer's thread.

use crate::error::AssetError;
use crate::loading::{CubeMapLoader, FileSystemResolver, GltfLoader};
use flume::Sender;
use plinth_core::asset::CubeMap;
use plinth_core::scene::Node;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// Directory of the default environment, relative to the asset root.
pub const DEFAULT_ENVIRONMENT_DIR: &str = "environments/fireplace";

/// Face file names of the default environment, in `px, nx, py, ny, pz, nz` order.
pub const DEFAULT_CUBE_FACES: [&str; 6] = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"];

/// The statue model, relative to the asset root.
pub const DEFAULT_MODEL_PATH: &str = "models/horse_statue_01_1k.gltf/horse_statue_01_1k.gltf";

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

/// Identifies one load request across the events it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Allocates an id no other request has.
    pub fn next() -> Self {
        Self(NEXT_REQUEST.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw request number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Messages published by the [`AssetService`].
///
/// Each request ends with exactly one terminal event: `EnvironmentLoaded`,
/// `ModelLoaded` or `LoadFailed`. Any number of `Progress` events may
/// precede it.
#[derive(Debug)]
pub enum AssetEvent {
    /// A cube map is ready.
    EnvironmentLoaded {
        /// The originating request.
        request: RequestId,
        /// The decoded environment.
        cube_map: Arc<CubeMap>,
    },
    /// A model is ready.
    ModelLoaded {
        /// The originating request.
        request: RequestId,
        /// Root of the model's node tree.
        root: Node,
    },
    /// Bytes or files read so far.
    Progress {
        /// The originating request.
        request: RequestId,
        /// Units done.
        loaded: u64,
        /// Units expected.
        total: u64,
    },
    /// The request failed and will produce nothing further.
    LoadFailed {
        /// The originating request.
        request: RequestId,
        /// The asset that failed.
        path: PathBuf,
        /// What went wrong.
        error: AssetError,
    },
}

impl AssetEvent {
    /// The request this event belongs to.
    pub fn request(&self) -> RequestId {
        match self {
            AssetEvent::EnvironmentLoaded { request, .. }
            | AssetEvent::ModelLoaded { request, .. }
            | AssetEvent::Progress { request, .. }
            | AssetEvent::LoadFailed { request, .. } => *request,
        }
    }
}

/// Spawns loads and forwards their results to a channel.
#[derive(Debug, Clone)]
pub struct AssetService {
    root: PathBuf,
    sender: Sender<AssetEvent>,
}

impl AssetService {
    /// Creates a service resolving paths against `root`.
    pub fn new(root: impl Into<PathBuf>, sender: Sender<AssetEvent>) -> Self {
        Self {
            root: root.into(),
            sender,
        }
    }

    /// The asset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads six faces from `directory` (relative to the root) into a cube map.
    pub fn load_environment(&self, directory: impl AsRef<Path>, faces: [String; 6]) -> RequestId {
        let request = RequestId::next();
        let directory = self.root.join(directory);
        let sender = self.sender.clone();
        let label = directory.clone();

        self.spawn("plinth-env-loader", request, label, move || {
            let total = faces.len() as u64;
            let mut face_bytes = Vec::with_capacity(faces.len());
            for (i, face) in faces.iter().enumerate() {
                let path = directory.join(face);
                let bytes = std::fs::read(&path).map_err(|source| AssetError::Io { path, source })?;
                face_bytes.push(bytes);
                publish(
                    &sender,
                    AssetEvent::Progress {
                        request,
                        loaded: i as u64 + 1,
                        total,
                    },
                );
            }

            let slices: [&[u8]; 6] = std::array::from_fn(|i| face_bytes[i].as_slice());
            let cube_map = CubeMapLoader::new().load_faces(slices)?;
            log::info!(
                "Environment '{}' loaded ({}px faces, {} mips).",
                directory.display(),
                cube_map.face_size(),
                cube_map.mip_level_count()
            );
            Ok(AssetEvent::EnvironmentLoaded {
                request,
                cube_map: Arc::new(cube_map),
            })
        })
    }

    /// Loads a glTF model at `path` (relative to the root).
    pub fn load_model(&self, path: impl AsRef<Path>) -> RequestId {
        let request = RequestId::next();
        let path = self.root.join(path);
        let sender = self.sender.clone();

        self.spawn("plinth-model-loader", request, path.clone(), move || {
            let bytes = std::fs::read(&path).map_err(|source| AssetError::Io {
                path: path.clone(),
                source,
            })?;
            let total = bytes.len() as u64;
            publish(
                &sender,
                AssetEvent::Progress {
                    request,
                    loaded: total,
                    total,
                },
            );

            let base = path.parent().unwrap_or_else(|| Path::new("."));
            let loader = GltfLoader::new(Arc::new(FileSystemResolver::new(base)));
            let root = loader.load_document(&bytes)?;
            log::info!(
                "Model '{}' loaded ({} mesh nodes).",
                path.display(),
                root.mesh_count()
            );
            Ok(AssetEvent::ModelLoaded { request, root })
        })
    }

    /// Runs `job` on a named thread and publishes its terminal event.
    fn spawn<F>(&self, name: &str, request: RequestId, path: PathBuf, job: F) -> RequestId
    where
        F: FnOnce() -> Result<AssetEvent, AssetError> + Send + 'static,
    {
        let sender = self.sender.clone();
        let failed_path = path.clone();
        let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
            let event = job().unwrap_or_else(|error| AssetEvent::LoadFailed {
                request,
                path: failed_path,
                error,
            });
            publish(&sender, event);
        });

        if let Err(source) = spawned {
            publish(
                &self.sender,
                AssetEvent::LoadFailed {
                    request,
                    path,
                    error: AssetError::Io {
                        path: PathBuf::from(name),
                        source,
                    },
                },
            );
        }
        log::debug!("Asset request {} started on '{name}'.", request.get());
        request
    }
}

fn publish(sender: &Sender<AssetEvent>, event: AssetEvent) {
    if sender.send(event).is_err() {
        log::debug!("Asset event dropped: receiver is gone.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn request_ids_are_unique() {
        let a = RequestId::next();
        let b = RequestId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn missing_model_fails_once() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = flume::unbounded();
        let service = AssetService::new(dir.path(), tx);

        let request = service.load_model("nowhere.gltf");
        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.request(), request);
        match event {
            AssetEvent::LoadFailed { path, error, .. } => {
                assert!(path.ends_with("nowhere.gltf"));
                assert!(matches!(error, AssetError::Io { .. }));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        drop(service);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }
}
