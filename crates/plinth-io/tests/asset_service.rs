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

use image::{ImageFormat, Rgba, RgbaImage};
use plinth_io::{AssetError, AssetEvent, AssetService, DEFAULT_CUBE_FACES};
use std::path::Path;
use std::time::Duration;

const TRIANGLE_GLTF: &str = r#"{
  "asset": {"version": "2.0"},
  "scenes": [{"nodes": [0]}],
  "nodes": [{"name": "statue", "mesh": 0}],
  "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
  "buffers": [{"byteLength": 36, "uri": "triangle.bin"}],
  "bufferViews": [{"buffer": 0, "byteLength": 36}],
  "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                 "min": [0, 0, 0], "max": [1, 1, 0]}]
}"#;

fn write_png(path: &Path, size: u32) {
    RgbaImage::from_pixel(size, size, Rgba([200, 180, 160, 255]))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

fn faces() -> [String; 6] {
    DEFAULT_CUBE_FACES.map(String::from)
}

/// Receives until the terminal event of a request, skipping progress.
fn terminal(rx: &flume::Receiver<AssetEvent>) -> (AssetEvent, usize) {
    let mut progress = 0;
    loop {
        match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            AssetEvent::Progress { .. } => progress += 1,
            other => return (other, progress),
        }
    }
}

#[test]
fn environment_loads_from_six_faces() {
    let root = tempfile::tempdir().unwrap();
    let env = root.path().join("environments/test");
    std::fs::create_dir_all(&env).unwrap();
    for face in DEFAULT_CUBE_FACES {
        write_png(&env.join(face), 16);
    }

    let (tx, rx) = flume::unbounded();
    let service = AssetService::new(root.path(), tx);
    let request = service.load_environment("environments/test", faces());

    let (event, progress) = terminal(&rx);
    assert_eq!(progress, 6);
    match event {
        AssetEvent::EnvironmentLoaded { request: r, cube_map } => {
            assert_eq!(r, request);
            assert_eq!(cube_map.face_size(), 16);
            assert_eq!(cube_map.mip_level_count(), 5);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn missing_face_reports_io_failure() {
    let root = tempfile::tempdir().unwrap();
    let env = root.path().join("env");
    std::fs::create_dir_all(&env).unwrap();
    for face in &DEFAULT_CUBE_FACES[..5] {
        write_png(&env.join(face), 4);
    }

    let (tx, rx) = flume::unbounded();
    let service = AssetService::new(root.path(), tx);
    service.load_environment("env", faces());

    match terminal(&rx).0 {
        AssetEvent::LoadFailed { error: AssetError::Io { path, .. }, .. } => {
            assert!(path.ends_with("nz.png"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn model_with_external_buffer_loads() {
    let root = tempfile::tempdir().unwrap();
    let models = root.path().join("models/tri");
    std::fs::create_dir_all(&models).unwrap();
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    std::fs::write(models.join("triangle.bin"), le_bytes(&positions)).unwrap();
    std::fs::write(models.join("tri.gltf"), TRIANGLE_GLTF).unwrap();

    let (tx, rx) = flume::unbounded();
    let service = AssetService::new(root.path(), tx);
    let request = service.load_model("models/tri/tri.gltf");

    let (event, progress) = terminal(&rx);
    assert_eq!(progress, 1);
    match event {
        AssetEvent::ModelLoaded { request: r, root } => {
            assert_eq!(r, request);
            assert_eq!(root.mesh_count(), 1);
            assert_eq!(root.children()[0].name.as_deref(), Some("statue"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn malformed_model_reports_gltf_failure() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("broken.gltf"), "{\"asset\":").unwrap();

    let (tx, rx) = flume::unbounded();
    let service = AssetService::new(root.path(), tx);
    service.load_model("broken.gltf");

    assert!(matches!(
        terminal(&rx).0,
        AssetEvent::LoadFailed { error: AssetError::Gltf(_), .. }
    ));
}

fn le_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
