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
use plinth_core::renderer::ToneMapping;
use plinth_sdk::ViewerConfig;
use std::path::PathBuf;

const DOCUMENT: &str = r#"(
    window: (title: "Atelier", width: 800, height: 600),
    assets: (root: "gallery", model: "models/bust.gltf"),
    camera: (fov_y_degrees: 50.0, position: (x: 0.0, y: 2.0, z: 10.0)),
    damping_factor: 0.1,
    light: (intensity: 4.5),
    tone_mapping: Cineon,
    max_pixel_ratio: 1.5,
    stats_interval_secs: 5.0,
)"#;

#[test]
fn config_file_overrides_selected_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plinth.ron");
    std::fs::write(&path, DOCUMENT).unwrap();

    let config = ViewerConfig::load(&path).unwrap();
    assert_eq!(config.window.title, "Atelier");
    assert_eq!((config.window.width, config.window.height), (800, 600));
    assert_eq!(config.assets.root, PathBuf::from("gallery"));
    assert_eq!(config.assets.model, PathBuf::from("models/bust.gltf"));
    assert_eq!(config.assets.faces, ViewerConfig::default().assets.faces);
    assert_eq!(config.camera.position, Vec3::new(0.0, 2.0, 10.0));
    assert_eq!(config.camera.near, 0.1);
    assert_eq!(config.tone_mapping, ToneMapping::Cineon);
    assert_eq!(config.max_pixel_ratio, 1.5);

    let settings = config.world_settings();
    assert_eq!(settings.camera.fov_y_degrees, 50.0);
    assert_eq!(settings.camera.aspect_ratio, 800.0 / 600.0);
    assert_eq!(settings.light.intensity, 4.5);
    assert_eq!(settings.damping_factor, 0.1);
    assert_eq!(settings.render.tone_mapping, ToneMapping::Cineon);
}

#[test]
fn serialized_defaults_parse_back() {
    let text = ron::ser::to_string_pretty(&ViewerConfig::default(), Default::default()).unwrap();
    assert_eq!(ViewerConfig::from_ron(&text).unwrap(), ViewerConfig::default());
}
