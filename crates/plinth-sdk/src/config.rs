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

//! Viewer configuration, read from a RON file.

use anyhow::{Context, Result};
use plinth_agents::{MaterialSettings, ModelPlacement, WorldSettings, DEFAULT_MAX_PIXEL_RATIO};
use plinth_core::camera::PerspectiveCamera;
use plinth_core::math::{LinearRgba, Vec3};
use plinth_core::renderer::{DirectionalLight, RenderSettings, ShadowSettings, ToneMapping};
use plinth_io::{DEFAULT_CUBE_FACES, DEFAULT_ENVIRONMENT_DIR, DEFAULT_MODEL_PATH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "PLINTH_CONFIG";

/// Config file used when [`CONFIG_ENV_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "plinth.ron";

/// The window the viewer opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text.
    pub title: String,
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Plinth".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Where the environment and model come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory every other path is relative to.
    pub root: PathBuf,
    /// Directory holding the six environment faces.
    pub environment: PathBuf,
    /// Face file names, in `px, nx, py, ny, pz, nz` order.
    pub faces: [String; 6],
    /// The glTF model.
    pub model: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("static"),
            environment: PathBuf::from(DEFAULT_ENVIRONMENT_DIR),
            faces: DEFAULT_CUBE_FACES.map(String::from),
            model: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

/// Starting camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view, in degrees.
    pub fov_y_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Eye position. The camera looks at the origin.
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = PerspectiveCamera::default();
        Self {
            fov_y_degrees: camera.fov_y_degrees,
            near: camera.z_near,
            far: camera.z_far,
            position: camera.position,
        }
    }
}

/// Starting light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Linear light color.
    pub color: LinearRgba,
    /// Illuminance at the statue.
    pub intensity: f32,
    /// Light position. It always points at the origin.
    pub position: Vec3,
    /// Whether the light renders a shadow map.
    pub cast_shadow: bool,
    /// Shadow map resolution and camera range.
    pub shadow: ShadowSettings,
}

impl Default for LightConfig {
    fn default() -> Self {
        let light = DirectionalLight::default();
        Self {
            color: light.color,
            intensity: light.intensity,
            position: light.position,
            cast_shadow: light.cast_shadow,
            shadow: light.shadow,
        }
    }
}

/// Everything the viewer can be configured with. Every field is optional
/// in the file and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    /// Pose given to the model when it arrives.
    pub placement: ModelPlacement,
    pub camera: CameraConfig,
    /// Orbit damping factor, in `(0, 1]`.
    pub damping_factor: f32,
    pub light: LightConfig,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    pub env_map_intensity: f32,
    /// Cap on the device pixel ratio used for rendering.
    pub max_pixel_ratio: f32,
    /// Whether the debug panel starts visible.
    pub show_debug_panel: bool,
    /// Seconds between performance log lines.
    pub stats_interval_secs: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            placement: ModelPlacement::default(),
            camera: CameraConfig::default(),
            damping_factor: WorldSettings::default().damping_factor,
            light: LightConfig::default(),
            tone_mapping: ToneMapping::default(),
            exposure: 1.0,
            env_map_intensity: MaterialSettings::default().env_map_intensity,
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
            show_debug_panel: false,
            stats_interval_secs: 1.0,
        }
    }
}

impl ViewerConfig {
    /// Parses a RON document.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).context("Failed to parse viewer config")
    }

    /// Reads `path`. A missing file yields the defaults; an unreadable or
    /// malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at '{}', using defaults.", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read '{}'", path.display()))
            }
        };
        let config = Self::from_ron(&text).with_context(|| format!("In '{}'", path.display()))?;
        log::info!("Loaded config from '{}'.", path.display());
        Ok(config)
    }

    /// Reads the file named by `PLINTH_CONFIG`, or `plinth.ron`.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load(path)
    }

    /// The initial state of the viewer world.
    pub fn world_settings(&self) -> WorldSettings {
        let camera = PerspectiveCamera::new(
            self.camera.fov_y_degrees,
            self.window.width.max(1) as f32 / self.window.height.max(1) as f32,
            self.camera.near,
            self.camera.far,
            self.camera.position,
        );
        let light = DirectionalLight {
            color: self.light.color,
            intensity: self.light.intensity,
            position: self.light.position,
            cast_shadow: self.light.cast_shadow,
            shadow: self.light.shadow,
            ..DirectionalLight::default()
        };
        WorldSettings {
            camera,
            light,
            placement: self.placement,
            damping_factor: self.damping_factor,
            render: RenderSettings {
                tone_mapping: self.tone_mapping,
                exposure: self.exposure,
                ..RenderSettings::default()
            },
            materials: MaterialSettings {
                env_map_intensity: self.env_map_intensity,
            },
            show_debug_panel: self.show_debug_panel,
        }
    }

    /// Interval between performance reports. Non-positive values fall back
    /// to one second.
    pub fn stats_interval(&self) -> Duration {
        if self.stats_interval_secs.is_finite() && self.stats_interval_secs > 0.0 {
            Duration::from_secs_f64(self.stats_interval_secs)
        } else {
            Duration::from_secs(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_viewer() {
        let config = ViewerConfig::default();
        assert_eq!(config.window.title, "Plinth");
        assert_eq!((config.window.width, config.window.height), (1280, 720));
        assert_eq!(config.assets.root, PathBuf::from("static"));
        assert_eq!(config.assets.faces[0], "px.png");
        assert_eq!(config.max_pixel_ratio, 2.0);
        assert!(!config.show_debug_panel);
        assert_eq!(config.stats_interval(), Duration::from_secs(1));
        assert_eq!(config.camera.fov_y_degrees, 75.0);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = ViewerConfig::from_ron(
            r#"(
                window: (title: "Gallery"),
                tone_mapping: Reinhard,
                env_map_intensity: 2.5,
                show_debug_panel: true,
            )"#,
        )
        .unwrap();
        assert_eq!(config.window.title, "Gallery");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.tone_mapping, ToneMapping::Reinhard);
        assert_eq!(config.env_map_intensity, 2.5);
        assert!(config.show_debug_panel);
        assert_eq!(config.assets, AssetConfig::default());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(ViewerConfig::from_ron("(window: 12").is_err());
        assert!(ViewerConfig::from_ron("(tone_mapping: Sepia)").is_err());
    }

    #[test]
    fn world_settings_carry_the_config() {
        let mut config = ViewerConfig::default();
        config.exposure = 1.5;
        config.light.intensity = 7.0;
        let settings = config.world_settings();
        assert_eq!(settings.render.exposure, 1.5);
        assert_eq!(settings.light.intensity, 7.0);
        assert_eq!(settings.camera.aspect_ratio, 1280.0 / 720.0);
        assert_eq!(settings.placement, ModelPlacement::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::load(dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plinth.ron");
        std::fs::write(&path, "(damping_factor: \"fast\")").unwrap();
        let err = ViewerConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("plinth.ron"));
    }

    #[test]
    fn bad_interval_falls_back() {
        let config = ViewerConfig {
            stats_interval_secs: -3.0,
            ..ViewerConfig::default()
        };
        assert_eq!(config.stats_interval(), Duration::from_secs(1));
    }
}
