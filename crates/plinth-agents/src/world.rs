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

//! The viewer's mutable state and the contracts that change it.

use crate::debug_agent::{DebugEdit, DebugParameters};
use crate::scene_agent::{update_all_materials, MaterialSettings, ModelPlacement, ModelSlot};
use flume::Receiver;
use plinth_core::camera::{OrbitControls, PerspectiveCamera};
use plinth_core::math::Vec3;
use plinth_core::platform::InputEvent;
use plinth_core::renderer::{DirectionalLight, FrameInput, RenderSettings};
use plinth_core::scene::{Node, Scene};
use plinth_io::AssetEvent;
use std::any::Any;
use std::error::Error;

/// Log target of asset failure diagnostics.
pub const ASSET_LOG_TARGET: &str = "plinth::assets";

/// Key that shows and hides the debug panel.
const DEBUG_PANEL_KEY: &str = "KeyH";

/// Initial state of a [`ViewerWorld`].
#[derive(Debug, Clone)]
pub struct WorldSettings {
    /// Starting viewpoint.
    pub camera: PerspectiveCamera,
    /// The scene's light.
    pub light: DirectionalLight,
    /// Pose given to the model on arrival.
    pub placement: ModelPlacement,
    /// Orbit damping factor.
    pub damping_factor: f32,
    /// Tone mapping and exposure.
    pub render: RenderSettings,
    /// Global material parameters.
    pub materials: MaterialSettings,
    /// Whether the debug panel starts visible.
    pub show_debug_panel: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            camera: PerspectiveCamera::default(),
            light: DirectionalLight::default(),
            placement: ModelPlacement::default(),
            damping_factor: 0.05,
            render: RenderSettings::default(),
            materials: MaterialSettings::default(),
            show_debug_panel: false,
        }
    }
}

/// Scene, viewpoint, light and settings, plus the channel asset completions
/// arrive on.
///
/// All mutation happens through `&mut self` on the thread that owns the
/// world. Loader threads only ever send [`AssetEvent`]s.
#[derive(Debug)]
pub struct ViewerWorld {
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    light: DirectionalLight,
    render_settings: RenderSettings,
    material_settings: MaterialSettings,
    params: DebugParameters,
    placement: ModelPlacement,
    model: ModelSlot,
    assets: Receiver<AssetEvent>,
}

impl ViewerWorld {
    /// Builds the world. `assets` is the receiving end of the asset service's channel.
    pub fn new(settings: WorldSettings, assets: Receiver<AssetEvent>) -> Self {
        let mut light = settings.light;
        light.look_at(Vec3::ZERO);

        let params = DebugParameters {
            env_map_intensity: settings.materials.env_map_intensity,
            model_yaw: settings.placement.yaw,
            light_intensity: light.intensity,
            light_x: light.position.x,
            light_y: light.position.y,
            light_z: light.position.z,
            tone_mapping: settings.render.tone_mapping,
            visible: settings.show_debug_panel,
        };

        Self {
            scene: Scene::new(),
            camera: settings.camera,
            controls: OrbitControls::with_damping(settings.damping_factor),
            light,
            render_settings: settings.render,
            material_settings: settings.materials,
            params,
            placement: settings.placement,
            model: ModelSlot::Absent,
            assets,
        }
    }

    /// Applies every asset event received so far. Returns how many were handled.
    pub fn drain_asset_events(&mut self) -> usize {
        let events: Vec<AssetEvent> = self.assets.try_iter().collect();
        let count = events.len();
        for event in events {
            self.handle_asset_event(event);
        }
        count
    }

    /// Applies one asset event.
    pub fn handle_asset_event(&mut self, event: AssetEvent) {
        match event {
            AssetEvent::Progress {
                request,
                loaded,
                total,
            } => {
                log::trace!("Asset request {}: {loaded}/{total}.", request.get());
            }
            AssetEvent::EnvironmentLoaded { request, cube_map } => {
                log::debug!("Environment from request {} installed.", request.get());
                self.scene.environment = Some(cube_map);
                self.refresh_materials();
            }
            AssetEvent::ModelLoaded { request, root } => {
                self.install_model(root);
                log::debug!("Model from request {} handled.", request.get());
            }
            AssetEvent::LoadFailed {
                request,
                path,
                error,
            } => {
                log::error!(
                    target: ASSET_LOG_TARGET,
                    "Request {} failed to load '{}': {}",
                    request.get(),
                    path.display(),
                    error_chain(&error)
                );
            }
        }
    }

    fn install_model(&mut self, mut root: Node) {
        self.placement.apply(&mut root);
        if !self.model.fill(root.id()) {
            return;
        }
        self.scene.add(root);
        self.params.model_yaw = self.placement.yaw;
        self.refresh_materials();
    }

    /// Runs the material update with the current settings.
    pub fn refresh_materials(&mut self) -> usize {
        update_all_materials(&mut self.scene, &self.material_settings)
    }

    /// Applies a debug-panel edit, clamped to its range, and runs the
    /// update it implies.
    pub fn apply_edit(&mut self, edit: DebugEdit) {
        let edit = edit.clamped();
        edit.write_to(&mut self.params);
        log::debug!("Debug edit: {edit:?}");

        match edit {
            DebugEdit::EnvMapIntensity(value) => {
                self.material_settings.env_map_intensity = value;
                self.refresh_materials();
            }
            DebugEdit::ModelYaw(value) => {
                self.set_model_yaw(value);
            }
            DebugEdit::LightIntensity(value) => self.light.intensity = value,
            DebugEdit::LightX(value) => {
                self.light.position.x = value;
                self.light.look_at(Vec3::ZERO);
            }
            DebugEdit::LightY(value) => {
                self.light.position.y = value;
                self.light.look_at(Vec3::ZERO);
            }
            DebugEdit::LightZ(value) => {
                self.light.position.z = value;
                self.light.look_at(Vec3::ZERO);
            }
            DebugEdit::ToneMapping(mode) => {
                self.render_settings.tone_mapping = mode;
                self.refresh_materials();
            }
        }
    }

    /// Routes a user input event. The debug-panel key toggles the panel;
    /// everything else goes to the orbit controls. Returns true if consumed.
    pub fn handle_input(&mut self, event: &InputEvent, viewport: (u32, u32)) -> bool {
        if event.is_key_press(DEBUG_PANEL_KEY) {
            let visible = self.params.toggle_visible();
            log::debug!("Debug panel {}.", if visible { "shown" } else { "hidden" });
            return true;
        }
        self.controls.handle_input(event, viewport)
    }

    /// Rotates the model about +Y, if it has loaded. Returns whether it had.
    pub fn set_model_yaw(&mut self, yaw: f32) -> bool {
        match self.model_node_mut() {
            Some(node) => {
                node.transform.set_yaw(yaw);
                true
            }
            None => false,
        }
    }

    /// Advances the camera controls one step.
    pub fn update_controls(&mut self) -> bool {
        self.controls.update(&mut self.camera)
    }

    /// What the renderer needs for one frame.
    pub fn frame_input<'a>(&'a self, overlay: Option<&'a dyn Any>) -> FrameInput<'a> {
        FrameInput {
            scene: &self.scene,
            camera: &self.camera,
            light: &self.light,
            settings: &self.render_settings,
            overlay,
        }
    }

    /// The model's root node, once loaded.
    pub fn model_node(&self) -> Option<&Node> {
        self.model.id().and_then(|id| self.scene.find(id))
    }

    fn model_node_mut(&mut self) -> Option<&mut Node> {
        let id = self.model.id()?;
        self.scene.find_mut(id)
    }

    /// The model slot.
    pub fn model(&self) -> ModelSlot {
        self.model
    }

    /// The scene graph.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub(crate) fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The camera.
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// The camera, mutably.
    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    /// The orbit controls.
    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// The directional light.
    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    /// Current render settings.
    pub fn render_settings(&self) -> &RenderSettings {
        &self.render_settings
    }

    /// Current material settings.
    pub fn material_settings(&self) -> &MaterialSettings {
        &self.material_settings
    }

    /// Debug panel values.
    pub fn params(&self) -> &DebugParameters {
        &self.params
    }
}

/// Formats an error followed by its sources on one line.
fn error_chain(error: &dyn Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_agent::clear_material_updates;
    use plinth_core::asset::{ColorSpace, CpuTexture, CubeMap};
    use plinth_core::renderer::ToneMapping;
    use plinth_core::scene::{Material, Mesh, MeshNode, NodeKind, StandardMaterial};
    use plinth_io::{AssetError, RequestId};
    use std::sync::Arc;

    fn world() -> (ViewerWorld, flume::Sender<AssetEvent>) {
        let (tx, rx) = flume::unbounded();
        (ViewerWorld::new(WorldSettings::default(), rx), tx)
    }

    fn statue() -> Node {
        let mesh = Arc::new(Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], None, None, None));
        let mut node = MeshNode::new(mesh, Material::Standard(StandardMaterial::default()));
        node.cast_shadow = false;
        let mut root = Node::group(Some("statue"));
        root.add_child(Node::mesh(Some("body"), node));
        root
    }

    fn request() -> RequestId {
        RequestId::next()
    }

    fn first_standard(world: &ViewerWorld) -> Option<(StandardMaterial, bool)> {
        let mut found = None;
        world.scene().traverse(|node, _| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                if found.is_none() {
                    if let Some(m) = mesh.material.as_standard() {
                        found = Some((m.clone(), mesh.cast_shadow));
                    }
                }
            }
        });
        found
    }

    #[test]
    fn model_completion_places_and_updates() {
        let (mut world, tx) = world();
        tx.send(AssetEvent::ModelLoaded {
            request: request(),
            root: statue(),
        })
        .unwrap();

        assert_eq!(world.drain_asset_events(), 1);
        let model = world.model_node().expect("model present");
        assert_eq!(model.transform.scale, Vec3::splat(60.0));
        assert_eq!(model.transform.translation, Vec3::new(0.0, -6.0, 0.0));

        let (material, cast) = first_standard(&world).unwrap();
        assert!(cast);
        assert_eq!(material.env_map_intensity, 1.0);
    }

    #[test]
    fn second_model_is_rejected() {
        let (mut world, _tx) = world();
        let first = statue();
        let first_id = first.id();
        world.handle_asset_event(AssetEvent::ModelLoaded {
            request: request(),
            root: first,
        });
        world.handle_asset_event(AssetEvent::ModelLoaded {
            request: request(),
            root: statue(),
        });
        assert_eq!(world.model(), ModelSlot::Present(first_id));
        assert_eq!(world.scene().root().children().len(), 1);
    }

    #[test]
    fn failure_leaves_world_unchanged() {
        let (mut world, _tx) = world();
        world.handle_asset_event(AssetEvent::LoadFailed {
            request: request(),
            path: "models/statue.gltf".into(),
            error: AssetError::Gltf("truncated".into()),
        });
        assert!(!world.model().is_present());
        assert_eq!(world.scene().mesh_count(), 0);
    }

    #[test]
    fn intensity_edit_reaches_materials() {
        let (mut world, _tx) = world();
        world.handle_asset_event(AssetEvent::ModelLoaded {
            request: request(),
            root: statue(),
        });
        world.apply_edit(DebugEdit::EnvMapIntensity(4.0));
        assert_eq!(first_standard(&world).unwrap().0.env_map_intensity, 4.0);

        world.apply_edit(DebugEdit::EnvMapIntensity(40.0));
        assert_eq!(world.params().env_map_intensity, 10.0);
        assert_eq!(first_standard(&world).unwrap().0.env_map_intensity, 10.0);
    }

    #[test]
    fn yaw_edit_without_model_only_records() {
        let (mut world, _tx) = world();
        world.apply_edit(DebugEdit::ModelYaw(1.0));
        assert_eq!(world.params().model_yaw, 1.0);
        assert!(world.model_node().is_none());
    }

    #[test]
    fn yaw_edit_rotates_loaded_model() {
        let (mut world, _tx) = world();
        world.handle_asset_event(AssetEvent::ModelLoaded {
            request: request(),
            root: statue(),
        });
        world.apply_edit(DebugEdit::ModelYaw(-1.25));
        assert_eq!(world.params().model_yaw, -1.25);
        assert_eq!(world.model_node().unwrap().transform.yaw(), -1.25);

        world.apply_edit(DebugEdit::ModelYaw(9.0));
        assert_eq!(world.model_node().unwrap().transform.yaw(), std::f32::consts::PI);
    }

    #[test]
    fn light_edits_reaim_at_origin() {
        let (mut world, _tx) = world();
        world.apply_edit(DebugEdit::LightX(0.0));
        world.apply_edit(DebugEdit::LightY(10.0));
        world.apply_edit(DebugEdit::LightZ(0.0));
        world.apply_edit(DebugEdit::LightIntensity(5.0));
        assert_eq!(world.light().position, Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(world.light().target, Vec3::ZERO);
        assert_eq!(world.light().direction(), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(world.light().intensity, 5.0);
    }

    #[test]
    fn tone_mapping_edit_sets_renderer_setting() {
        let (mut world, _tx) = world();
        world.handle_asset_event(AssetEvent::ModelLoaded {
            request: request(),
            root: statue(),
        });
        clear_material_updates(world.scene_mut());
        assert!(!first_standard(&world).unwrap().0.needs_update);

        world.apply_edit(DebugEdit::ToneMapping(ToneMapping::Cineon));
        assert_eq!(world.render_settings().tone_mapping, ToneMapping::Cineon);
        assert_eq!(world.params().tone_mapping, ToneMapping::Cineon);
        assert!(first_standard(&world).unwrap().0.needs_update);
    }

    #[test]
    fn environment_completion_installs_and_updates() {
        let (mut world, tx) = world();
        world.handle_asset_event(AssetEvent::ModelLoaded {
            request: request(),
            root: statue(),
        });
        clear_material_updates(world.scene_mut());

        let cube_map = Arc::new(
            CubeMap::from_faces(std::array::from_fn(|_| {
                CpuTexture::from_rgba8(2, 2, vec![128; 16], ColorSpace::Srgb).unwrap()
            }))
            .unwrap(),
        );
        tx.send(AssetEvent::EnvironmentLoaded {
            request: request(),
            cube_map: Arc::clone(&cube_map),
        })
        .unwrap();

        assert_eq!(world.drain_asset_events(), 1);
        let installed = world.scene().environment.as_ref().expect("environment set");
        assert!(Arc::ptr_eq(installed, &cube_map));
        let (material, cast) = first_standard(&world).unwrap();
        assert!(material.needs_update);
        assert!(cast);
    }

    #[test]
    fn h_key_toggles_panel() {
        let (mut world, _tx) = world();
        let press = InputEvent::KeyPressed {
            key_code: "KeyH".to_string(),
        };
        assert!(world.handle_input(&press, (800, 600)));
        assert!(world.params().visible);
        assert!(world.handle_input(&press, (800, 600)));
        assert!(!world.params().visible);
    }

    #[test]
    fn error_chain_includes_sources() {
        let error = AssetError::Io {
            path: "px.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(error_chain(&error), "failed to read 'px.png': no such file");
    }
}
