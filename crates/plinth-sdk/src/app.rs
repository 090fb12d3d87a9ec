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

//! The viewer application: winit's event loop wired to the world, the
//! renderer and the debug panel.

use crate::config::ViewerConfig;
use crate::panel::show_debug_panel;
use anyhow::{anyhow, Context, Result};
use plinth_agents::{FrameScheduler, RenderLoop, ResizeHandler, ViewerWorld};
use plinth_core::event::EventBus;
use plinth_core::platform::ViewerWindow;
use plinth_core::renderer::RenderSystem;
use plinth_infra::{
    translate_winit_input, OverlayFrame, WgpuRenderSystem, WinitWindow, WinitWindowBuilder,
};
use plinth_io::{AssetEvent, AssetService};
use std::any::Any;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

/// Asks winit for another redraw whenever the render loop wants a frame.
struct RedrawScheduler<'a> {
    window: &'a WinitWindow,
}

impl FrameScheduler for RedrawScheduler<'_> {
    fn request_next_frame(&mut self) {
        self.window.request_redraw();
    }
}

/// Everything that only exists while a window does.
struct Runtime {
    window: WinitWindow,
    renderer: WgpuRenderSystem,
    egui: egui_winit::State,
}

/// The statue viewer.
///
/// Built from a [`ViewerConfig`]; the window, renderer and asset loads are
/// started on the first `resumed` event.
pub struct Viewer {
    config: ViewerConfig,
    world: ViewerWorld,
    assets: AssetService,
    render_loop: RenderLoop,
    resize: ResizeHandler,
    runtime: Option<Runtime>,
    failure: Option<anyhow::Error>,
}

impl Viewer {
    /// Builds the world and the asset service. Nothing is loaded yet.
    pub fn new(config: ViewerConfig) -> Self {
        let bus = EventBus::<AssetEvent>::new();
        let world = ViewerWorld::new(config.world_settings(), bus.receiver().clone());
        let assets = AssetService::new(config.assets.root.clone(), bus.sender());
        Self {
            render_loop: RenderLoop::new(config.stats_interval()),
            resize: ResizeHandler::new(config.max_pixel_ratio),
            config,
            world,
            assets,
            runtime: None,
            failure: None,
        }
    }

    /// Opens the window and blocks until it is closed.
    pub fn run(config: ViewerConfig) -> Result<()> {
        log::info!("Plinth viewer: starting...");
        let event_loop = EventLoop::new().context("Failed to create the event loop")?;
        let mut viewer = Viewer::new(config);
        event_loop.run_app(&mut viewer)?;
        match viewer.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// The viewer's world.
    pub fn world(&self) -> &ViewerWorld {
        &self.world
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = WinitWindowBuilder::new()
            .with_title(self.config.window.title.clone())
            .with_dimensions(self.config.window.width, self.config.window.height)
            .build(event_loop)
            .context("Failed to create the window")?;

        let mut renderer = WgpuRenderSystem::new();
        renderer
            .init(&window)
            .map_err(|e| anyhow!("Failed to initialize the renderer: {e}"))?;
        if let Some(adapter) = renderer.adapter_summary() {
            log::info!("Rendering with {adapter}.");
        }

        let scale = window.inner().scale_factor();
        let egui = egui_winit::State::new(
            egui::Context::default(),
            egui::ViewportId::ROOT,
            window.inner(),
            Some(scale as f32),
            window.inner().theme(),
            None,
        );

        let mut runtime = Runtime {
            window,
            renderer,
            egui,
        };
        resize_to_window(&self.resize, &mut self.world, &mut runtime, scale);

        let environment = self.assets.load_environment(
            &self.config.assets.environment,
            self.config.assets.faces.clone(),
        );
        let model = self.assets.load_model(&self.config.assets.model);
        log::debug!(
            "Requested environment ({}) and model ({}).",
            environment.get(),
            model.get()
        );

        runtime.window.request_redraw();
        self.runtime = Some(runtime);
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };
        let Runtime {
            window,
            renderer,
            egui,
        } = runtime;

        let raw_input = egui.take_egui_input(window.inner());
        let params = *self.world.params();
        let model_loaded = self.world.model().is_present();
        let stats = self.render_loop.snapshot();
        let mut edits = Vec::new();
        let output = egui.egui_ctx().run(raw_input, |ctx| {
            edits = show_debug_panel(ctx, &params, model_loaded, stats);
        });
        egui.handle_platform_output(window.inner(), output.platform_output);
        for edit in edits {
            self.world.apply_edit(edit);
        }

        let overlay = OverlayFrame {
            primitives: egui.egui_ctx().tessellate(output.shapes, output.pixels_per_point),
            textures_delta: output.textures_delta,
        };
        let mut scheduler = RedrawScheduler { window };
        // A failed render stops the loop; the window stays open until closed.
        if let Err(e) = self.render_loop.tick_with_overlay(
            &mut self.world,
            renderer,
            &mut scheduler,
            Some(&overlay as &dyn Any),
        ) {
            log::warn!("No further frames will be drawn ({e}). Close the window to exit.");
        }
    }
}

/// Runs the resize handler with the window's logical size.
fn resize_to_window(
    resize: &ResizeHandler,
    world: &mut ViewerWorld,
    runtime: &mut Runtime,
    scale: f64,
) {
    let logical: LogicalSize<u32> = runtime.window.inner().inner_size().to_logical(scale);
    resize.on_resize(
        world,
        &mut runtime.renderer,
        logical.width,
        logical.height,
        scale as f32,
    );
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.runtime.is_some() {
            return;
        }
        log::info!("Application resumed. Creating the window and renderer...");
        if let Err(e) = self.start(event_loop) {
            log::error!("{e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };
        if runtime.window.inner().id() != id {
            return;
        }

        let response = runtime.egui.on_window_event(runtime.window.inner(), &event);

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{} physical.", size.width, size.height);
                let scale = runtime.window.inner().scale_factor();
                resize_to_window(&self.resize, &mut self.world, runtime, scale);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::debug!("Scale factor changed to {scale_factor}.");
                resize_to_window(&self.resize, &mut self.world, runtime, *scale_factor);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {
                if response.repaint {
                    runtime.window.request_redraw();
                }
                if response.consumed {
                    return;
                }
                if let Some(input) = translate_winit_input(&event) {
                    let viewport = runtime.window.inner_size();
                    self.world.handle_input(&input, viewport);
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut runtime) = self.runtime.take() {
            runtime.renderer.shutdown();
            log::info!("Renderer shut down.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_agents::DebugEdit;
    use plinth_core::renderer::ToneMapping;

    #[test]
    fn new_viewer_reflects_the_config() {
        let config = ViewerConfig {
            env_map_intensity: 3.0,
            tone_mapping: ToneMapping::Linear,
            show_debug_panel: true,
            ..ViewerConfig::default()
        };
        let viewer = Viewer::new(config);
        let params = viewer.world().params();
        assert_eq!(params.env_map_intensity, 3.0);
        assert_eq!(params.tone_mapping, ToneMapping::Linear);
        assert!(params.visible);
        assert!(viewer.runtime.is_none());
        assert!(viewer.world().model_node().is_none());
        // Animation time only starts with the first frame.
        assert!(!viewer.render_loop.clock().is_started());
    }

    #[test]
    fn panel_edits_reach_the_world() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.world.apply_edit(DebugEdit::LightIntensity(5.0));
        assert_eq!(viewer.world().light().intensity, 5.0);
    }
}
