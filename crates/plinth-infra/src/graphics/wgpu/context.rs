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

use anyhow::anyhow;
use anyhow::Result;
use plinth_core::platform::ViewerWindowHandle;
use wgpu::SurfaceTargetUnsafe;
use wgpu::{Adapter, Instance};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// HDR target format. MSAA support is checked against it.
pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Sample count requested for the HDR target when the adapter allows it.
const PREFERRED_SAMPLE_COUNT: u32 = 4;

/// Holds the core WGPU state objects required for rendering.
/// This structure manages the connection to the graphics API for one window surface.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    #[allow(dead_code)]
    instance: Instance,
    pub surface: wgpu::Surface<'static>,
    #[allow(dead_code)]
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    // Configuration for the surface's swapchain behavior
    pub surface_config: wgpu::SurfaceConfiguration,

    // Store info for easy access
    pub adapter_name: String,
    pub adapter_backend: wgpu::Backend,
    pub adapter_device_type: wgpu::DeviceType,
    /// MSAA sample count of the HDR target: 4 when supported, else 1.
    pub sample_count: u32,
    device_lost: Arc<AtomicBool>,
}

impl WgpuGraphicsContext {
    /// Initializes the graphics context for a window surface.
    ///
    /// The adapter is chosen against the surface so the swapchain can always be
    /// configured. `surface_size` is in physical pixels.
    pub async fn new(window_handle: ViewerWindowHandle, surface_size: (u32, u32)) -> Result<Self> {
        log::info!("Initializing WGPU Graphics Context...");

        // WGPU_BACKEND and friends still apply.
        let instance = Instance::new(wgpu::InstanceDescriptor::new_without_display_handle_from_env());

        // --- 1. Create Surface ---
        // SAFETY: the handle is an Arc of the window, which the viewer keeps
        // alive until the renderer is shut down.
        let surface_target = unsafe {
            SurfaceTargetUnsafe::from_display_and_window(&window_handle, &window_handle)
                .map_err(|e| anyhow!("Failed to create surface target: {}", e))?
        };

        let surface = unsafe { instance.create_surface_unsafe(surface_target)? };
        log::debug!("WGPU surface created for the window.");

        // --- 2. Pick an adapter that can present to it ---
        let adapter: Adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("No suitable graphics adapter: {}", e))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        // --- 3. Create Logical Device and Command Queue ---
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Plinth Logical Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;
        log::info!("Logical device and command queue created.");

        device.on_uncaptured_error(Arc::new(|e: wgpu::Error| {
            log::error!("WGPU Uncaptured Error: {e:?}");
        }));
        let device_lost = Arc::new(AtomicBool::new(false));
        let lost_flag = Arc::clone(&device_lost);
        device.set_device_lost_callback(move |reason, message| {
            log::error!("WGPU device lost ({reason:?}): {message}");
            lost_flag.store(true, Ordering::Release);
        });

        let sample_count = if adapter
            .get_texture_format_features(HDR_FORMAT)
            .flags
            .sample_count_supported(PREFERRED_SAMPLE_COUNT)
        {
            PREFERRED_SAMPLE_COUNT
        } else {
            log::warn!("{PREFERRED_SAMPLE_COUNT}x MSAA unsupported for {HDR_FORMAT:?}; rendering without antialiasing.");
            1
        };

        // --- 4. Configure Surface ---
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: surface_size.0.max(1),
            height: surface_size.1.max(1),
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|m| *m == wgpu::PresentMode::Mailbox)
                .unwrap_or(wgpu::PresentMode::Fifo), // Fifo is guaranteed to be supported
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "Surface configured: {:?} {}x{} ({:?})",
            surface_format,
            surface_config.width,
            surface_config.height,
            surface_config.present_mode
        );

        Ok(WgpuGraphicsContext {
            instance,
            surface,
            adapter,
            device,
            queue,
            surface_config,
            adapter_name: adapter_info.name,
            adapter_backend: adapter_info.backend,
            adapter_device_type: adapter_info.device_type,
            sample_count,
            device_lost,
        })
    }

    /// Whether the device has been lost since creation.
    pub fn is_device_lost(&self) -> bool {
        self.device_lost.load(Ordering::Acquire)
    }

    /// Reconfigures the underlying surface (swapchain) when the window is resized.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            log::info!(
                "WGPUGraphicsContext: Resizing surface configuration to {new_width}x{new_height}"
            );
            self.surface_config.width = new_width;
            self.surface_config.height = new_height;
            self.surface.configure(&self.device, &self.surface_config);
        } else {
            log::warn!(
                "WGPUGraphicsContext: Ignoring resize request to zero dimensions: {new_width}x{new_height}"
            );
        }
    }

    /// Acquires the next swapchain image. The caller decides how to react to
    /// anything but success.
    pub fn get_current_texture(&self) -> wgpu::CurrentSurfaceTexture {
        self.surface.get_current_texture()
    }

    /// Format of the swapchain images.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Reapplies the current configuration after the surface went stale.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Returns the size of the swapchain surface, in physical pixels.
    pub fn get_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}
