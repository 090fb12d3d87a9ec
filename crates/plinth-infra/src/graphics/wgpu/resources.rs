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

//! GPU-side caches for scene data.
//!
//! Meshes and textures are keyed by their CPU asset ids, materials by the
//! node that owns them. Every entry is stamped with the frame that last used
//! it; anything the current scene no longer references is released at the end
//! of preparation, which is how a replaced model frees its buffers.

use super::conversions::{align_to, IntoWgpu};
use super::pipelines::ScenePipelines;
use super::targets::ShadowMap;
use super::uniforms::{FrameUniforms, MaterialUniforms, MeshVertex, ObjectUniforms};
use plinth_core::asset::{CpuTexture, CubeMap, TextureId};
use plinth_core::math::{Mat4, Vec3};
use plinth_core::renderer::{FrameInput, ResourceError};
use plinth_core::scene::{AlphaMode, Material, Mesh, MeshId, NodeId, NodeKind};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use wgpu::util::DeviceExt;

#[derive(Debug)]
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    last_used: u64,
}

#[derive(Debug)]
struct GpuTexture {
    view: wgpu::TextureView,
    last_used: u64,
}

#[derive(Debug)]
struct GpuMaterial {
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    textures: Vec<TextureId>,
    last_used: u64,
}

/// One mesh draw, in the order the passes will issue it.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub material: NodeId,
    /// Slot in the object uniform buffer.
    pub object_index: u32,
    pub blend: bool,
    pub double_sided: bool,
    pub cast_shadow: bool,
    /// Squared distance from the eye, used to sort blended draws.
    pub view_distance: f32,
}

/// Fallbacks bound where a material has no texture of its own.
#[derive(Debug)]
struct DefaultTextures {
    white_srgb: wgpu::TextureView,
    white_linear: wgpu::TextureView,
    flat_normal: wgpu::TextureView,
}

/// Owns every buffer, texture and bind group derived from the scene.
#[derive(Debug)]
pub struct GpuResources {
    frame: u64,
    meshes: HashMap<MeshId, GpuMesh>,
    textures: HashMap<TextureId, GpuTexture>,
    materials: HashMap<NodeId, GpuMaterial>,
    // Meshes already reported as malformed.
    rejected: HashSet<MeshId>,
    defaults: DefaultTextures,
    material_sampler: wgpu::Sampler,
    env_sampler: wgpu::Sampler,
    shadow_sampler: wgpu::Sampler,
    placeholder_cube: wgpu::TextureView,
    environment: Option<(TextureId, u32, wgpu::TextureView)>,
    frame_uniforms: wgpu::Buffer,
    frame_bind_group: Option<wgpu::BindGroup>,
    frame_bind_group_key: Option<(Option<TextureId>, u32)>,
    pub shadow_frame_bind_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_capacity: u32,
    object_stride: u64,
    pub object_bind_group: wgpu::BindGroup,
}

const INITIAL_OBJECT_CAPACITY: u32 = 64;

impl GpuResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, pipelines: &ScenePipelines) -> Self {
        let defaults = DefaultTextures {
            white_srgb: solid_texture(device, queue, "White sRGB", [255; 4], wgpu::TextureFormat::Rgba8UnormSrgb),
            white_linear: solid_texture(device, queue, "White Linear", [255; 4], wgpu::TextureFormat::Rgba8Unorm),
            flat_normal: solid_texture(
                device,
                queue,
                "Flat Normal",
                [128, 128, 255, 255],
                wgpu::TextureFormat::Rgba8Unorm,
            ),
        };

        let material_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            anisotropy_clamp: 8,
            ..Default::default()
        });
        let env_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let placeholder_cube = device
            .create_texture_with_data(
                queue,
                &wgpu::TextureDescriptor {
                    label: Some("Placeholder Cube"),
                    size: wgpu::Extent3d {
                        width: 1,
                        height: 1,
                        depth_or_array_layers: 6,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: wgpu::TextureFormat::Rgba8UnormSrgb,
                    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                    view_formats: &[],
                },
                wgpu::util::TextureDataOrder::LayerMajor,
                &[0, 0, 0, 255].repeat(6),
            )
            .create_view(&cube_view_descriptor("Placeholder Cube View"));

        let frame_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let shadow_frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Frame Bind Group"),
            layout: &pipelines.shadow_frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniforms.as_entire_binding(),
            }],
        });

        let object_stride = align_to(
            std::mem::size_of::<ObjectUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (object_buffer, object_bind_group) = object_storage(
            device,
            &pipelines.object_layout,
            INITIAL_OBJECT_CAPACITY,
            object_stride,
        );

        Self {
            frame: 0,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            materials: HashMap::new(),
            rejected: HashSet::new(),
            defaults,
            material_sampler,
            env_sampler,
            shadow_sampler,
            placeholder_cube,
            environment: None,
            frame_uniforms,
            frame_bind_group: None,
            frame_bind_group_key: None,
            shadow_frame_bind_group,
            object_buffer,
            object_capacity: INITIAL_OBJECT_CAPACITY,
            object_stride,
            object_bind_group,
        }
    }

    /// Uploads whatever the frame needs, writes every uniform, and returns the
    /// draws: opaque first, then blended back to front.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &ScenePipelines,
        shadow_map: &ShadowMap,
        frame: &FrameInput<'_>,
    ) -> Vec<DrawItem> {
        self.frame += 1;
        let stamp = self.frame;

        let env_mips = self.sync_environment(device, queue, frame.scene.environment.as_ref());
        let frame_uniforms = FrameUniforms::new(frame.camera, frame.light, frame.settings, env_mips);
        queue.write_buffer(&self.frame_uniforms, 0, bytemuck::bytes_of(&frame_uniforms));
        self.sync_frame_bind_group(device, pipelines, shadow_map);

        let eye = frame.camera.position;
        let mut objects: Vec<ObjectUniforms> = Vec::new();
        let mut draws: Vec<DrawItem> = Vec::new();
        let mut pending: Vec<(NodeId, Material, Arc<Mesh>)> = Vec::new();
        let rejected = &mut self.rejected;

        frame.scene.traverse(|node, world| {
            let NodeKind::Mesh(mesh_node) = &node.kind else {
                return;
            };
            if mesh_node.mesh.indices.is_empty() {
                return;
            }
            if let Err(err) = validate_mesh(&mesh_node.mesh) {
                if rejected.insert(mesh_node.mesh.id) {
                    log::warn!("Not drawing node {:?}: {err}", node.id());
                }
                return;
            }
            let object_index = objects.len() as u32;
            objects.push(ObjectUniforms::new(world, mesh_node.receive_shadow));
            let blend = matches!(
                mesh_node.material.as_standard().map(|m| m.alpha_mode),
                Some(AlphaMode::Blend)
            );
            draws.push(DrawItem {
                mesh: mesh_node.mesh.id,
                material: node.id(),
                object_index,
                blend,
                double_sided: mesh_node.material.double_sided(),
                cast_shadow: mesh_node.cast_shadow,
                view_distance: world_origin(world).distance(eye).powi(2),
            });
            pending.push((node.id(), mesh_node.material.clone(), mesh_node.mesh.clone()));
        });

        for (node_id, material, mesh) in &pending {
            self.sync_mesh(device, mesh, stamp);
            self.sync_material(device, queue, pipelines, *node_id, material, stamp);
        }

        self.write_objects(device, queue, pipelines, &objects);
        self.evict(stamp);

        // Stable sort keeps scene order among opaque draws.
        draws.sort_by(|a, b| {
            a.blend
                .cmp(&b.blend)
                .then_with(|| match a.blend {
                    true => b.view_distance.total_cmp(&a.view_distance),
                    false => std::cmp::Ordering::Equal,
                })
        });
        draws
    }

    pub fn frame_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.frame_bind_group.as_ref()
    }

    /// Vertex buffer, index buffer and index count of a prepared mesh.
    pub fn mesh(&self, id: MeshId) -> Option<(&wgpu::Buffer, &wgpu::Buffer, u32)> {
        self.meshes
            .get(&id)
            .map(|m| (&m.vertex_buffer, &m.index_buffer, m.index_count))
    }

    pub fn material(&self, node: NodeId) -> Option<&wgpu::BindGroup> {
        self.materials.get(&node).map(|m| &m.bind_group)
    }

    /// Dynamic offset of an object slot.
    pub fn object_offset(&self, index: u32) -> u32 {
        (index as u64 * self.object_stride) as u32
    }

    /// Number of cached meshes, textures and materials.
    pub fn cached_counts(&self) -> (usize, usize, usize) {
        (self.meshes.len(), self.textures.len(), self.materials.len())
    }

    /// Uploads the scene environment once per cube map and returns its mip
    /// count, or `None` when the placeholder is bound.
    fn sync_environment(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        environment: Option<&Arc<CubeMap>>,
    ) -> Option<u32> {
        let Some(cube) = environment else {
            if self.environment.take().is_some() {
                log::debug!("Environment removed; binding placeholder cube.");
            }
            return None;
        };
        if !matches!(&self.environment, Some((id, _, _)) if *id == cube.id) {
            let view = upload_cube_map(device, queue, cube);
            log::info!(
                "Uploaded environment cube map {}x{} ({} mips).",
                cube.face_size(),
                cube.face_size(),
                cube.mip_level_count()
            );
            self.environment = Some((cube.id, cube.mip_level_count(), view));
        }
        self.environment.as_ref().map(|(_, mips, _)| *mips)
    }

    fn sync_frame_bind_group(
        &mut self,
        device: &wgpu::Device,
        pipelines: &ScenePipelines,
        shadow_map: &ShadowMap,
    ) {
        let key = (
            self.environment.as_ref().map(|(id, _, _)| *id),
            shadow_map.size,
        );
        if self.frame_bind_group.is_some() && self.frame_bind_group_key == Some(key) {
            return;
        }
        let env_view = self
            .environment
            .as_ref()
            .map_or(&self.placeholder_cube, |(_, _, view)| view);
        self.frame_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &pipelines.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.frame_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(env_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.env_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.shadow_sampler),
                },
            ],
        }));
        self.frame_bind_group_key = Some(key);
    }

    fn sync_mesh(&mut self, device: &wgpu::Device, mesh: &Mesh, stamp: u64) {
        if let Some(entry) = self.meshes.get_mut(&mesh.id) {
            entry.last_used = stamp;
            return;
        }
        let vertices = MeshVertex::interleave(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        log::debug!(
            "Uploaded mesh {:?}: {} vertices, {} triangles.",
            mesh.id,
            vertices.len(),
            mesh.triangle_count()
        );
        self.meshes.insert(
            mesh.id,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
                last_used: stamp,
            },
        );
    }

    fn sync_texture(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, texture: &CpuTexture, stamp: u64) {
        self.textures
            .entry(texture.id)
            .and_modify(|entry| entry.last_used = stamp)
            .or_insert_with(|| GpuTexture {
                view: upload_texture(device, queue, texture),
                last_used: stamp,
            });
    }

    /// Rebuilds a node's material when it is new or flagged for update;
    /// otherwise only refreshes the usage stamps.
    fn sync_material(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &ScenePipelines,
        node: NodeId,
        material: &Material,
        stamp: u64,
    ) {
        let needs_update = material.as_standard().is_some_and(|m| m.needs_update);
        if let Some(entry) = self.materials.get_mut(&node) {
            if !needs_update {
                entry.last_used = stamp;
                for id in &entry.textures {
                    if let Some(texture) = self.textures.get_mut(id) {
                        texture.last_used = stamp;
                    }
                }
                return;
            }
        }

        // base, metallic-roughness, normal, occlusion, emissive
        let slots: [Option<&Arc<CpuTexture>>; 5] = match material {
            Material::Standard(m) => [
                m.base_color_texture.as_ref(),
                m.metallic_roughness_texture.as_ref(),
                m.normal_texture.as_ref(),
                m.occlusion_texture.as_ref(),
                m.emissive_texture.as_ref(),
            ],
            Material::Unlit(m) => [m.texture.as_ref(), None, None, None, None],
        };
        for texture in slots.iter().flatten() {
            self.sync_texture(device, queue, texture, stamp);
        }
        let fallbacks = [
            &self.defaults.white_srgb,
            &self.defaults.white_linear,
            &self.defaults.flat_normal,
            &self.defaults.white_linear,
            &self.defaults.white_srgb,
        ];
        let views: Vec<&wgpu::TextureView> = slots
            .iter()
            .zip(fallbacks)
            .map(|(slot, fallback)| {
                slot.and_then(|t| self.textures.get(&t.id))
                    .map_or(fallback, |entry| &entry.view)
            })
            .collect();

        let uniforms = MaterialUniforms::new(material);
        let buffer = match self.materials.remove(&node) {
            Some(previous) => {
                queue.write_buffer(&previous.uniforms, 0, bytemuck::bytes_of(&uniforms));
                previous.uniforms
            }
            None => device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Material Uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            }),
        };

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }];
        entries.extend(views.iter().enumerate().map(|(i, view)| wgpu::BindGroupEntry {
            binding: i as u32 + 1,
            resource: wgpu::BindingResource::TextureView(view),
        }));
        entries.push(wgpu::BindGroupEntry {
            binding: 6,
            resource: wgpu::BindingResource::Sampler(&self.material_sampler),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &pipelines.material_layout,
            entries: &entries,
        });

        let textures = slots.iter().flatten().map(|t| t.id).collect();
        log::debug!("Material for node {node:?} (re)built.");
        self.materials.insert(
            node,
            GpuMaterial {
                uniforms: buffer,
                bind_group,
                textures,
                last_used: stamp,
            },
        );
    }

    fn write_objects(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &ScenePipelines,
        objects: &[ObjectUniforms],
    ) {
        if objects.is_empty() {
            return;
        }
        let count = objects.len() as u32;
        if count > self.object_capacity {
            let capacity = count.next_power_of_two();
            let (buffer, bind_group) =
                object_storage(device, &pipelines.object_layout, capacity, self.object_stride);
            log::debug!("Object uniform buffer grown to {capacity} slots.");
            self.object_buffer = buffer;
            self.object_bind_group = bind_group;
            self.object_capacity = capacity;
        }

        let stride = self.object_stride as usize;
        let mut bytes = vec![0u8; stride * objects.len()];
        for (slot, object) in bytes.chunks_exact_mut(stride).zip(objects) {
            let data = bytemuck::bytes_of(object);
            slot[..data.len()].copy_from_slice(data);
        }
        queue.write_buffer(&self.object_buffer, 0, &bytes);
    }

    fn evict(&mut self, stamp: u64) {
        let before = self.cached_counts();
        self.meshes.retain(|_, m| m.last_used == stamp);
        self.materials.retain(|_, m| m.last_used == stamp);
        self.textures.retain(|_, t| t.last_used == stamp);
        let after = self.cached_counts();
        if before != after {
            log::info!(
                "Released unused GPU resources: {} meshes, {} textures, {} materials.",
                before.0 - after.0,
                before.1 - after.1,
                before.2 - after.2
            );
        }
    }
}

/// Checks that a mesh can be uploaded as an indexed triangle list.
pub fn validate_mesh(mesh: &Mesh) -> Result<(), ResourceError> {
    let invalid = |reason: String| ResourceError::InvalidData {
        label: format!("mesh {:?}", mesh.id),
        reason,
    };
    let vertices = mesh.positions.len();
    if mesh.indices.len() % 3 != 0 {
        return Err(invalid(format!(
            "{} indices do not form whole triangles",
            mesh.indices.len()
        )));
    }
    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= vertices) {
        return Err(invalid(format!("index {index} out of range for {vertices} vertices")));
    }
    if mesh.normals.len() != vertices {
        return Err(invalid(format!("{} normals for {vertices} vertices", mesh.normals.len())));
    }
    if let Some(uvs) = mesh.tex_coords.as_ref().filter(|uvs| uvs.len() != vertices) {
        return Err(invalid(format!("{} texture coordinates for {vertices} vertices", uvs.len())));
    }
    Ok(())
}

fn world_origin(world: &Mat4) -> Vec3 {
    world.transform_point3(Vec3::ZERO)
}

fn object_storage(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: u32,
    stride: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Object Uniforms"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Object Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn solid_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    rgba: [u8; 4],
    format: wgpu::TextureFormat,
) -> wgpu::TextureView {
    device
        .create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &rgba,
        )
        .create_view(&wgpu::TextureViewDescriptor::default())
}

/// Writes every mip level of `texture` into array layer `layer`.
fn write_levels(queue: &wgpu::Queue, target: &wgpu::Texture, texture: &CpuTexture, layer: u32) {
    for (level, mip) in texture.levels.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: target,
                mip_level: level as u32,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
                aspect: wgpu::TextureAspect::All,
            },
            &mip.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * mip.width),
                rows_per_image: Some(mip.height),
            },
            wgpu::Extent3d {
                width: mip.width,
                height: mip.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, texture: &CpuTexture) -> wgpu::TextureView {
    let gpu = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Material Texture"),
        size: wgpu::Extent3d {
            width: texture.width(),
            height: texture.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: texture.mip_level_count(),
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: texture.color_space.into_wgpu(),
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    write_levels(queue, &gpu, texture, 0);
    log::debug!(
        "Uploaded texture {:?}: {}x{}, {} mips, {:?}.",
        texture.id,
        texture.width(),
        texture.height(),
        texture.mip_level_count(),
        texture.color_space
    );
    gpu.create_view(&wgpu::TextureViewDescriptor::default())
}

fn upload_cube_map(device: &wgpu::Device, queue: &wgpu::Queue, cube: &CubeMap) -> wgpu::TextureView {
    let format = cube
        .faces()
        .next()
        .map_or(wgpu::TextureFormat::Rgba8UnormSrgb, |(_, face)| face.color_space.into_wgpu());
    let gpu = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Environment Cube"),
        size: wgpu::Extent3d {
            width: cube.face_size(),
            height: cube.face_size(),
            depth_or_array_layers: 6,
        },
        mip_level_count: cube.mip_level_count(),
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for (face, texture) in cube.faces() {
        write_levels(queue, &gpu, texture, face as u32);
    }
    gpu.create_view(&cube_view_descriptor("Environment Cube View"))
}

fn cube_view_descriptor(label: &str) -> wgpu::TextureViewDescriptor<'_> {
    wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    }
}
