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

//! glTF 2.0 scene loader with support for both embedded and external resources.
//!
//! The whole default scene is converted: node hierarchy, local transforms,
//! every triangle primitive, and metallic-roughness materials with their
//! textures. The result is a single group node owning the scene's roots.

use super::resource_resolver::GltfResourceResolver;
use super::texture_loader::TextureLoader;
use crate::error::AssetError;
use crate::loader::AssetLoader;
use base64::Engine;
use gltf::{mesh::Reader, Buffer};
use plinth_core::asset::{ColorSpace, CpuTexture};
use plinth_core::math::{Euler, LinearRgba, Quaternion, Vec2, Vec3, Vec4};
use plinth_core::scene::{
    AlphaMode, Material, Mesh, MeshNode, Node, StandardMaterial, Transform, UnlitMaterial,
};
use std::collections::HashMap;
use std::{error::Error, sync::Arc};

/// Loads a glTF document into a scene-graph subtree.
#[derive(Clone)]
pub struct GltfLoader {
    resolver: Arc<dyn GltfResourceResolver>,
}

impl GltfLoader {
    /// Creates a new glTF loader with the given resource resolver.
    pub fn new(resolver: Arc<dyn GltfResourceResolver>) -> Self {
        Self { resolver }
    }

    /// Parses `bytes` (JSON `.gltf` or binary `.glb`) into a node tree.
    pub fn load_document(&self, bytes: &[u8]) -> Result<Node, AssetError> {
        let gltf = gltf::Gltf::from_slice(bytes)
            .map_err(|e| AssetError::Gltf(format!("failed to parse document: {e}")))?;

        let buffers = self.load_buffer_data(&gltf)?;

        let scene = gltf
            .default_scene()
            .or_else(|| gltf.scenes().next())
            .ok_or_else(|| AssetError::Gltf("document contains no scene".to_string()))?;

        let mut builder = SceneBuilder {
            buffers: &buffers,
            resolver: &*self.resolver,
            textures: HashMap::new(),
            materials: HashMap::new(),
            meshes: HashMap::new(),
        };

        let mut root = Node::group(scene.name().or(Some("glTF")));
        for node in scene.nodes() {
            root.add_child(builder.convert_node(&node)?);
        }
        log::debug!(
            "Loaded glTF scene with {} mesh nodes and {} textures.",
            root.mesh_count(),
            builder.textures.len()
        );
        Ok(root)
    }

    fn load_buffer_data(&self, gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>, AssetError> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .as_deref()
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| {
                        AssetError::Gltf(
                            "GLB file references binary chunk but it is missing".to_string(),
                        )
                    })?,
                gltf::buffer::Source::Uri(uri) => {
                    if uri.starts_with("data:") {
                        decode_data_uri(uri).map_err(|source| AssetError::Decode {
                            what: format!("buffer {}", buffer.index()),
                            source,
                        })?
                    } else {
                        self.resolver
                            .resolve_buffer(uri)
                            .map_err(|source| AssetError::Decode {
                                what: uri.to_string(),
                                source,
                            })?
                    }
                }
            };
            if data.len() < buffer.length() {
                return Err(AssetError::Gltf(format!(
                    "buffer {} holds {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }
}

impl AssetLoader<Node> for GltfLoader {
    fn load(&self, bytes: &[u8]) -> Result<Node, Box<dyn Error + Send + Sync>> {
        self.load_document(bytes).map_err(Into::into)
    }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
    let payload = uri
        .split_once(";base64,")
        .map(|(_, data)| data)
        .ok_or_else(|| format!("Unsupported data URI format: {}", truncate(uri)))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(Into::into)
}

fn truncate(uri: &str) -> &str {
    match uri.char_indices().nth(48) {
        Some((i, _)) => &uri[..i],
        None => uri,
    }
}

/// Conversion state for one document. Caches are keyed by glTF index so
/// shared meshes, materials and images are decoded once.
struct SceneBuilder<'a> {
    buffers: &'a [Vec<u8>],
    resolver: &'a dyn GltfResourceResolver,
    textures: HashMap<(usize, ColorSpace), Arc<CpuTexture>>,
    materials: HashMap<Option<usize>, Material>,
    meshes: HashMap<usize, Vec<(Arc<Mesh>, Material)>>,
}

impl SceneBuilder<'_> {
    fn convert_node(&mut self, node: &gltf::Node<'_>) -> Result<Node, AssetError> {
        let mut primitives = match node.mesh() {
            Some(mesh) => self.mesh_primitives(&mesh)?,
            None => Vec::new(),
        };

        let mut out = if primitives.len() == 1 {
            let (mesh, material) = primitives.remove(0);
            Node::mesh(node.name(), MeshNode::new(mesh, material))
        } else {
            let mut group = Node::group(node.name());
            for (mesh, material) in primitives {
                group.add_child(Node::mesh(None, MeshNode::new(mesh, material)));
            }
            group
        };
        out.transform = convert_transform(node.transform());

        for child in node.children() {
            out.add_child(self.convert_node(&child)?);
        }
        Ok(out)
    }

    fn mesh_primitives(
        &mut self,
        mesh: &gltf::Mesh<'_>,
    ) -> Result<Vec<(Arc<Mesh>, Material)>, AssetError> {
        if let Some(cached) = self.meshes.get(&mesh.index()) {
            return Ok(cached.clone());
        }

        let label = mesh
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("mesh {}", mesh.index()));
        let mut converted = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping primitive {} of '{label}': {:?} topology is not supported.",
                    primitive.index(),
                    primitive.mode()
                );
                continue;
            }
            let geometry = self.convert_primitive(&primitive, &label)?;
            let material = self.material(&primitive.material())?;
            converted.push((Arc::new(geometry), material));
        }

        self.meshes.insert(mesh.index(), converted.clone());
        Ok(converted)
    }

    fn convert_primitive(
        &self,
        primitive: &gltf::Primitive<'_>,
        label: &str,
    ) -> Result<Mesh, AssetError> {
        let buffers = self.buffers;
        let get_buffer_data = |buffer: Buffer<'_>| buffers.get(buffer.index()).map(Vec::as_slice);
        let reader = primitive.reader(get_buffer_data);

        let positions = extract_positions(&reader).ok_or_else(|| AssetError::MissingAttribute {
            mesh: label.to_string(),
            attribute: "POSITION",
        })?;
        let normals = extract_normals(&reader);
        let tex_coords = extract_tex_coords(&reader);
        let tangents = extract_tangents(&reader);
        let indices = extract_indices(&reader);

        if let Some(indices) = &indices {
            if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                return Err(AssetError::Gltf(format!(
                    "'{label}' index {bad} is out of range for {} vertices",
                    positions.len()
                )));
            }
        }

        let mesh = Mesh::new(positions, normals, tex_coords, indices);
        Ok(match tangents {
            Some(t) => mesh.with_tangents(t),
            None => mesh,
        })
    }

    fn material(&mut self, material: &gltf::Material<'_>) -> Result<Material, AssetError> {
        if let Some(cached) = self.materials.get(&material.index()) {
            return Ok(cached.clone());
        }

        let pbr = material.pbr_metallic_roughness();
        let [r, g, b, a] = pbr.base_color_factor();
        let base_color = LinearRgba::new(r, g, b, a);

        let converted = if material.unlit() {
            Material::Unlit(UnlitMaterial {
                color: base_color,
                texture: self.texture_from_info(pbr.base_color_texture(), ColorSpace::Srgb)?,
                double_sided: material.double_sided(),
            })
        } else {
            let [er, eg, eb] = material.emissive_factor();
            let normal = material.normal_texture();
            Material::Standard(StandardMaterial {
                base_color,
                base_color_texture: self
                    .texture_from_info(pbr.base_color_texture(), ColorSpace::Srgb)?,
                metallic: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
                metallic_roughness_texture: self
                    .texture_from_info(pbr.metallic_roughness_texture(), ColorSpace::Linear)?,
                normal_scale: normal.as_ref().map_or(1.0, |n| n.scale()),
                normal_texture: match normal {
                    Some(n) => Some(self.texture(&n.texture(), ColorSpace::Linear)?),
                    None => None,
                },
                occlusion_texture: match material.occlusion_texture() {
                    Some(o) => Some(self.texture(&o.texture(), ColorSpace::Linear)?),
                    None => None,
                },
                emissive: LinearRgba::rgb(er, eg, eb),
                emissive_texture: self
                    .texture_from_info(material.emissive_texture(), ColorSpace::Srgb)?,
                alpha_mode: match material.alpha_mode() {
                    gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
                    gltf::material::AlphaMode::Mask => {
                        AlphaMode::Mask(material.alpha_cutoff().unwrap_or(0.5))
                    }
                    gltf::material::AlphaMode::Blend => AlphaMode::Blend,
                },
                double_sided: material.double_sided(),
                ..StandardMaterial::default()
            })
        };

        self.materials.insert(material.index(), converted.clone());
        Ok(converted)
    }

    fn texture_from_info(
        &mut self,
        info: Option<gltf::texture::Info<'_>>,
        color_space: ColorSpace,
    ) -> Result<Option<Arc<CpuTexture>>, AssetError> {
        match info {
            Some(info) => {
                if info.tex_coord() != 0 {
                    log::warn!(
                        "Texture {} uses TEXCOORD_{}; only set 0 is read.",
                        info.texture().index(),
                        info.tex_coord()
                    );
                }
                Ok(Some(self.texture(&info.texture(), color_space)?))
            }
            None => Ok(None),
        }
    }

    fn texture(
        &mut self,
        texture: &gltf::Texture<'_>,
        color_space: ColorSpace,
    ) -> Result<Arc<CpuTexture>, AssetError> {
        let image = texture.source();
        let key = (image.index(), color_space);
        if let Some(cached) = self.textures.get(&key) {
            return Ok(cached.clone());
        }

        let label = image
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("image {}", image.index()));
        let bytes = self.image_bytes(&image).map_err(|source| AssetError::Decode {
            what: label.clone(),
            source,
        })?;
        let decoded = TextureLoader { color_space }
            .load(&bytes)
            .map_err(|source| AssetError::Decode {
                what: label,
                source,
            })?;

        let decoded = Arc::new(decoded);
        self.textures.insert(key, decoded.clone());
        Ok(decoded)
    }

    fn image_bytes(
        &self,
        image: &gltf::Image<'_>,
    ) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        match image.source() {
            gltf::image::Source::View { view, .. } => {
                let buffer = self
                    .buffers
                    .get(view.buffer().index())
                    .ok_or("image references a missing buffer")?;
                let start = view.offset();
                let end = start + view.length();
                buffer
                    .get(start..end)
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| "image buffer view is out of range".into())
            }
            gltf::image::Source::Uri { uri, .. } => {
                if uri.starts_with("data:") {
                    decode_data_uri(uri)
                } else {
                    self.resolver.resolve_image(uri)
                }
            }
        }
    }
}

fn convert_transform(transform: gltf::scene::Transform) -> Transform {
    let (translation, [x, y, z, w], scale) = transform.decomposed();
    Transform {
        translation: Vec3::from(translation),
        rotation: Euler::from_quaternion(Quaternion::new(x, y, z, w)),
        scale: Vec3::from(scale),
    }
}

fn extract_positions<'a, 's, F>(reader: &Reader<'a, 's, F>) -> Option<Vec<Vec3>>
where
    F: Clone + Fn(Buffer<'a>) -> Option<&'s [u8]>,
{
    reader
        .read_positions()
        .map(|iter| iter.map(|[x, y, z]| Vec3::new(x, y, z)).collect())
}

fn extract_normals<'a, 's, F>(reader: &Reader<'a, 's, F>) -> Option<Vec<Vec3>>
where
    F: Clone + Fn(Buffer<'a>) -> Option<&'s [u8]>,
{
    reader
        .read_normals()
        .map(|iter| iter.map(|[x, y, z]| Vec3::new(x, y, z)).collect())
}

fn extract_tex_coords<'a, 's, F>(reader: &Reader<'a, 's, F>) -> Option<Vec<Vec2>>
where
    F: Clone + Fn(Buffer<'a>) -> Option<&'s [u8]>,
{
    reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().map(|[x, y]| Vec2::new(x, y)).collect())
}

fn extract_tangents<'a, 's, F>(reader: &Reader<'a, 's, F>) -> Option<Vec<Vec4>>
where
    F: Clone + Fn(Buffer<'a>) -> Option<&'s [u8]>,
{
    reader
        .read_tangents()
        .map(|iter| iter.map(|[x, y, z, w]| Vec4::new(x, y, z, w)).collect())
}

fn extract_indices<'a, 's, F>(reader: &Reader<'a, 's, F>) -> Option<Vec<u32>>
where
    F: Clone + Fn(Buffer<'a>) -> Option<&'s [u8]>,
{
    reader.read_indices().map(|iter| iter.into_u32().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::FileSystemResolver;
    use plinth_core::scene::NodeKind;

    const TRIANGLE_BUFFER: &str =
        "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA=";

    fn document(extra_primitive: bool) -> String {
        let second = if extra_primitive {
            r#",{"attributes":{"POSITION":0},"material":1}"#
        } else {
            ""
        };
        format!(
            r#"{{
  "asset": {{"version": "2.0"}},
  "extensionsUsed": ["KHR_materials_unlit"],
  "scene": 0,
  "scenes": [{{"nodes": [0]}}],
  "nodes": [
    {{"name": "statue", "translation": [1, 2, 3], "children": [1]}},
    {{"name": "body", "mesh": 0}}
  ],
  "meshes": [{{"name": "tri", "primitives": [
    {{"attributes": {{"POSITION": 0}}, "indices": 1, "material": 0}}{second}
  ]}}],
  "materials": [
    {{"name": "marble", "doubleSided": true,
      "pbrMetallicRoughness": {{"baseColorFactor": [0.5, 0.5, 0.5, 1.0], "metallicFactor": 0.25, "roughnessFactor": 0.75}}}},
    {{"name": "flat", "extensions": {{"KHR_materials_unlit": {{}}}}}}
  ],
  "buffers": [{{"byteLength": 44, "uri": "{TRIANGLE_BUFFER}"}}],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": 36}},
    {{"buffer": 0, "byteOffset": 36, "byteLength": 6}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0]}},
    {{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}}
  ]
}}"#
        )
    }

    fn loader() -> GltfLoader {
        GltfLoader::new(Arc::new(FileSystemResolver::new(".")))
    }

    #[test]
    fn hierarchy_and_transform_are_kept() {
        let root = loader().load_document(document(false).as_bytes()).unwrap();
        assert_eq!(root.children().len(), 1);
        let statue = &root.children()[0];
        assert_eq!(statue.name.as_deref(), Some("statue"));
        assert_eq!(statue.transform.translation, Vec3::new(1.0, 2.0, 3.0));

        let body = &statue.children()[0];
        match &body.kind {
            NodeKind::Mesh(mesh_node) => {
                assert_eq!(mesh_node.mesh.triangle_count(), 1);
                assert_eq!(mesh_node.mesh.normals[0], Vec3::Z);
                let material = mesh_node.material.as_standard().unwrap();
                assert_eq!(material.metallic, 0.25);
                assert_eq!(material.roughness, 0.75);
                assert!(material.double_sided);
                assert_eq!(material.env_map_intensity, 1.0);
            }
            NodeKind::Group => panic!("single-primitive mesh should be a mesh node"),
        }
    }

    #[test]
    fn multi_primitive_mesh_becomes_group() {
        let root = loader().load_document(document(true).as_bytes()).unwrap();
        let body = &root.children()[0].children()[0];
        assert!(matches!(body.kind, NodeKind::Group));
        assert_eq!(body.children().len(), 2);
        assert_eq!(root.mesh_count(), 2);

        let second = match &body.children()[1].kind {
            NodeKind::Mesh(m) => m,
            NodeKind::Group => panic!("expected a mesh"),
        };
        assert!(matches!(second.material, Material::Unlit(_)));
        // Non-indexed primitive gets sequential indices.
        assert_eq!(second.mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn unparsable_document_is_a_gltf_error() {
        let err = loader().load_document(b"{ not json").unwrap_err();
        assert!(matches!(err, AssetError::Gltf(_)));
    }

    #[test]
    fn data_uri_with_other_mime_is_decoded() {
        let bytes = decode_data_uri("data:application/gltf-buffer;base64,AQID").unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert!(decode_data_uri("data:text/plain,hello").is_err());
    }
}
