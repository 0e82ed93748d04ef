//! glTF backend for the raw asset boundary
//!
//! Flattens a glTF document into a [`RawScene`]: every primitive becomes a
//! raw mesh part, node matrices are re-laid-out into the boundary's
//! row-major convention, and cameras/lights are emitted under their node's
//! name so the importer can match them back up.

use crate::assets::loader::ModelLoadError;
use crate::assets::raw::{
    RawCamera, RawLight, RawLightKind, RawMaterial, RawMesh, RawNode, RawScene, RawTexture,
};
use crate::graphics::{Vertex, WrapMode};
use glam::{Mat4, Vec3};
use std::path::{Path, PathBuf};
use tracing::warn;

pub fn load_raw(path: &Path) -> Result<RawScene, ModelLoadError> {
    let (document, buffers, images) = gltf::import(path)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| ModelLoadError::IncompleteScene {
            path: path.to_path_buf(),
            detail: "asset contains no scene".into(),
        })?;
    if scene.nodes().len() == 0 {
        return Err(ModelLoadError::IncompleteScene {
            path: path.to_path_buf(),
            detail: "scene has no root node".into(),
        });
    }

    let materials = convert_materials(&document, &images, path);
    let (meshes, primitive_ranges) = convert_meshes(&document, &buffers, materials.default_index);

    let mut cameras = Vec::new();
    let mut lights = Vec::new();
    for node in document.nodes() {
        let name = node_name(&node);
        if let Some(camera) = node.camera() {
            cameras.push(convert_camera(name.clone(), &camera));
        }
        if let Some(light) = node.light() {
            lights.push(convert_light(name, &light));
        }
    }

    let children = scene
        .nodes()
        .map(|node| convert_node(&node, &primitive_ranges))
        .collect();
    let root = RawNode {
        name: scene.name().unwrap_or("Scene").to_string(),
        transform: Mat4::IDENTITY,
        mesh_indices: Vec::new(),
        children,
    };

    Ok(RawScene {
        root,
        meshes,
        cameras,
        lights,
        materials: materials.converted,
    })
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Node{}", node.index()))
}

fn convert_node(node: &gltf::Node, primitive_ranges: &[Vec<usize>]) -> RawNode {
    // glTF matrices are column-major; the boundary carries row-major.
    let transform = Mat4::from_cols_array_2d(&node.transform().matrix()).transpose();

    let mesh_indices = node
        .mesh()
        .map(|mesh| primitive_ranges[mesh.index()].clone())
        .unwrap_or_default();

    RawNode {
        name: node_name(node),
        transform,
        mesh_indices,
        children: node
            .children()
            .map(|child| convert_node(&child, primitive_ranges))
            .collect(),
    }
}

/// Flatten every mesh's primitives into one part list; returns the parts
/// plus, per document mesh, the indices of its parts.
fn convert_meshes(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    default_material: usize,
) -> (Vec<RawMesh>, Vec<Vec<usize>>) {
    let mut meshes = Vec::new();
    let mut ranges = vec![Vec::new(); document.meshes().len()];

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let Some(positions) = reader.read_positions() else {
                warn!(mesh = mesh.index(), "Skipping primitive without positions");
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|n| n.collect())
                .unwrap_or_default();
            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|tc| tc.into_f32().collect())
                .unwrap_or_default();

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(i, position)| Vertex {
                    position: *position,
                    normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                })
                .collect();

            let indices = reader
                .read_indices()
                .map(|i| i.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            ranges[mesh.index()].push(meshes.len());
            meshes.push(RawMesh {
                vertices,
                indices,
                material_index: primitive
                    .material()
                    .index()
                    .unwrap_or(default_material),
            });
        }
    }

    (meshes, ranges)
}

struct ConvertedMaterials {
    converted: Vec<RawMaterial>,
    /// Index of the synthesized material used by primitives without one
    default_index: usize,
}

fn convert_materials(
    document: &gltf::Document,
    images: &[gltf::image::Data],
    path: &Path,
) -> ConvertedMaterials {
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut converted: Vec<RawMaterial> = document
        .materials()
        .map(|material| {
            let pbr = material.pbr_metallic_roughness();
            let color = pbr.base_color_factor();

            let diffuse_texture = pbr.base_color_texture().and_then(|info| {
                let texture = info.texture();
                let image = texture.source();
                let data = &images[image.index()];

                let Some(pixels) = to_rgba8(data) else {
                    warn!(
                        format = ?data.format,
                        "Skipping diffuse texture with unsupported pixel format"
                    );
                    return None;
                };

                let tex_path = match image.source() {
                    gltf::image::Source::Uri { uri, .. } => base_dir.join(uri),
                    gltf::image::Source::View { .. } => {
                        PathBuf::from(format!("{}#image{}", path.display(), image.index()))
                    }
                };

                Some(RawTexture {
                    path: tex_path,
                    width: data.width,
                    height: data.height,
                    pixels,
                    wrap: convert_wrap(texture.sampler().wrap_s()),
                })
            });

            RawMaterial {
                diffuse_color: Some(Vec3::new(color[0], color[1], color[2])),
                diffuse_texture,
            }
        })
        .collect();

    let default_index = converted.len();
    converted.push(RawMaterial::default());

    ConvertedMaterials {
        converted,
        default_index,
    }
}

fn convert_wrap(mode: gltf::texture::WrappingMode) -> WrapMode {
    match mode {
        gltf::texture::WrappingMode::ClampToEdge => WrapMode::Clamp,
        gltf::texture::WrappingMode::MirroredRepeat => WrapMode::Mirror,
        gltf::texture::WrappingMode::Repeat => WrapMode::Repeat,
    }
}

fn to_rgba8(data: &gltf::image::Data) -> Option<Vec<u8>> {
    use gltf::image::Format;

    match data.format {
        Format::R8G8B8A8 => Some(data.pixels.clone()),
        Format::R8G8B8 => Some(
            data.pixels
                .chunks_exact(3)
                .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
                .collect(),
        ),
        Format::R8 => Some(
            data.pixels
                .iter()
                .flat_map(|&r| [r, r, r, 255])
                .collect(),
        ),
        _ => None,
    }
}

fn convert_camera(name: String, camera: &gltf::Camera) -> RawCamera {
    let (fov, near, far, aspect) = match camera.projection() {
        gltf::camera::Projection::Perspective(p) => (
            p.yfov(),
            p.znear(),
            p.zfar().unwrap_or(1000.0),
            p.aspect_ratio().unwrap_or(1.0),
        ),
        gltf::camera::Projection::Orthographic(o) => (0.0, o.znear(), o.zfar(), 1.0),
    };

    RawCamera {
        name,
        // glTF cameras look down local -Z from the node origin
        position: Vec3::ZERO,
        target: Vec3::NEG_Z,
        up: Vec3::Y,
        fov,
        near,
        far,
        aspect,
    }
}

fn convert_light(name: String, light: &gltf::khr_lights_punctual::Light) -> RawLight {
    use gltf::khr_lights_punctual::Kind;

    let kind = match light.kind() {
        Kind::Directional => RawLightKind::Directional {
            direction: Vec3::NEG_Z,
        },
        Kind::Point => RawLightKind::Point {
            position: Vec3::ZERO,
            attenuation_constant: 1.0,
            attenuation_linear: 0.0,
            // Punctual lights fall off with inverse-square distance
            attenuation_quadratic: 1.0,
        },
        Kind::Spot {
            inner_cone_angle,
            outer_cone_angle,
        } => RawLightKind::Spot {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            inner_cone: inner_cone_angle,
            outer_cone: outer_cone_angle,
        },
    };

    let color = Vec3::from(light.color());
    RawLight {
        name,
        kind,
        ambient_color: color,
        diffuse_color: color,
        specular_color: color,
    }
}
