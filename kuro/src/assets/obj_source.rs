//! OBJ backend for the raw asset boundary
//!
//! OBJ files have no node hierarchy, so every model in the file becomes a
//! mesh part under a single node named after the file stem.

use crate::assets::loader::ModelLoadError;
use crate::assets::raw::{RawMaterial, RawMesh, RawNode, RawScene};
use crate::graphics::Vertex;
use glam::{Mat4, Vec3};
use std::path::Path;
use tracing::{debug, info, warn};

pub fn load_raw(path: &Path) -> Result<RawScene, ModelLoadError> {
    info!("Loading OBJ file: {:?}", path);

    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let mut raw_materials: Vec<RawMaterial> = materials
        .unwrap_or_default()
        .iter()
        .map(|material| {
            if material.diffuse_texture.is_some() {
                // OBJ texture maps carry no decoded pixel data here
                warn!(
                    material = %material.name,
                    "Ignoring OBJ diffuse texture; using flat color"
                );
            }
            RawMaterial {
                diffuse_color: material.diffuse.map(Vec3::from),
                diffuse_texture: None,
            }
        })
        .collect();
    // Parts without a usemtl reference fall back to this one
    let default_material = raw_materials.len();
    raw_materials.push(RawMaterial::default());

    let mut meshes = Vec::new();
    for model in &models {
        let mesh = &model.mesh;
        // tobj still emits a model for files with no geometry statements
        if mesh.positions.is_empty() {
            continue;
        }
        debug!(
            "Loaded OBJ model '{}' with {} vertices and {} indices",
            model.name,
            mesh.positions.len() / 3,
            mesh.indices.len()
        );

        let mut vertices = Vec::new();
        let num_vertices = mesh.positions.len() / 3;

        for i in 0..num_vertices {
            let pos_offset = i * 3;
            let position = [
                mesh.positions[pos_offset],
                mesh.positions[pos_offset + 1],
                mesh.positions[pos_offset + 2],
            ];

            let uv = if i * 2 + 1 < mesh.texcoords.len() {
                let tex_offset = i * 2;
                [mesh.texcoords[tex_offset], mesh.texcoords[tex_offset + 1]]
            } else {
                [0.0, 0.0]
            };

            let normal = if pos_offset + 2 < mesh.normals.len() {
                [
                    mesh.normals[pos_offset],
                    mesh.normals[pos_offset + 1],
                    mesh.normals[pos_offset + 2],
                ]
            } else {
                [0.0, 1.0, 0.0]
            };

            vertices.push(Vertex {
                position,
                normal,
                uv,
            });
        }

        if mesh.normals.is_empty() {
            calculate_normals(&mut vertices, &mesh.indices);
        }

        meshes.push(RawMesh {
            vertices,
            indices: mesh.indices.clone(),
            material_index: mesh.material_id.unwrap_or(default_material),
        });
    }

    if meshes.is_empty() {
        return Err(ModelLoadError::IncompleteScene {
            path: path.to_path_buf(),
            detail: "no mesh data found in file".into(),
        });
    }

    let node_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Mesh")
        .to_string();

    Ok(RawScene {
        root: RawNode {
            name: node_name.clone(),
            transform: Mat4::IDENTITY,
            mesh_indices: Vec::new(),
            children: vec![RawNode {
                name: node_name,
                transform: Mat4::IDENTITY,
                mesh_indices: (0..meshes.len()).collect(),
                children: Vec::new(),
            }],
        },
        meshes,
        cameras: Vec::new(),
        lights: Vec::new(),
        materials: raw_materials,
    })
}

/// Calculate normals for vertices based on face geometry
fn calculate_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for vertex in vertices.iter_mut() {
        vertex.normal = [0.0, 0.0, 0.0];
    }

    for chunk in indices.chunks(3) {
        if chunk.len() != 3 {
            continue;
        }

        let i0 = chunk[0] as usize;
        let i1 = chunk[1] as usize;
        let i2 = chunk[2] as usize;

        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }

        let v0 = Vec3::from(vertices[i0].position);
        let v1 = Vec3::from(vertices[i1].position);
        let v2 = Vec3::from(vertices[i2].position);

        let face_normal = (v1 - v0).cross(v2 - v0).normalize();

        for &i in &[i0, i1, i2] {
            let current = Vec3::from(vertices[i].normal);
            vertices[i].normal = (current + face_normal).to_array();
        }
    }

    for vertex in vertices.iter_mut() {
        vertex.normal = Vec3::from(vertex.normal).normalize().to_array();
    }
}
