//! Raw asset boundary
//!
//! Format backends (glTF, OBJ) and test fixtures produce a [`RawScene`];
//! the importer in [`model`](crate::assets::model) turns it into a node
//! tree. Node matrices at this boundary are **row-major** — the convention
//! of the original import library — loaded into `Mat4` memory verbatim,
//! i.e. transposed relative to glam's column-major layout. Cameras and
//! lights are matched to tree nodes by exact name.

use crate::graphics::{Vertex, WrapMode};
use glam::{Mat4, Vec3};
use std::path::PathBuf;

/// A parsed scene-description asset
#[derive(Debug, Default)]
pub struct RawScene {
    pub root: RawNode,
    pub meshes: Vec<RawMesh>,
    pub cameras: Vec<RawCamera>,
    pub lights: Vec<RawLight>,
    pub materials: Vec<RawMaterial>,
}

/// One node of the asset's tree
#[derive(Debug)]
pub struct RawNode {
    pub name: String,
    /// Row-major node matrix, see the module docs
    pub transform: Mat4,
    /// Indices into [`RawScene::meshes`]; non-empty makes this a mesh node
    pub mesh_indices: Vec<usize>,
    pub children: Vec<RawNode>,
}

impl Default for RawNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Mat4::IDENTITY,
            mesh_indices: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Triangulated geometry for one mesh part
#[derive(Debug, Clone)]
pub struct RawMesh {
    pub vertices: Vec<Vertex>,
    /// Every face contributes exactly 3 indices
    pub indices: Vec<u32>,
    pub material_index: usize,
}

/// Camera intrinsics, matched to a node by name
#[derive(Debug, Clone)]
pub struct RawCamera {
    pub name: String,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

/// Light parameters, matched to a node by name
#[derive(Debug, Clone)]
pub struct RawLight {
    pub name: String,
    pub kind: RawLightKind,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
}

#[derive(Debug, Clone)]
pub enum RawLightKind {
    Directional {
        direction: Vec3,
    },
    Point {
        position: Vec3,
        attenuation_constant: f32,
        attenuation_linear: f32,
        attenuation_quadratic: f32,
    },
    Spot {
        position: Vec3,
        direction: Vec3,
        inner_cone: f32,
        outer_cone: f32,
    },
}

/// Material description from the asset
#[derive(Debug, Clone, Default)]
pub struct RawMaterial {
    /// None defaults to opaque white at import
    pub diffuse_color: Option<Vec3>,
    pub diffuse_texture: Option<RawTexture>,
}

/// Decoded diffuse texture reference
#[derive(Debug, Clone)]
pub struct RawTexture {
    /// Resolved source path; the importer loads each distinct path once
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels
    pub pixels: Vec<u8>,
    pub wrap: WrapMode,
}
