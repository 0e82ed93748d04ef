//! Mesh part geometry and GPU buffer lifecycle

use crate::graphics::device::{BufferId, DrawUniforms, GraphicsDevice, MaterialId};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::cell::Cell;
use tracing::warn;

/// Vertex layout shared with the graphics backend: position, normal,
/// optional UV (zeroed when the asset has no texture coordinates).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// One world-space triangle, used by hit-testing
pub type Triangle = [Vec3; 3];

#[derive(Debug, Clone, Copy)]
struct GpuBuffers {
    vertex: BufferId,
    index: BufferId,
}

/// A renderable chunk of a mesh node: triangulated geometry plus a material
/// handle. Geometry is immutable after import; the GPU buffer pair is
/// created on upload and released exactly once on dispose.
#[derive(Debug)]
pub struct MeshPart {
    pub vertices: Vec<Vertex>,
    /// Triangulated: length is always a multiple of 3
    pub indices: Vec<u32>,
    pub material: MaterialId,
    gpu: Cell<Option<GpuBuffers>>,
}

impl MeshPart {
    /// Create a part and upload its buffers
    pub fn new(
        device: &mut dyn GraphicsDevice,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        material: MaterialId,
    ) -> Self {
        let gpu = GpuBuffers {
            vertex: device.create_vertex_buffer(&vertices),
            index: device.create_index_buffer(&indices),
        };
        Self {
            vertices,
            indices,
            material,
            gpu: Cell::new(Some(gpu)),
        }
    }

    /// Create a part without touching the device (tests, headless import)
    pub fn new_unuploaded(vertices: Vec<Vertex>, indices: Vec<u32>, material: MaterialId) -> Self {
        Self {
            vertices,
            indices,
            material,
            gpu: Cell::new(None),
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.get().is_some()
    }

    /// Submit one indexed draw for this part. Disposed parts draw nothing.
    pub fn draw(&self, device: &mut dyn GraphicsDevice, uniforms: &DrawUniforms) {
        if let Some(gpu) = self.gpu.get() {
            device.draw_indexed(gpu.vertex, gpu.index, self.material, uniforms);
        }
    }

    /// Release the GPU buffers. Safe to call more than once; the handles
    /// are taken on the first call.
    pub fn dispose(&self, device: &mut dyn GraphicsDevice) {
        if let Some(gpu) = self.gpu.take() {
            device.destroy_buffer(gpu.vertex);
            device.destroy_buffer(gpu.index);
        }
    }
}

/// Flatten the parts of a mesh into one triangle list, each part's indices
/// resolved against its own vertices.
///
/// Malformed assets can carry indices past their part's vertex count;
/// those triangles are dropped rather than crashing the pick.
pub fn collect_triangles(parts: &[MeshPart]) -> Vec<Triangle> {
    let mut triangles = Vec::new();
    let mut dropped = 0usize;

    for part in parts {
        let vertex = |i: u32| {
            part.vertices
                .get(i as usize)
                .map(|v| Vec3::from(v.position))
        };
        for tri in part.indices.chunks_exact(3) {
            match (vertex(tri[0]), vertex(tri[1]), vertex(tri[2])) {
                (Some(a), Some(b), Some(c)) => triangles.push([a, b, c]),
                _ => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        warn!(dropped, "Dropped triangles with out-of-range indices");
    }
    triangles
}
