//! Graphics device boundary
//!
//! The editor core issues opaque resource and draw requests; an embedder
//! implements [`GraphicsDevice`] on top of its actual API. Handles are plain
//! ids with no lifetime semantics of their own — ownership of when to
//! release them stays with the core (models own their buffers, resources
//! own their thumbnails).

use crate::graphics::mesh::Vertex;
use glam::{Mat4, Vec3};

/// Opaque handle to a GPU vertex or index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// Opaque handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Opaque handle to a compiled material/shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u64);

/// Texture addressing mode, taken from the asset's texture-map mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Clamp,
    ClampZero,
    Repeat,
    Mirror,
}

/// Decoded RGBA8 texture upload request
#[derive(Debug, Clone)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels, `width * height * 4` bytes
    pub pixels: Vec<u8>,
    pub wrap: WrapMode,
}

/// Material description produced by the model importer
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub diffuse_color: Vec3,
    pub diffuse_texture: Option<TextureId>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            diffuse_color: Vec3::ONE,
            diffuse_texture: None,
        }
    }
}

/// Per-draw uniform data
#[derive(Debug, Clone, Copy)]
pub struct DrawUniforms {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Boundary to the rendering backend
pub trait GraphicsDevice {
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> BufferId;
    fn create_index_buffer(&mut self, indices: &[u32]) -> BufferId;
    fn destroy_buffer(&mut self, buffer: BufferId);

    fn create_texture(&mut self, desc: &TextureDesc) -> TextureId;
    fn destroy_texture(&mut self, texture: TextureId);

    fn create_material(&mut self, desc: MaterialDesc) -> MaterialId;

    fn draw_indexed(
        &mut self,
        vertex_buffer: BufferId,
        index_buffer: BufferId,
        material: MaterialId,
        uniforms: &DrawUniforms,
    );
}

/// Everything a component render hook needs for one entity
pub struct RenderContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub resources: &'a crate::resources::ResourceRegistry,
    /// World transform of the entity being rendered
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Recorded draw call issued to a [`RecordingDevice`]
#[derive(Debug, Clone, Copy)]
pub struct RecordedDraw {
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
    pub material: MaterialId,
}

/// In-memory device that records every request, used by tests and headless
/// tooling to observe handle lifetimes and draw submission.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: u64,
    pub live_buffers: Vec<BufferId>,
    pub destroyed_buffers: Vec<BufferId>,
    pub live_textures: Vec<TextureId>,
    pub destroyed_textures: Vec<TextureId>,
    pub materials: Vec<MaterialDesc>,
    pub draws: Vec<RecordedDraw>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_vertex_buffer(&mut self, _vertices: &[Vertex]) -> BufferId {
        let id = BufferId(self.next());
        self.live_buffers.push(id);
        id
    }

    fn create_index_buffer(&mut self, _indices: &[u32]) -> BufferId {
        let id = BufferId(self.next());
        self.live_buffers.push(id);
        id
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.live_buffers.retain(|b| *b != buffer);
        self.destroyed_buffers.push(buffer);
    }

    fn create_texture(&mut self, _desc: &TextureDesc) -> TextureId {
        let id = TextureId(self.next());
        self.live_textures.push(id);
        id
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.live_textures.retain(|t| *t != texture);
        self.destroyed_textures.push(texture);
    }

    fn create_material(&mut self, desc: MaterialDesc) -> MaterialId {
        self.materials.push(desc);
        MaterialId(self.materials.len() as u64 - 1)
    }

    fn draw_indexed(
        &mut self,
        vertex_buffer: BufferId,
        index_buffer: BufferId,
        material: MaterialId,
        _uniforms: &DrawUniforms,
    ) {
        self.draws.push(RecordedDraw {
            vertex_buffer,
            index_buffer,
            material,
        });
    }
}
