//! Graphics-facing data structures and the device boundary
//!
//! The core never talks to a real graphics API; it issues buffer, texture,
//! material, and draw requests through the [`GraphicsDevice`] trait.

pub mod device;
pub mod mesh;

pub use device::{
    BufferId, DrawUniforms, GraphicsDevice, MaterialDesc, MaterialId, RecordingDevice,
    RenderContext, TextureDesc, TextureId, WrapMode,
};
pub use mesh::{collect_triangles, MeshPart, Triangle, Vertex};
