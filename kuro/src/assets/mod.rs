//! Model import: raw asset boundary, importer, and format backends

pub mod gltf_source;
pub mod loader;
pub mod model;
pub mod obj_source;
pub mod raw;

pub use loader::{load_model, ModelLoadError};
pub use model::{CameraNode, LightKind, LightNode, Model, ModelNode, NodeId, NodeKind};
pub use raw::{RawCamera, RawLight, RawLightKind, RawMaterial, RawMesh, RawNode, RawScene, RawTexture};
