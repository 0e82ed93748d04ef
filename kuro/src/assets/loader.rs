//! Model file loading entry point

use crate::assets::model::Model;
use crate::graphics::GraphicsDevice;
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors that can occur while loading a model file
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("glTF import error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("OBJ loading error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("incomplete scene in {path}: {detail}")]
    IncompleteScene { path: PathBuf, detail: String },
}

/// Load a model from a file, dispatching on its extension.
///
/// This call blocks until the asset is fully parsed and uploaded; a failed
/// load leaves no partial model behind.
pub fn load_model(path: &Path, device: &mut dyn GraphicsDevice) -> Result<Model, ModelLoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let raw = match extension.as_str() {
        "gltf" | "glb" => crate::assets::gltf_source::load_raw(path)?,
        "obj" => crate::assets::obj_source::load_raw(path)?,
        ext => return Err(ModelLoadError::UnsupportedFormat(ext.to_string())),
    };

    info!(path = %path.display(), "Loaded model file");
    Ok(Model::import(&raw, device))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::RecordingDevice;

    #[test]
    fn unsupported_format_is_rejected() {
        let mut device = RecordingDevice::new();
        let result = load_model(Path::new("scene.fbx"), &mut device);
        assert!(matches!(result, Err(ModelLoadError::UnsupportedFormat(_))));
    }

    #[test]
    fn missing_file_propagates_library_error() {
        let mut device = RecordingDevice::new();
        let result = load_model(Path::new("does_not_exist.gltf"), &mut device);
        assert!(result.is_err());
    }
}
