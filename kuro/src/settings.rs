//! Editor settings management
//!
//! Persistent user preferences for the editor shell: gizmo defaults,
//! viewport camera, and recently opened scenes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Active gizmo manipulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GizmoOperation {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// Space the gizmo manipulates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GizmoMode {
    #[default]
    Local,
    World,
}

/// Main editor settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub gizmo_operation: GizmoOperation,

    #[serde(default)]
    pub gizmo_mode: GizmoMode,

    /// Viewport camera vertical field of view, degrees
    #[serde(default = "default_camera_fov")]
    pub camera_fov: f32,

    /// Most recently opened scene files, newest first
    #[serde(default)]
    pub recent_scenes: Vec<PathBuf>,

    /// Settings version for future migration support
    #[serde(default)]
    pub version: u32,
}

fn default_camera_fov() -> f32 {
    60.0
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            gizmo_operation: GizmoOperation::default(),
            gizmo_mode: GizmoMode::default(),
            camera_fov: default_camera_fov(),
            recent_scenes: Vec::new(),
            version: 1,
        }
    }
}

const MAX_RECENT_SCENES: usize = 8;

impl EditorSettings {
    /// Get the default path for the settings file
    pub fn default_path() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("editor_settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    /// when the file is missing or unparsable.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Self>(&content) {
                Ok(settings) => {
                    info!("Loaded editor settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings file: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(Self::default_path())
    }

    /// Save settings to a specific path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        info!("Saved editor settings to {:?}", path.as_ref());
        Ok(())
    }

    /// Load settings from a specific path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(&path)?;
        let settings = serde_json::from_str(&content)?;
        info!("Loaded editor settings from {:?}", path.as_ref());
        Ok(settings)
    }

    /// Move (or insert) a scene at the front of the recent list
    pub fn remember_scene(&mut self, path: PathBuf) {
        self.recent_scenes.retain(|p| *p != path);
        self.recent_scenes.insert(0, path);
        self.recent_scenes.truncate(MAX_RECENT_SCENES);
    }
}
