//! Scene editor core
//!
//! This crate provides the model-import-to-render-node pipeline, the
//! entity/component scene model with metadata-driven field editing, viewport
//! picking, and the name-keyed resource registry. Windowing, the real
//! graphics backend, and widget rendering are collaborators behind the
//! boundaries in [`graphics`] and [`fields`].

pub mod assets;
pub mod entity;
pub mod fields;
pub mod graphics;
pub mod math;
pub mod picking;
pub mod resources;
pub mod settings;

// Re-export commonly used types
pub mod prelude {
    // Entity system types
    pub use crate::entity::{
        Component, ComponentRegistry, ComponentSlot, Entity, EntityId, Hoverable, MeshRenderer,
        Transform, World,
    };

    // Asset types
    pub use crate::assets::{load_model, Model, ModelLoadError, ModelNode, NodeId, RawScene};

    // Field system types
    pub use crate::fields::{FieldAccess, FieldError, FieldSpec, FieldTag, FieldValue};

    // Math types
    pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

    // Graphics types
    pub use crate::graphics::{
        GraphicsDevice, MaterialDesc, MeshPart, RenderContext, Vertex, WrapMode,
    };

    // Picking types
    pub use crate::picking::{Ray, Viewport};

    // Resource types
    pub use crate::resources::{MeshRef, Resource, ResourceError, ResourceKind, ResourceRegistry};

    // Settings types
    pub use crate::settings::EditorSettings;

    pub use kuro_derive::{FieldEnum, Fields};
}

/// Initialize logging for the editor core
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
