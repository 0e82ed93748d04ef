//! Entities, components, and the per-frame world driver

pub mod component;
pub mod components;
pub mod registry;
pub mod world;

pub use component::{Component, Hoverable};
pub use components::{MeshRenderer, Transform};
pub use registry::{ComponentInfo, ComponentRegistry};
pub use world::{ComponentSlot, Entity, EntityId, World};
