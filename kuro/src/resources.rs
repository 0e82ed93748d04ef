//! Name-keyed resource registry
//!
//! Holds loaded assets (whole models and individual mesh references) under
//! unique names. Resources may name a `parent` resource; removing a parent
//! cascades depth-first through everything parented to it.

use crate::assets::{Model, NodeId};
use crate::graphics::{GraphicsDevice, TextureDesc, TextureId, Triangle, WrapMode};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Errors from registry operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("No resource named '{0}' is registered")]
    NotFound(String),

    #[error("A resource named '{0}' is already registered")]
    DuplicateName(String),
}

/// A mesh inside a shared model; references geometry, never owns it.
#[derive(Clone)]
pub struct MeshRef {
    pub model: Arc<Model>,
    pub node: NodeId,
}

impl MeshRef {
    /// Local-space triangles of every part under the referenced node.
    pub fn triangles(&self) -> Vec<Triangle> {
        crate::graphics::collect_triangles(self.model.mesh_parts(self.node))
    }
}

pub enum ResourceKind {
    /// Owns the model; removal disposes its GPU state.
    Model(Arc<Model>),
    /// Borrows geometry from a model owned elsewhere.
    Mesh(MeshRef),
}

pub struct Resource {
    name: String,
    parent: Option<String>,
    kind: ResourceKind,
    thumbnail: Cell<Option<TextureId>>,
}

impl Resource {
    pub fn model(name: impl Into<String>, model: Arc<Model>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            kind: ResourceKind::Model(model),
            thumbnail: Cell::new(None),
        }
    }

    pub fn mesh(name: impl Into<String>, parent: impl Into<String>, mesh: MeshRef) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
            kind: ResourceKind::Mesh(mesh),
            thumbnail: Cell::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Creates the preview texture on first use and reuses it afterwards.
    pub fn thumbnail(&self, device: &mut dyn GraphicsDevice) -> TextureId {
        if let Some(id) = self.thumbnail.get() {
            return id;
        }
        let id = device.create_texture(&TextureDesc {
            width: THUMBNAIL_SIZE,
            height: THUMBNAIL_SIZE,
            pixels: thumbnail_pixels(&self.kind),
            wrap: WrapMode::Clamp,
        });
        self.thumbnail.set(Some(id));
        id
    }

    fn release(&self, device: &mut dyn GraphicsDevice) {
        if let Some(id) = self.thumbnail.take() {
            device.destroy_texture(id);
        }
        if let ResourceKind::Model(model) = &self.kind {
            model.dispose(device);
        }
    }
}

const THUMBNAIL_SIZE: u32 = 64;

/// Flat tint per resource kind until real preview rendering exists.
fn thumbnail_pixels(kind: &ResourceKind) -> Vec<u8> {
    let color: [u8; 4] = match kind {
        ResourceKind::Model(_) => [90, 120, 200, 255],
        ResourceKind::Mesh(_) => [120, 200, 120, 255],
    };
    color
        .iter()
        .copied()
        .cycle()
        .take((THUMBNAIL_SIZE * THUMBNAIL_SIZE * 4) as usize)
        .collect()
}

#[derive(Default)]
pub struct ResourceRegistry {
    resources: HashMap<String, Resource>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: Resource) -> Result<(), ResourceError> {
        if self.resources.contains_key(&resource.name) {
            return Err(ResourceError::DuplicateName(resource.name.clone()));
        }
        debug!(name = %resource.name, "Registering resource");
        self.resources.insert(resource.name.clone(), resource);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Resource, ResourceError> {
        self.resources
            .get(name)
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Removes a resource, releasing its thumbnail and any owned GPU state,
    /// then removes everything parented to it, depth-first.
    pub fn remove(
        &mut self,
        name: &str,
        device: &mut dyn GraphicsDevice,
    ) -> Result<(), ResourceError> {
        let resource = self
            .resources
            .remove(name)
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))?;
        debug!(name = %resource.name, "Removing resource");
        resource.release(device);

        let children: Vec<String> = self
            .resources
            .values()
            .filter(|r| r.parent.as_deref() == Some(name))
            .map(|r| r.name.clone())
            .collect();
        for child in children {
            // Already-removed children are fine; a cascade may overlap itself.
            match self.remove(&child, device) {
                Ok(()) | Err(ResourceError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Re-keys a resource and rewrites its children's parent links.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), ResourceError> {
        if old == new {
            return Ok(());
        }
        if self.resources.contains_key(new) {
            return Err(ResourceError::DuplicateName(new.to_string()));
        }
        let mut resource = self
            .resources
            .remove(old)
            .ok_or_else(|| ResourceError::NotFound(old.to_string()))?;
        resource.name = new.to_string();
        self.resources.insert(new.to_string(), resource);

        for other in self.resources.values_mut() {
            if other.parent.as_deref() == Some(old) {
                other.parent = Some(new.to_string());
            }
        }
        Ok(())
    }

    pub fn models(&self) -> HashMap<&str, &Arc<Model>> {
        self.resources
            .values()
            .filter_map(|r| match &r.kind {
                ResourceKind::Model(model) => Some((r.name.as_str(), model)),
                _ => None,
            })
            .collect()
    }

    pub fn meshes(&self) -> HashMap<&str, &MeshRef> {
        self.resources
            .values()
            .filter_map(|r| match &r.kind {
                ResourceKind::Mesh(mesh) => Some((r.name.as_str(), mesh)),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Registers a loaded model plus one mesh resource per mesh node,
    /// parented to the model so removal cascades.
    pub fn register_model(
        &mut self,
        name: &str,
        model: Arc<Model>,
    ) -> Result<(), ResourceError> {
        self.add(Resource::model(name, model.clone()))?;
        for node in model.meshes() {
            let mesh_name = format!("{}/{}", name, model.node(node).name);
            self.add(Resource::mesh(
                mesh_name,
                name,
                MeshRef {
                    model: model.clone(),
                    node,
                },
            ))?;
        }
        Ok(())
    }
}
