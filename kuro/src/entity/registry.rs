//! Name-keyed component factories for the editor's "add component" menu

use crate::entity::component::Component;
use crate::entity::components::{MeshRenderer, Transform};

/// A registered component type: its menu metadata plus a factory that
/// produces a default instance.
pub struct ComponentInfo {
    pub name: &'static str,
    pub category: &'static str,
    /// Hidden entries can still be created by name but stay out of menus
    pub hidden: bool,
    factory: fn() -> Box<dyn Component>,
}

#[derive(Default)]
pub struct ComponentRegistry {
    entries: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the built-in component types
    pub fn with_builtin_components() -> Self {
        let mut registry = Self::new();
        registry.register::<Transform>("Transform", "Core", false);
        registry.register::<MeshRenderer>("Mesh renderer", "Rendering", false);
        registry
    }

    pub fn register<T: Component + Default>(
        &mut self,
        name: &'static str,
        category: &'static str,
        hidden: bool,
    ) {
        self.entries.push(ComponentInfo {
            name,
            category,
            hidden,
            factory: || Box::new(T::default()),
        });
    }

    /// Instantiate a registered component by name
    pub fn create(&self, name: &str) -> Option<Box<dyn Component>> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| (entry.factory)())
    }

    /// Entries shown in the editor menu, in registration order
    pub fn visible(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.entries.iter().filter(|entry| !entry.hidden)
    }

    pub fn entries(&self) -> &[ComponentInfo] {
        &self.entries
    }
}
