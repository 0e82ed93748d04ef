//! Entity list, component slots, and the per-frame driver
//!
//! The world owns every entity; entities own their components through
//! slots. All handles are indices, never owning pointers, and everything
//! runs on the single frame thread.

use crate::entity::component::Component;
use crate::entity::components::Transform;
use crate::graphics::{GraphicsDevice, RenderContext};
use crate::picking::{Ray, Viewport};
use crate::resources::ResourceRegistry;
use glam::{Mat4, Vec2};
use std::cell::Cell;
use tracing::debug;

/// Index of an entity in the world's entity list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub usize);

/// One attached component plus its enabled flag. Disabled slots are
/// skipped by every per-frame pass, hooks included.
pub struct ComponentSlot {
    pub enabled: bool,
    pub component: Box<dyn Component>,
}

pub struct Entity {
    pub name: String,
    slots: Vec<ComponentSlot>,
    /// Slot index of the first Transform, cached after the first lookup
    transform_slot: Cell<Option<usize>>,
}

impl Entity {
    fn new(name: String) -> Self {
        Self {
            name,
            slots: Vec::new(),
            transform_slot: Cell::new(None),
        }
    }

    pub fn slots(&self) -> &[ComponentSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [ComponentSlot] {
        &mut self.slots
    }

    /// First component of type `T` in attachment order
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.slots
            .iter()
            .find_map(|slot| slot.component.as_any().downcast_ref::<T>())
    }

    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.slots
            .iter_mut()
            .find_map(|slot| slot.component.as_any_mut().downcast_mut::<T>())
    }

    /// The privileged Transform component, if any
    pub fn transform(&self) -> Option<&Transform> {
        if let Some(index) = self.transform_slot.get() {
            if let Some(slot) = self.slots.get(index) {
                if let Some(transform) = slot.component.as_any().downcast_ref::<Transform>() {
                    return Some(transform);
                }
            }
        }

        let index = self
            .slots
            .iter()
            .position(|slot| slot.component.as_any().is::<Transform>())?;
        self.transform_slot.set(Some(index));
        self.slots[index].component.as_any().downcast_ref::<Transform>()
    }

    /// World matrix from the Transform component, identity without one
    pub fn world_matrix(&self) -> Mat4 {
        self.transform()
            .map(|t| t.matrix())
            .unwrap_or(Mat4::IDENTITY)
    }
}

/// The scene: every entity, plus the current selection.
#[derive(Default)]
pub struct World {
    entities: Vec<Entity>,
    /// At most one selected entity at a time
    pub selected: Option<EntityId>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId(self.entities.len());
        let name = name.into();
        debug!(%name, id = id.0, "Adding entity");
        self.entities.push(Entity::new(name));
        id
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// First entity with the given name
    pub fn get_entity(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .position(|e| e.name == name)
            .map(EntityId)
    }

    /// Attach a component: push its slot, then fire its attach hook.
    pub fn attach(&mut self, id: EntityId, mut component: Box<dyn Component>) {
        component.on_attach(id);
        self.entities[id.0].slots.push(ComponentSlot {
            enabled: true,
            component,
        });
    }

    /// Attach a batch, each in list order with hooks fired in that order.
    pub fn attach_all(&mut self, id: EntityId, components: Vec<Box<dyn Component>>) {
        for component in components {
            self.attach(id, component);
        }
    }

    /// Remove the slot at `index`, firing the remove hook before unlinking
    /// so the hook still observes an attached component.
    pub fn remove_component(&mut self, id: EntityId, index: usize) {
        let entity = &mut self.entities[id.0];
        entity.slots[index].component.on_remove();
        entity.slots.remove(index);
        entity.transform_slot.set(None);
    }

    /// All components of type `T` across the scene, entity order then
    /// attachment order.
    pub fn components_in_scene<T: Component>(&self) -> Vec<(EntityId, &T)> {
        self.entities
            .iter()
            .enumerate()
            .flat_map(|(i, entity)| {
                entity.slots.iter().filter_map(move |slot| {
                    slot.component
                        .as_any()
                        .downcast_ref::<T>()
                        .map(|c| (EntityId(i), c))
                })
            })
            .collect()
    }

    /// Update pass: every enabled component's update hook.
    pub fn update(&mut self, dt: f32) {
        for entity in &mut self.entities {
            for slot in &mut entity.slots {
                if slot.enabled {
                    slot.component.update(dt);
                }
            }
        }
    }

    /// Render the frame in two full passes: all enabled render hooks, then
    /// all enabled draw_ui hooks, so no UI draws under later geometry.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        resources: &ResourceRegistry,
        view: Mat4,
        projection: Mat4,
    ) {
        let worlds: Vec<Mat4> = self.entities.iter().map(Entity::world_matrix).collect();

        for (entity, world) in self.entities.iter_mut().zip(&worlds) {
            for slot in &mut entity.slots {
                if slot.enabled {
                    let mut ctx = RenderContext {
                        device: &mut *device,
                        resources,
                        world: *world,
                        view,
                        projection,
                    };
                    slot.component.render(&mut ctx);
                }
            }
        }

        for (entity, world) in self.entities.iter_mut().zip(&worlds) {
            for slot in &mut entity.slots {
                if slot.enabled {
                    let mut ctx = RenderContext {
                        device: &mut *device,
                        resources,
                        world: *world,
                        view,
                        projection,
                    };
                    slot.component.draw_ui(&mut ctx);
                }
            }
        }
    }

    /// Tear everything down: fire every remove hook, then drop all
    /// components, entities, and the selection.
    pub fn clear(&mut self) {
        for entity in &mut self.entities {
            for slot in &mut entity.slots {
                slot.component.on_remove();
            }
            entity.slots.clear();
            entity.transform_slot.set(None);
        }
        self.entities.clear();
        self.selected = None;
    }

    /// Viewport pick: clears the selection, then tests every hoverable
    /// component in scene order. The owner of the last one found hovered
    /// wins, later entities overriding earlier hits.
    pub fn select_at(
        &mut self,
        screen: Vec2,
        viewport: Viewport,
        view: Mat4,
        projection: Mat4,
        resources: &ResourceRegistry,
    ) -> Option<EntityId> {
        self.selected = None;
        let ray = Ray::from_screen(screen, viewport, view, projection);

        for (i, entity) in self.entities.iter().enumerate() {
            let world = entity.world_matrix();
            for slot in &entity.slots {
                if !slot.enabled {
                    continue;
                }
                if let Some(hoverable) = slot.component.as_hoverable() {
                    if hoverable.is_hovered(&ray, world, resources) {
                        self.selected = Some(EntityId(i));
                    }
                }
            }
        }

        if let Some(id) = self.selected {
            debug!(entity = %self.entities[id.0].name, "Selected entity");
        }
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::component::Component;
    use crate::entity::components::{MeshRenderer, Transform};
    use crate::fields::{FieldError, FieldSpec, FieldValue};
    use crate::graphics::RecordingDevice;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records the order every hook fires in, shared across clones.
    #[derive(Default)]
    struct HookLog {
        events: Rc<RefCell<Vec<String>>>,
        tag: &'static str,
    }

    impl HookLog {
        fn new(events: Rc<RefCell<Vec<String>>>, tag: &'static str) -> Self {
            Self { events, tag }
        }

        fn push(&self, hook: &str) {
            self.events.borrow_mut().push(format!("{}:{}", self.tag, hook));
        }
    }

    impl crate::fields::FieldAccess for HookLog {
        fn fields(&self) -> &'static [FieldSpec] {
            &[]
        }

        fn get_field(&self, name: &str) -> Result<FieldValue, FieldError> {
            Err(FieldError::Unknown(name.to_string()))
        }

        fn set_field(&mut self, name: &str, _value: FieldValue) -> Result<(), FieldError> {
            Err(FieldError::Unknown(name.to_string()))
        }
    }

    impl Component for HookLog {
        fn type_name(&self) -> &'static str {
            "Hook log"
        }

        fn on_attach(&mut self, _entity: EntityId) {
            self.push("attach");
        }

        fn update(&mut self, _dt: f32) {
            self.push("update");
        }

        fn render(&mut self, _ctx: &mut RenderContext) {
            self.push("render");
        }

        fn draw_ui(&mut self, _ctx: &mut RenderContext) {
            self.push("draw_ui");
        }

        fn on_remove(&mut self) {
            self.push("remove");
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_attach_fires_hooks_in_order() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        let id = world.add_entity("e");

        world.attach_all(
            id,
            vec![
                Box::new(HookLog::new(events.clone(), "a")),
                Box::new(HookLog::new(events.clone(), "b")),
            ],
        );

        assert_eq!(*events.borrow(), vec!["a:attach", "b:attach"]);
    }

    #[test]
    fn test_update_skips_disabled_components() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        let id = world.add_entity("e");
        world.attach(id, Box::new(HookLog::new(events.clone(), "on")));
        world.attach(id, Box::new(HookLog::new(events.clone(), "off")));
        world.entity_mut(id).slots_mut()[1].enabled = false;
        events.borrow_mut().clear();

        world.update(0.016);

        assert_eq!(*events.borrow(), vec!["on:update"]);
    }

    #[test]
    fn test_render_runs_geometry_pass_before_any_ui() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        let a = world.add_entity("a");
        let b = world.add_entity("b");
        world.attach(a, Box::new(HookLog::new(events.clone(), "a")));
        world.attach(b, Box::new(HookLog::new(events.clone(), "b")));
        events.borrow_mut().clear();

        let mut device = RecordingDevice::new();
        let resources = ResourceRegistry::new();
        world.render(&mut device, &resources, Mat4::IDENTITY, Mat4::IDENTITY);

        assert_eq!(
            *events.borrow(),
            vec!["a:render", "b:render", "a:draw_ui", "b:draw_ui"]
        );
    }

    #[test]
    fn test_remove_hook_fires_before_unlink() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        let id = world.add_entity("e");
        world.attach(id, Box::new(HookLog::new(events.clone(), "a")));

        world.remove_component(id, 0);

        assert!(events.borrow().contains(&"a:remove".to_string()));
        assert!(world.entity(id).slots().is_empty());
    }

    #[test]
    fn test_clear_fires_all_remove_hooks_and_empties_world() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        let a = world.add_entity("a");
        let b = world.add_entity("b");
        world.attach(a, Box::new(HookLog::new(events.clone(), "a")));
        world.attach(b, Box::new(HookLog::new(events.clone(), "b")));
        world.selected = Some(a);
        events.borrow_mut().clear();

        world.clear();

        assert_eq!(*events.borrow(), vec!["a:remove", "b:remove"]);
        assert!(world.entities().is_empty());
        assert!(world.selected.is_none());
    }

    #[test]
    fn test_get_component_returns_first_in_attachment_order() {
        let mut world = World::new();
        let id = world.add_entity("e");
        world.attach(id, Box::new(Transform::new(Vec3::X, Vec3::ZERO, Vec3::ONE)));
        world.attach(id, Box::new(Transform::new(Vec3::Y, Vec3::ZERO, Vec3::ONE)));

        let first = world.entity(id).get_component::<Transform>().unwrap();
        assert_eq!(first.position, Vec3::X);
    }

    #[test]
    fn test_transform_cache_survives_removal() {
        let mut world = World::new();
        let id = world.add_entity("e");
        world.attach(id, Box::new(MeshRenderer::default()));
        world.attach(id, Box::new(Transform::new(Vec3::X, Vec3::ZERO, Vec3::ONE)));

        assert_eq!(world.entity(id).transform().unwrap().position, Vec3::X);

        // Removing the renderer shifts the transform's slot index
        world.remove_component(id, 0);
        assert_eq!(world.entity(id).transform().unwrap().position, Vec3::X);
    }

    #[test]
    fn test_components_in_scene_preserves_order() {
        let mut world = World::new();
        let a = world.add_entity("a");
        let b = world.add_entity("b");
        world.attach(b, Box::new(Transform::new(Vec3::Y, Vec3::ZERO, Vec3::ONE)));
        world.attach(a, Box::new(Transform::new(Vec3::X, Vec3::ZERO, Vec3::ONE)));

        let all = world.components_in_scene::<Transform>();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, a);
        assert_eq!(all[1].0, b);
    }

    fn registry_with_triangle() -> ResourceRegistry {
        use crate::assets::raw::{RawMaterial, RawMesh, RawNode, RawScene};
        use crate::assets::Model;
        use crate::graphics::Vertex;
        use crate::resources::{MeshRef, Resource};
        use std::sync::Arc;

        let mut device = RecordingDevice::new();
        let raw = RawScene {
            root: RawNode {
                name: "Tri".into(),
                mesh_indices: vec![0],
                ..Default::default()
            },
            meshes: vec![RawMesh {
                vertices: vec![
                    Vertex::new([-1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                    Vertex::new([1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
                    Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.5, 1.0]),
                ],
                indices: vec![0, 1, 2],
                material_index: 0,
            }],
            materials: vec![RawMaterial::default()],
            ..Default::default()
        };
        let model = Arc::new(Model::import(&raw, &mut device));
        let mesh_ref = MeshRef {
            model: model.clone(),
            node: model.meshes()[0],
        };

        let mut registry = ResourceRegistry::new();
        registry.add(Resource::model("model", model)).unwrap();
        registry
            .add(Resource::mesh("tri", "model", mesh_ref))
            .unwrap();
        registry
    }

    /// With identity view/projection the center pick ray runs straight down
    /// +Z from the origin.
    fn center_pick(world: &mut World, resources: &ResourceRegistry) -> Option<EntityId> {
        world.select_at(
            Vec2::new(50.0, 50.0),
            Viewport::new(0.0, 0.0, 100.0, 100.0),
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            resources,
        )
    }

    #[test]
    fn test_select_at_last_tested_wins_over_nearest() {
        let resources = registry_with_triangle();
        let mut world = World::new();

        let near = world.add_entity("near");
        world.attach(
            near,
            Box::new(Transform::new(Vec3::new(0.0, 0.0, 0.3), Vec3::ZERO, Vec3::ONE)),
        );
        world.attach(near, Box::new(MeshRenderer::new("tri")));

        let far = world.add_entity("far");
        world.attach(
            far,
            Box::new(Transform::new(Vec3::new(0.0, 0.0, 0.6), Vec3::ZERO, Vec3::ONE)),
        );
        world.attach(far, Box::new(MeshRenderer::new("tri")));

        // Both are under the ray; the later entity wins even though the
        // earlier one is closer.
        assert_eq!(center_pick(&mut world, &resources), Some(far));
        assert_eq!(world.selected, Some(far));
    }

    #[test]
    fn test_select_at_miss_clears_selection() {
        let resources = registry_with_triangle();
        let mut world = World::new();
        let id = world.add_entity("e");
        world.attach(
            id,
            Box::new(Transform::new(Vec3::new(100.0, 0.0, 0.5), Vec3::ZERO, Vec3::ONE)),
        );
        world.attach(id, Box::new(MeshRenderer::new("tri")));
        world.selected = Some(id);

        assert_eq!(center_pick(&mut world, &resources), None);
        assert!(world.selected.is_none());
    }

    #[test]
    fn test_select_at_skips_disabled_components() {
        let resources = registry_with_triangle();
        let mut world = World::new();
        let id = world.add_entity("e");
        world.attach(
            id,
            Box::new(Transform::new(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO, Vec3::ONE)),
        );
        world.attach(id, Box::new(MeshRenderer::new("tri")));

        assert_eq!(center_pick(&mut world, &resources), Some(id));

        world.entity_mut(id).slots_mut()[1].enabled = false;
        assert_eq!(center_pick(&mut world, &resources), None);
    }

    #[test]
    fn test_attach_sets_back_reference() {
        let mut world = World::new();
        let id = world.add_entity("e");
        world.attach(id, Box::new(Transform::default()));

        assert_eq!(world.entity(id).transform().unwrap().entity(), Some(id));
    }
}
