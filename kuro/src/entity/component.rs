//! The component trait and its capability seams

use crate::entity::world::EntityId;
use crate::fields::FieldAccess;
use crate::graphics::RenderContext;
use crate::picking::Ray;
use crate::resources::ResourceRegistry;
use glam::Mat4;
use std::any::Any;

/// A unit of entity behavior and state.
///
/// Components are owned by exactly one entity, addressed through a slot that
/// carries the enabled flag. Hooks fire in a fixed per-frame order: every
/// enabled component's `update`, then every enabled `render`, then every
/// enabled `draw_ui`. Hook failures are not isolated; a panicking hook takes
/// the frame down with it.
pub trait Component: FieldAccess + Any {
    /// Display name used by the editor's component list
    fn type_name(&self) -> &'static str;

    /// Fired once when the component is attached to an entity
    fn on_attach(&mut self, entity: EntityId) {
        let _ = entity;
    }

    fn update(&mut self, dt: f32) {
        let _ = dt;
    }

    /// Geometry pass
    fn render(&mut self, ctx: &mut RenderContext) {
        let _ = ctx;
    }

    /// Overlay/inspector pass, always after every render hook of the frame
    fn draw_ui(&mut self, ctx: &mut RenderContext) {
        let _ = ctx;
    }

    /// Fired before the component is unlinked from its entity
    fn on_remove(&mut self) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Pick-testing capability, if this component has any geometry
    fn as_hoverable(&self) -> Option<&dyn Hoverable> {
        None
    }
}

/// Components whose geometry can be hit-tested by the viewport picker
pub trait Hoverable {
    /// True when the pick ray intersects any triangle of this component's
    /// geometry under the given world transform. Components with nothing
    /// assigned report false rather than failing.
    fn is_hovered(&self, ray: &Ray, world: Mat4, resources: &ResourceRegistry) -> bool;
}
