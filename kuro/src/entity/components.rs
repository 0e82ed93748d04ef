//! Built-in components: Transform and MeshRenderer

use crate::entity::component::{Component, Hoverable};
use crate::entity::world::EntityId;
use crate::graphics::{DrawUniforms, RenderContext, Triangle};
use crate::math;
use crate::picking::Ray;
use crate::resources::{ResourceKind, ResourceRegistry};
use glam::{Mat4, Vec3};
use kuro_derive::{FieldEnum, Fields};
use std::any::Any;
use std::cell::RefCell;
use tracing::trace;

/// Position, rotation, and scale of an entity.
///
/// Rotation is kept as Euler angles in degrees (yaw/pitch/roll order) so
/// gizmo edits always go through the decomposed form; the matrix is
/// recomposed on every read.
#[derive(Debug, Clone, Fields)]
pub struct Transform {
    pub position: Vec3,
    pub euler_rotation: Vec3,
    pub scale: Vec3,
    entity: Option<EntityId>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            euler_rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            entity: None,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, euler_rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            euler_rotation,
            scale,
            entity: None,
        }
    }

    /// Decompose an arbitrary transform into editable components. Euler
    /// angles come back wrapped into `[0, 360)`.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (position, euler_rotation, scale) = math::decompose(matrix);
        Self::new(position, euler_rotation, scale)
    }

    pub fn matrix(&self) -> Mat4 {
        math::compose(self.position, self.euler_rotation, self.scale)
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }
}

impl Component for Transform {
    fn type_name(&self) -> &'static str {
        "Transform"
    }

    fn on_attach(&mut self, entity: EntityId) {
        self.entity = Some(entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// How a mesh participates in shadow rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FieldEnum)]
pub enum ShadowCasting {
    #[default]
    On,
    Off,
    ShadowsOnly,
}

/// Draws a mesh resource under the owning entity's world transform.
///
/// The mesh is referenced by registry name; its pick-testable triangle list
/// is resolved lazily and cached until the reference changes.
#[derive(Fields)]
pub struct MeshRenderer {
    #[field(resource)]
    pub mesh: Option<String>,
    #[field(choice)]
    pub shadow_casting: ShadowCasting,
    entity: Option<EntityId>,
    triangles: RefCell<Option<(String, Vec<Triangle>)>>,
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self {
            mesh: None,
            shadow_casting: ShadowCasting::default(),
            entity: None,
            triangles: RefCell::new(None),
        }
    }
}

impl MeshRenderer {
    pub fn new(mesh: impl Into<String>) -> Self {
        Self {
            mesh: Some(mesh.into()),
            ..Default::default()
        }
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// Refreshes the cached triangle list if the mesh reference changed.
    /// Leaves the cache empty when the reference is unset or dangling.
    fn refresh_triangles(&self, resources: &ResourceRegistry) {
        let mut cache = self.triangles.borrow_mut();

        let Some(name) = &self.mesh else {
            *cache = None;
            return;
        };
        if matches!(&*cache, Some((cached, _)) if cached == name) {
            return;
        }

        match resources.get(name) {
            Ok(resource) => match resource.kind() {
                ResourceKind::Mesh(mesh_ref) => {
                    *cache = Some((name.clone(), mesh_ref.triangles()));
                }
                ResourceKind::Model(_) => {
                    trace!(name, "Mesh reference points at a model resource");
                    *cache = None;
                }
            },
            Err(_) => {
                trace!(name, "Mesh reference is dangling");
                *cache = None;
            }
        }
    }
}

impl Component for MeshRenderer {
    fn type_name(&self) -> &'static str {
        "Mesh renderer"
    }

    fn on_attach(&mut self, entity: EntityId) {
        self.entity = Some(entity);
    }

    fn render(&mut self, ctx: &mut RenderContext) {
        let Some(name) = &self.mesh else {
            return;
        };
        let Ok(resource) = ctx.resources.get(name) else {
            trace!(name, "Skipping draw for dangling mesh reference");
            return;
        };
        let ResourceKind::Mesh(mesh_ref) = resource.kind() else {
            return;
        };

        let uniforms = DrawUniforms {
            world: ctx.world,
            view: ctx.view,
            projection: ctx.projection,
        };
        for part in mesh_ref.model.mesh_parts(mesh_ref.node) {
            part.draw(ctx.device, &uniforms);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_hoverable(&self) -> Option<&dyn Hoverable> {
        Some(self)
    }
}

impl Hoverable for MeshRenderer {
    fn is_hovered(&self, ray: &Ray, world: Mat4, resources: &ResourceRegistry) -> bool {
        self.refresh_triangles(resources);

        let cache = self.triangles.borrow();
        let Some((_, triangles)) = &*cache else {
            return false;
        };

        triangles.iter().any(|tri| {
            let v0 = world.transform_point3(tri[0]);
            let v1 = world.transform_point3(tri[1]);
            let v2 = world.transform_point3(tri[2]);
            ray.intersects_triangle(v0, v1, v2).is_some()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::raw::RawMaterial;
    use crate::assets::{Model, RawMesh, RawNode, RawScene};
    use crate::fields::{FieldAccess, FieldError, FieldTag, FieldValue};
    use crate::graphics::{RecordingDevice, Vertex};
    use crate::resources::{MeshRef, Resource, ResourceRegistry};
    use std::sync::Arc;

    #[derive(Fields, Default)]
    struct Probe {
        pub shown: f32,
        #[field(hidden)]
        pub concealed: f32,
        #[field(visible, label = "Speed")]
        secret: f32,
        #[field(readonly)]
        pub locked: f32,
        pub title: String,
        pub count: u32,
        pub active: bool,
        pub offset: glam::Vec2,
        internal: f32,
    }

    #[test]
    fn test_field_visibility_precedence() {
        let probe = Probe::default();
        let names: Vec<&str> = probe.fields().iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["shown", "secret", "locked", "title", "count", "active", "offset"]
        );
    }

    #[test]
    fn test_primitive_field_round_trips() {
        let mut probe = Probe::default();
        probe.set_field("title", FieldValue::Str("cube".into())).unwrap();
        probe.set_field("count", FieldValue::Int(3)).unwrap();
        probe.set_field("active", FieldValue::Bool(true)).unwrap();
        probe
            .set_field("offset", FieldValue::Vec2(glam::Vec2::new(1.0, 2.0)))
            .unwrap();

        assert_eq!(probe.get_field("title"), Ok(FieldValue::Str("cube".into())));
        assert_eq!(probe.get_field("count"), Ok(FieldValue::Int(3)));
        assert_eq!(probe.get_field("active"), Ok(FieldValue::Bool(true)));
        assert_eq!(
            probe.get_field("offset"),
            Ok(FieldValue::Vec2(glam::Vec2::new(1.0, 2.0)))
        );
    }

    #[test]
    fn test_field_label_override() {
        let probe = Probe::default();
        let secret = probe.fields().iter().find(|f| f.name == "secret").unwrap();
        assert_eq!(secret.label(), "Speed");
        let shown = probe.fields().iter().find(|f| f.name == "shown").unwrap();
        assert_eq!(shown.label(), "Shown");
    }

    #[test]
    fn test_read_only_write_rejected_and_value_kept() {
        let mut probe = Probe {
            locked: 7.0,
            ..Default::default()
        };
        let result = probe.set_field("locked", FieldValue::Float(1.0));
        assert_eq!(result, Err(FieldError::ReadOnly("locked".into())));
        assert_eq!(probe.get_field("locked"), Ok(FieldValue::Float(7.0)));
    }

    #[test]
    fn test_type_mismatch_and_unknown_are_errors() {
        let mut probe = Probe::default();
        assert_eq!(
            probe.set_field("shown", FieldValue::Bool(true)),
            Err(FieldError::TypeMismatch("shown".into()))
        );
        assert_eq!(
            probe.set_field("missing", FieldValue::Float(0.0)),
            Err(FieldError::Unknown("missing".into()))
        );
        assert_eq!(
            probe.get_field("missing"),
            Err(FieldError::Unknown("missing".into()))
        );
    }

    #[test]
    fn test_transform_field_table() {
        let transform = Transform::default();
        let names: Vec<&str> = transform.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["position", "euler_rotation", "scale"]);
        assert!(transform
            .fields()
            .iter()
            .all(|f| f.tag == FieldTag::Vec3 && !f.read_only));

        let rotation = transform
            .fields()
            .iter()
            .find(|f| f.name == "euler_rotation")
            .unwrap();
        assert_eq!(rotation.label(), "Euler rotation");
    }

    #[test]
    fn test_transform_matrix_round_trip() {
        let original = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(30.0, 45.0, 60.0),
            Vec3::new(1.0, 2.0, 0.5),
        );
        let rebuilt = Transform::from_matrix(original.matrix());

        assert!((rebuilt.position - original.position).length() < 1e-4);
        assert!((rebuilt.euler_rotation - original.euler_rotation).length() < 1e-3);
        assert!((rebuilt.scale - original.scale).length() < 1e-4);
    }

    #[test]
    fn test_mesh_renderer_field_tags() {
        let renderer = MeshRenderer::default();
        let mesh = renderer.fields().iter().find(|f| f.name == "mesh").unwrap();
        assert_eq!(mesh.tag, FieldTag::Resource);
        let shadows = renderer
            .fields()
            .iter()
            .find(|f| f.name == "shadow_casting")
            .unwrap();
        assert_eq!(shadows.tag, FieldTag::Enum);
        assert_eq!(shadows.label(), "Shadow casting");
    }

    #[test]
    fn test_resource_field_round_trip() {
        let mut renderer = MeshRenderer::default();
        renderer
            .set_field("mesh", FieldValue::Resource(Some("tri".into())))
            .unwrap();
        assert_eq!(renderer.mesh, Some("tri".to_string()));
        assert_eq!(
            renderer.get_field("mesh"),
            Ok(FieldValue::Resource(Some("tri".into())))
        );
    }

    #[test]
    fn test_enum_field_round_trip() {
        let mut renderer = MeshRenderer::default();
        assert_eq!(
            renderer.get_field("shadow_casting"),
            Ok(FieldValue::Enum("On".into()))
        );

        renderer
            .set_field("shadow_casting", FieldValue::Enum("ShadowsOnly".into()))
            .unwrap();
        assert_eq!(renderer.shadow_casting, ShadowCasting::ShadowsOnly);

        assert_eq!(
            renderer.set_field("shadow_casting", FieldValue::Enum("Sideways".into())),
            Err(FieldError::TypeMismatch("shadow_casting".into()))
        );
        assert_eq!(renderer.shadow_casting, ShadowCasting::ShadowsOnly);
    }

    #[test]
    fn test_field_enum_variant_table() {
        use crate::fields::FieldEnum;
        assert_eq!(ShadowCasting::variants(), &["On", "Off", "ShadowsOnly"]);
        assert_eq!(ShadowCasting::from_variant_name("Off"), Some(ShadowCasting::Off));
        assert_eq!(ShadowCasting::from_variant_name("Sideways"), None);
    }

    fn registry_with_triangle(name: &str) -> (ResourceRegistry, RecordingDevice) {
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
        registry.add(Resource::mesh(name, "model", mesh_ref)).unwrap();
        (registry, device)
    }

    #[test]
    fn test_no_mesh_assigned_is_never_hovered() {
        let renderer = MeshRenderer::default();
        let registry = ResourceRegistry::new();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

        assert!(!renderer.is_hovered(&ray, Mat4::IDENTITY, &registry));
    }

    #[test]
    fn test_dangling_mesh_reference_is_never_hovered() {
        let renderer = MeshRenderer::new("missing");
        let registry = ResourceRegistry::new();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

        assert!(!renderer.is_hovered(&ray, Mat4::IDENTITY, &registry));
    }

    #[test]
    fn test_hover_respects_world_transform() {
        let (registry, _device) = registry_with_triangle("tri");
        let renderer = MeshRenderer::new("tri");
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

        assert!(renderer.is_hovered(&ray, Mat4::IDENTITY, &registry));

        // Moved far to the side the same ray misses
        let offset = Mat4::from_translation(Vec3::new(100.0, 0.0, 0.0));
        assert!(!renderer.is_hovered(&ray, offset, &registry));
    }

    #[test]
    fn test_triangle_cache_refreshes_when_reference_changes() {
        let (registry, _device) = registry_with_triangle("tri");
        let mut renderer = MeshRenderer::new("tri");
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

        assert!(renderer.is_hovered(&ray, Mat4::IDENTITY, &registry));

        renderer.mesh = Some("missing".into());
        assert!(!renderer.is_hovered(&ray, Mat4::IDENTITY, &registry));
    }

    #[test]
    fn test_render_draws_every_part() {
        let (registry, mut device) = registry_with_triangle("tri");
        let mut renderer = MeshRenderer::new("tri");

        let draws_before = device.draws.len();
        let mut ctx = RenderContext {
            device: &mut device,
            resources: &registry,
            world: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        renderer.render(&mut ctx);
        assert_eq!(device.draws.len(), draws_before + 1);
    }
}
