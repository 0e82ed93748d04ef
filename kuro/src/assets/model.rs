//! Imported model: node tree over a flat arena, with transform composition
//!
//! The importer walks a [`RawScene`] recursively. A node referencing at
//! least one mesh becomes a mesh node aggregating all referenced parts;
//! otherwise a camera or light sharing the node's exact name makes a typed
//! node; anything else is a plain transform node. Parent/child links are
//! arena indices, never owning pointers.

use crate::assets::raw::{RawLightKind, RawNode, RawScene};
use crate::graphics::{GraphicsDevice, MaterialDesc, MaterialId, MeshPart, TextureId};
use glam::{Mat4, Vec3};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Index of a node in a model's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Camera intrinsics carried by a camera node
#[derive(Debug, Clone)]
pub struct CameraNode {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

/// Light parameters carried by a light node
#[derive(Debug, Clone)]
pub struct LightNode {
    pub kind: LightKind,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
}

#[derive(Debug, Clone)]
pub enum LightKind {
    Directional {
        direction: Vec3,
    },
    Point {
        position: Vec3,
        attenuation_constant: f32,
        attenuation_linear: f32,
        attenuation_quadratic: f32,
    },
    Spot {
        position: Vec3,
        direction: Vec3,
        inner_cone: f32,
        outer_cone: f32,
    },
}

/// What a node is, beyond its place in the tree
#[derive(Debug)]
pub enum NodeKind {
    Empty,
    Mesh { parts: Vec<MeshPart> },
    Camera(CameraNode),
    Light(LightNode),
}

/// One node of the imported tree
#[derive(Debug)]
pub struct ModelNode {
    pub name: String,
    /// Local transform relative to the parent
    pub transform: Mat4,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

/// An imported model: flat node arena, root handle, and the GPU-side
/// material/texture handles created during import.
#[derive(Debug)]
pub struct Model {
    nodes: Vec<ModelNode>,
    root: NodeId,
    materials: Vec<MaterialId>,
    /// One texture per distinct resolved source path
    textures: HashMap<PathBuf, TextureId>,
    disposed: Cell<bool>,
}

impl Model {
    /// Import a raw scene, uploading geometry and materials to the device
    pub fn import(raw: &RawScene, device: &mut dyn GraphicsDevice) -> Self {
        let mut textures = HashMap::new();
        let materials = raw
            .materials
            .iter()
            .map(|material| {
                let diffuse_texture = material.diffuse_texture.as_ref().map(|tex| {
                    *textures.entry(tex.path.clone()).or_insert_with(|| {
                        debug!(path = %tex.path.display(), "Loading diffuse texture");
                        device.create_texture(&crate::graphics::TextureDesc {
                            width: tex.width,
                            height: tex.height,
                            pixels: tex.pixels.clone(),
                            wrap: tex.wrap,
                        })
                    })
                });
                device.create_material(MaterialDesc {
                    diffuse_color: material.diffuse_color.unwrap_or(Vec3::ONE),
                    diffuse_texture,
                })
            })
            .collect::<Vec<_>>();

        let mut model = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            materials,
            textures,
            disposed: Cell::new(false),
        };
        model.root = model.process_node(&raw.root, None, raw, device);

        info!(
            nodes = model.nodes.len(),
            meshes = model.meshes().len(),
            cameras = model.cameras().len(),
            lights = model.lights().len(),
            "Imported model"
        );
        model
    }

    fn process_node(
        &mut self,
        raw_node: &RawNode,
        parent: Option<NodeId>,
        raw: &RawScene,
        device: &mut dyn GraphicsDevice,
    ) -> NodeId {
        let (kind, transform) = if !raw_node.mesh_indices.is_empty() {
            let parts = raw_node
                .mesh_indices
                .iter()
                .map(|&index| {
                    let mesh = &raw.meshes[index];
                    let material = self
                        .materials
                        .get(mesh.material_index)
                        .copied()
                        .unwrap_or(MaterialId(0));
                    MeshPart::new(device, mesh.vertices.clone(), mesh.indices.clone(), material)
                })
                .collect();
            // The asset stores matrices row-major; mesh transforms are the
            // ones consumed by rendering and must land column-major.
            (NodeKind::Mesh { parts }, raw_node.transform.transpose())
        } else if let Some(camera) = raw.cameras.iter().find(|c| c.name == raw_node.name) {
            (
                NodeKind::Camera(CameraNode {
                    position: camera.position,
                    target: camera.target,
                    up: camera.up,
                    fov: camera.fov,
                    near: camera.near,
                    far: camera.far,
                    aspect: camera.aspect,
                }),
                raw_node.transform,
            )
        } else if let Some(light) = raw.lights.iter().find(|l| l.name == raw_node.name) {
            let kind = match &light.kind {
                RawLightKind::Directional { direction } => LightKind::Directional {
                    direction: *direction,
                },
                RawLightKind::Point {
                    position,
                    attenuation_constant,
                    attenuation_linear,
                    attenuation_quadratic,
                } => LightKind::Point {
                    position: *position,
                    attenuation_constant: *attenuation_constant,
                    attenuation_linear: *attenuation_linear,
                    attenuation_quadratic: *attenuation_quadratic,
                },
                RawLightKind::Spot {
                    position,
                    direction,
                    inner_cone,
                    outer_cone,
                } => LightKind::Spot {
                    position: *position,
                    direction: *direction,
                    inner_cone: *inner_cone,
                    outer_cone: *outer_cone,
                },
            };
            (
                NodeKind::Light(LightNode {
                    kind,
                    ambient_color: light.ambient_color,
                    diffuse_color: light.diffuse_color,
                    specular_color: light.specular_color,
                }),
                raw_node.transform,
            )
        } else {
            (NodeKind::Empty, raw_node.transform)
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(ModelNode {
            name: raw_node.name.clone(),
            transform,
            parent,
            children: Vec::new(),
            kind,
        });

        for raw_child in &raw_node.children {
            let child = self.process_node(raw_child, Some(id), raw, device);
            self.nodes[id.0].children.push(child);
        }

        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &ModelNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    /// All mesh nodes, in node-creation order
    pub fn meshes(&self) -> Vec<NodeId> {
        self.filter_kind(|kind| matches!(kind, NodeKind::Mesh { .. }))
    }

    /// All camera nodes, in node-creation order
    pub fn cameras(&self) -> Vec<NodeId> {
        self.filter_kind(|kind| matches!(kind, NodeKind::Camera(_)))
    }

    /// All light nodes, in node-creation order
    pub fn lights(&self) -> Vec<NodeId> {
        self.filter_kind(|kind| matches!(kind, NodeKind::Light(_)))
    }

    fn filter_kind(&self, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| pred(&node.kind))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Mesh parts of a node, empty for non-mesh nodes
    pub fn mesh_parts(&self, id: NodeId) -> &[MeshPart] {
        match &self.node(id).kind {
            NodeKind::Mesh { parts } => parts,
            _ => &[],
        }
    }

    /// World transform: the product of every ancestor's local transform
    /// down to and including this node, composed parent-then-local.
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let node = self.node(id);
        match node.parent {
            None => node.transform,
            Some(parent) => self.world_transform(parent) * node.transform,
        }
    }

    /// Like [`world_transform`](Self::world_transform) but excluding the
    /// synthetic scene root's own transform, used when a mesh is rendered
    /// under an entity transform derived from its parent chain.
    pub fn model_transform(&self, id: NodeId) -> Mat4 {
        let node = self.node(id);
        match node.parent {
            None => node.transform,
            Some(parent) => {
                let parent_transform = if self.node(parent).parent.is_none() {
                    Mat4::IDENTITY
                } else {
                    self.model_transform(parent)
                };
                parent_transform * node.transform
            }
        }
    }

    /// Release every owned GPU handle: each mesh part's buffers and each
    /// cached texture, exactly once.
    pub fn dispose(&self, device: &mut dyn GraphicsDevice) {
        if self.disposed.replace(true) {
            return;
        }
        for node in &self.nodes {
            if let NodeKind::Mesh { parts } = &node.kind {
                for part in parts {
                    part.dispose(device);
                }
            }
        }
        for texture in self.textures.values() {
            device.destroy_texture(*texture);
        }
        debug!("Disposed model GPU resources");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::raw::{RawCamera, RawMaterial, RawMesh, RawTexture};
    use crate::graphics::{RecordingDevice, Vertex, WrapMode};

    fn triangle_mesh(material_index: usize) -> RawMesh {
        RawMesh {
            vertices: vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            ],
            indices: vec![0, 1, 2],
            material_index,
        }
    }

    fn cube_and_camera_scene() -> RawScene {
        RawScene {
            root: RawNode {
                name: "Scene".into(),
                children: vec![
                    RawNode {
                        name: "Cube".into(),
                        mesh_indices: vec![0],
                        ..Default::default()
                    },
                    RawNode {
                        name: "MainCam".into(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
            meshes: vec![triangle_mesh(0)],
            cameras: vec![RawCamera {
                name: "MainCam".into(),
                position: Vec3::ZERO,
                target: Vec3::NEG_Z,
                up: Vec3::Y,
                fov: 1.0,
                near: 0.1,
                far: 100.0,
                aspect: 16.0 / 9.0,
            }],
            lights: Vec::new(),
            materials: vec![RawMaterial::default()],
        }
    }

    #[test]
    fn import_scenario_cube_and_camera() {
        let mut device = RecordingDevice::new();
        let model = Model::import(&cube_and_camera_scene(), &mut device);

        assert_eq!(model.meshes().len(), 1);
        assert_eq!(model.cameras().len(), 1);
        assert_eq!(model.lights().len(), 0);

        let mesh = model.meshes()[0];
        assert_eq!(model.node(mesh).name, "Cube");
        assert_eq!(model.world_transform(mesh), Mat4::IDENTITY);
    }

    #[test]
    fn world_transform_composes_parent_then_local() {
        let mut device = RecordingDevice::new();
        let raw = RawScene {
            root: RawNode {
                name: "Root".into(),
                transform: Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
                children: vec![RawNode {
                    name: "Child".into(),
                    transform: Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
                    children: vec![RawNode {
                        name: "Leaf".into(),
                        transform: Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0)),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        };
        let model = Model::import(&raw, &mut device);

        let leaf = NodeId(2);
        let parent = model.node(leaf).parent.unwrap();
        assert_eq!(
            model.world_transform(leaf),
            model.world_transform(parent) * model.node(leaf).transform
        );
        assert_eq!(
            model.world_transform(leaf),
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn model_transform_excludes_scene_root() {
        let mut device = RecordingDevice::new();
        let raw = RawScene {
            root: RawNode {
                name: "Root".into(),
                transform: Mat4::from_translation(Vec3::new(100.0, 0.0, 0.0)),
                children: vec![RawNode {
                    name: "Child".into(),
                    transform: Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        };
        let model = Model::import(&raw, &mut device);

        assert_eq!(
            model.model_transform(NodeId(1)),
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))
        );
    }

    #[test]
    fn mesh_node_transform_is_transposed() {
        let mut device = RecordingDevice::new();
        let row_major = Mat4::from_cols_array(&[
            1.0, 0.0, 0.0, 5.0, //
            0.0, 1.0, 0.0, 6.0, //
            0.0, 0.0, 1.0, 7.0, //
            0.0, 0.0, 0.0, 1.0,
        ]);
        let raw = RawScene {
            root: RawNode {
                name: "Mesh".into(),
                transform: row_major,
                mesh_indices: vec![0],
                ..Default::default()
            },
            meshes: vec![triangle_mesh(0)],
            materials: vec![RawMaterial::default()],
            ..Default::default()
        };
        let model = Model::import(&raw, &mut device);

        assert_eq!(model.node(NodeId(0)).transform, row_major.transpose());
        assert_eq!(
            model.node(NodeId(0)).transform,
            Mat4::from_translation(Vec3::new(5.0, 6.0, 7.0))
        );
    }

    #[test]
    fn missing_diffuse_color_defaults_to_white() {
        let mut device = RecordingDevice::new();
        let raw = RawScene {
            root: RawNode::default(),
            materials: vec![RawMaterial {
                diffuse_color: None,
                diffuse_texture: None,
            }],
            ..Default::default()
        };
        let _ = Model::import(&raw, &mut device);
        assert_eq!(device.materials[0].diffuse_color, Vec3::ONE);
    }

    #[test]
    fn textures_load_once_per_path() {
        let mut device = RecordingDevice::new();
        let texture = RawTexture {
            path: "textures/wood.png".into(),
            width: 1,
            height: 1,
            pixels: vec![255; 4],
            wrap: WrapMode::Repeat,
        };
        let raw = RawScene {
            root: RawNode::default(),
            materials: vec![
                RawMaterial {
                    diffuse_color: Some(Vec3::ONE),
                    diffuse_texture: Some(texture.clone()),
                },
                RawMaterial {
                    diffuse_color: Some(Vec3::ZERO),
                    diffuse_texture: Some(texture),
                },
            ],
            ..Default::default()
        };
        let _ = Model::import(&raw, &mut device);

        assert_eq!(device.live_textures.len(), 1);
        assert_eq!(device.materials.len(), 2);
        assert_eq!(
            device.materials[0].diffuse_texture,
            device.materials[1].diffuse_texture
        );
    }

    #[test]
    fn dispose_releases_everything_exactly_once() {
        let mut device = RecordingDevice::new();
        let model = Model::import(&cube_and_camera_scene(), &mut device);

        model.dispose(&mut device);
        model.dispose(&mut device);

        assert!(device.live_buffers.is_empty());
        assert_eq!(device.destroyed_buffers.len(), 2);
    }
}
