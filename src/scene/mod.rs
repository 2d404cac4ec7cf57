//! The seam between the exporter and the host's scene.
//!
//! The exporter never reads host scene data directly. Hosts implement
//! [`SceneObject`] for their objects and [`MeshEvaluator`] to produce the
//! final geometry of an object (with modifiers such as arrays or mirrors
//! applied). [`MeshObject`] and [`AsAuthored`] are plain in-memory versions
//! used by the CLI and tests.

pub mod geometry;

pub use geometry::{PolyMesh, Polygon};

use crate::error::Result;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// The kind of a scene object. Only meshes carry polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    #[default]
    Mesh,
    Empty,
    Other,
}

/// An object in the host scene.
pub trait SceneObject {
    fn name(&self) -> &str;

    fn kind(&self) -> ObjectKind;

    /// Object-to-world transform.
    fn matrix_world(&self) -> Mat4;

    /// Material names, indexed by [`Polygon::material_index`].
    fn material_slots(&self) -> &[String];
}

/// Final geometry of an object after the host evaluated it.
pub trait EvaluatedMesh {
    fn polygons(&self) -> &[Polygon];

    /// Object-space position of a vertex.
    fn vertex(&self, index: u32) -> Option<Vec3>;
}

/// Produces the evaluated mesh of a scene object.
///
/// The returned mesh owns whatever temporary host resource backs it and must
/// release it when dropped. Callers hold it only for the duration of one
/// object's scan, so it is released on every exit path, including errors.
pub trait MeshEvaluator<O: SceneObject + ?Sized> {
    type Mesh<'a>: EvaluatedMesh
    where
        Self: 'a,
        O: 'a;

    fn evaluate<'a>(&'a self, object: &'a O) -> Result<Self::Mesh<'a>>;
}

impl EvaluatedMesh for PolyMesh {
    fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    fn vertex(&self, index: u32) -> Option<Vec3> {
        self.vertices.get(index as usize).copied()
    }
}

impl<T: EvaluatedMesh + ?Sized> EvaluatedMesh for &T {
    fn polygons(&self) -> &[Polygon] {
        (**self).polygons()
    }

    fn vertex(&self, index: u32) -> Option<Vec3> {
        (**self).vertex(index)
    }
}

/// A scene object that carries its own mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshObject {
    pub name: String,
    #[serde(default)]
    pub kind: ObjectKind,
    /// Column-major object-to-world matrix.
    #[serde(default)]
    pub matrix_world: Mat4,
    #[serde(default)]
    pub material_slots: Vec<String>,
    #[serde(default)]
    pub mesh: PolyMesh,
}

impl MeshObject {
    pub fn new(name: impl Into<String>, mesh: PolyMesh) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Mesh,
            matrix_world: Mat4::IDENTITY,
            material_slots: Vec::new(),
            mesh,
        }
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material_slots.push(material.into());
        self
    }

    pub fn with_matrix(mut self, matrix_world: Mat4) -> Self {
        self.matrix_world = matrix_world;
        self
    }

    pub fn with_kind(mut self, kind: ObjectKind) -> Self {
        self.kind = kind;
        self
    }
}

impl SceneObject for MeshObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn matrix_world(&self) -> Mat4 {
        self.matrix_world
    }

    fn material_slots(&self) -> &[String] {
        &self.material_slots
    }
}

/// Evaluator for [`MeshObject`]s whose stored mesh already is final.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsAuthored;

impl MeshEvaluator<MeshObject> for AsAuthored {
    type Mesh<'a> = &'a PolyMesh
    where
        Self: 'a,
        MeshObject: 'a;

    fn evaluate<'a>(&'a self, object: &'a MeshObject) -> Result<Self::Mesh<'a>> {
        Ok(&object.mesh)
    }
}

/// Load mesh objects from JSON, filling in omitted polygon normals.
pub fn load_objects_json(json: &str) -> Result<Vec<MeshObject>> {
    let mut objects: Vec<MeshObject> = serde_json::from_str(json)?;
    for object in &mut objects {
        object.mesh.compute_missing_normals();
    }
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_objects_json() {
        let json = r#"[
            {
                "name": "Panel",
                "material_slots": ["Steel", "MountPoint"],
                "mesh": {
                    "vertices": [[0,0,0],[1,0,0],[1,1,0]],
                    "polygons": [{ "vertices": [0,1,2], "material_index": 1 }]
                }
            },
            { "name": "Helper", "kind": "empty" }
        ]"#;
        let objects = load_objects_json(json).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].kind(), ObjectKind::Mesh);
        assert_eq!(objects[0].matrix_world(), Mat4::IDENTITY);
        assert_eq!(objects[0].mesh.polygons[0].normal, Vec3::Z);
        assert_eq!(objects[1].kind(), ObjectKind::Empty);
        assert!(objects[1].mesh.is_empty());
    }

    #[test]
    fn test_as_authored_borrows_mesh() {
        let mut mesh = PolyMesh::new();
        mesh.add_vertex(Vec3::ONE);
        let object = MeshObject::new("Cube", mesh);
        let evaluator = AsAuthored;
        let evaluated = evaluator.evaluate(&object).unwrap();
        assert_eq!(evaluated.vertex(0), Some(Vec3::ONE));
        assert_eq!(evaluated.vertex(1), None);
    }
}
