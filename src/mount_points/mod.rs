//! Mount-point extraction.
//!
//! Polygons painted with the `MountPoint` material mark where a block can
//! connect to its neighbours. Each such polygon is assigned to the block side
//! it faces, and its bounding rectangle is projected into that side's plane
//! coordinates, normalized to one unit per grid cell.

mod skeleton;

pub use skeleton::{mount_point_skeleton, SKELETON_COVERAGE};

use crate::error::Result;
use crate::scene::{EvaluatedMesh, MeshEvaluator, ObjectKind, SceneObject};
use crate::types::{bounds, BlockSize, BoundingBox, Side};
use glam::{Mat3, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Name of the material that tags mount-point polygons.
pub const MOUNT_POINT_MATERIAL: &str = "MountPoint";

/// A rectangle on one side of the block where neighbours may attach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MountPoint {
    pub side: Side,
    pub start: Vec2,
    pub end: Vec2,
}

impl MountPoint {
    pub fn new(side: Side, start: Vec2, end: Vec2) -> Self {
        Self { side, start, end }
    }
}

/// Rotation part of an object transform with scale removed.
fn rotation_to_world(matrix_world: Mat4) -> Mat3 {
    let m = Mat3::from_mat4(matrix_world);
    Mat3::from_cols(
        m.x_axis.normalize_or_zero(),
        m.y_axis.normalize_or_zero(),
        m.z_axis.normalize_or_zero(),
    )
}

/// Project one polygon onto the block side it faces.
///
/// `points` are world-space vertex positions, `normal` the world-space face
/// normal and `scale` the block size's normalization factor. Returns `None`
/// when the polygon faces no side by more than 45 degrees or has no vertices.
pub fn project_polygon(
    points: impl IntoIterator<Item = Vec3>,
    normal: Vec3,
    bound_box: &BoundingBox,
    scale: f32,
) -> Option<MountPoint> {
    let side = Side::facing(normal)?;
    let poly_bounds = bounds(points)?;
    let descriptor = side.descriptor();

    let origin = bound_box[descriptor.start];
    let start = (poly_bounds[descriptor.start] - origin) * scale;
    let end = (poly_bounds[descriptor.end] - origin) * scale;

    Some(MountPoint {
        side,
        start: descriptor.projection.project(start),
        end: descriptor.projection.project(end),
    })
}

/// Collect the mount points of all tagged polygons of `objects`.
///
/// Objects that are not meshes, or have no `MountPoint` material, are skipped
/// without evaluating them. Each remaining object is evaluated through
/// `evaluator`; the evaluated mesh is dropped before the next object is
/// evaluated, and also when an error aborts the scan. Output order follows
/// object order, then polygon order.
pub fn mount_point_definitions<'o, O, E>(
    objects: impl IntoIterator<Item = &'o O>,
    evaluator: &E,
    bound_box: &BoundingBox,
    block_size: BlockSize,
) -> Result<Vec<MountPoint>>
where
    O: SceneObject + 'o,
    E: MeshEvaluator<O>,
{
    let scale = block_size.normalize_scale();
    let mut mount_points = Vec::new();

    for object in objects {
        if object.kind() != ObjectKind::Mesh {
            continue;
        }

        let slots = object.material_slots();
        if !slots.iter().any(|m| m == MOUNT_POINT_MATERIAL) {
            continue;
        }

        let matrix_world = object.matrix_world();
        let rotate_to_world = rotation_to_world(matrix_world);

        let mesh = evaluator.evaluate(object)?;
        let before = mount_points.len();

        for (index, poly) in mesh.polygons().iter().enumerate() {
            let tagged = slots
                .get(poly.material_index)
                .is_some_and(|m| m == MOUNT_POINT_MATERIAL);
            if !tagged {
                continue;
            }

            let points: Option<Vec<Vec3>> = poly
                .vertices
                .iter()
                .map(|&v| mesh.vertex(v).map(|co| matrix_world.transform_point3(co)))
                .collect();
            let Some(points) = points else {
                log::debug!(
                    "{}: polygon {} references a missing vertex, skipped",
                    object.name(),
                    index
                );
                continue;
            };

            match project_polygon(points, rotate_to_world * poly.normal, bound_box, scale) {
                Some(mount_point) => mount_points.push(mount_point),
                None => log::debug!(
                    "{}: polygon {} faces no block side, skipped",
                    object.name(),
                    index
                ),
            }
        }

        log::debug!(
            "{}: {} mount points",
            object.name(),
            mount_points.len() - before
        );
    }

    Ok(mount_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::scene::{AsAuthored, MeshObject, PolyMesh, Polygon};
    use crate::types::{block_bounds, BlockConfig, ANGLE_45};
    use std::cell::Cell;

    fn top_face_object(material_slots: &[&str], material_index: usize) -> MeshObject {
        let mut mesh = PolyMesh::new();
        mesh.add_quad(
            [
                Vec3::new(-1.25, -1.25, 1.25),
                Vec3::new(1.25, -1.25, 1.25),
                Vec3::new(1.25, 1.25, 1.25),
                Vec3::new(-1.25, 1.25, 1.25),
            ],
            material_index,
        );
        let mut object = MeshObject::new("Top", mesh);
        for slot in material_slots {
            object = object.with_material(*slot);
        }
        object
    }

    fn large_box() -> BoundingBox {
        block_bounds(&BlockConfig::default())
    }

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).abs().max_element() < 1e-5,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_full_top_face() {
        let object = top_face_object(&[MOUNT_POINT_MATERIAL], 0);
        let mps =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        assert_eq!(mps.len(), 1);
        assert_eq!(mps[0].side, Side::Top);
        assert_close(mps[0].start, Vec2::ZERO);
        assert_close(mps[0].end, Vec2::ONE);
    }

    #[test]
    fn test_only_tagged_slot_counts() {
        let object = top_face_object(&["Steel", MOUNT_POINT_MATERIAL], 0);
        let mps =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        assert!(mps.is_empty());

        let object = top_face_object(&["Steel", MOUNT_POINT_MATERIAL], 1);
        let mps =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        assert_eq!(mps.len(), 1);
    }

    #[test]
    fn test_untagged_geometry_yields_nothing() {
        let mut mesh = PolyMesh::new();
        for i in 0..50 {
            let z = i as f32 * 0.01;
            mesh.add_quad(
                [
                    Vec3::new(0.0, 0.0, z),
                    Vec3::new(1.0, 0.0, z),
                    Vec3::new(1.0, 1.0, z),
                    Vec3::new(0.0, 1.0, z),
                ],
                i % 2,
            );
        }
        let object = MeshObject::new("Hull", mesh)
            .with_material("Steel")
            .with_material("Glass");
        let mps =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        assert!(mps.is_empty());
    }

    #[test]
    fn test_non_mesh_objects_skipped() {
        let object = top_face_object(&[MOUNT_POINT_MATERIAL], 0).with_kind(ObjectKind::Empty);
        let mps =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        assert!(mps.is_empty());
    }

    #[test]
    fn test_rotated_object_projects_in_world_space() {
        // Rotating +Z by 90 degrees about X makes it face -Y (the front).
        let object = top_face_object(&[MOUNT_POINT_MATERIAL], 0)
            .with_matrix(Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2));
        let mps =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        assert_eq!(mps.len(), 1);
        assert_eq!(mps[0].side, Side::Front);
        assert_close(mps[0].start, Vec2::ZERO);
        assert_close(mps[0].end, Vec2::ONE);
    }

    #[test]
    fn test_scale_does_not_affect_side_selection() {
        // Scaled flat on z: the normal is still rotated, not squashed.
        let matrix = Mat4::from_scale(Vec3::new(0.5, 0.5, 1.0));
        let object = top_face_object(&[MOUNT_POINT_MATERIAL], 0).with_matrix(matrix);
        let mps =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        assert_eq!(mps.len(), 1);
        assert_eq!(mps[0].side, Side::Top);
        assert_close(mps[0].start, Vec2::splat(0.25));
        assert_close(mps[0].end, Vec2::splat(0.75));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let object = top_face_object(&[MOUNT_POINT_MATERIAL], 0);
        let first =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        let second =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.side, b.side);
            assert_eq!(a.start.to_array().map(f32::to_bits), b.start.to_array().map(f32::to_bits));
            assert_eq!(a.end.to_array().map(f32::to_bits), b.end.to_array().map(f32::to_bits));
        }
    }

    #[test]
    fn test_missing_vertex_skips_polygon() {
        let mut object = top_face_object(&[MOUNT_POINT_MATERIAL], 0);
        object.mesh.polygons.push(Polygon {
            vertices: vec![0, 1, 99],
            material_index: 0,
            normal: Vec3::Z,
        });
        let mps =
            mount_point_definitions([&object], &AsAuthored, &large_box(), BlockSize::Large).unwrap();
        assert_eq!(mps.len(), 1);
    }

    #[test]
    fn test_small_block_normalization() {
        let config = BlockConfig::new(BlockSize::Small);
        let mut mesh = PolyMesh::new();
        mesh.add_quad(
            [
                Vec3::new(-0.25, -0.25, -0.25),
                Vec3::new(-0.25, 0.25, -0.25),
                Vec3::new(0.25, 0.25, -0.25),
                Vec3::new(0.25, -0.25, -0.25),
            ],
            0,
        );
        let object = MeshObject::new("Bottom", mesh).with_material(MOUNT_POINT_MATERIAL);
        let mps = mount_point_definitions(
            [&object],
            &AsAuthored,
            &block_bounds(&config),
            BlockSize::Small,
        )
        .unwrap();
        assert_eq!(mps.len(), 1);
        assert_eq!(mps[0].side, Side::Bottom);
        assert_close(mps[0].start, Vec2::ZERO);
        assert_close(mps[0].end, Vec2::ONE);
    }

    #[test]
    fn test_project_polygon_diagonal_is_rejected() {
        let normal = Vec3::new(ANGLE_45, 0.0, ANGLE_45);
        let mp = project_polygon([Vec3::ZERO, Vec3::ONE], normal, &large_box(), 0.4);
        assert!(mp.is_none());
    }

    /// Counts live evaluated meshes to check that each one is released.
    struct CountingEvaluator {
        live: Cell<i32>,
        acquired: Cell<i32>,
        fail_on: Option<&'static str>,
    }

    struct CountedMesh<'a> {
        mesh: &'a PolyMesh,
        live: &'a Cell<i32>,
    }

    impl Drop for CountedMesh<'_> {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    impl EvaluatedMesh for CountedMesh<'_> {
        fn polygons(&self) -> &[Polygon] {
            &self.mesh.polygons
        }

        fn vertex(&self, index: u32) -> Option<Vec3> {
            self.mesh.vertices.get(index as usize).copied()
        }
    }

    impl MeshEvaluator<MeshObject> for CountingEvaluator {
        type Mesh<'a> = CountedMesh<'a>
        where
            Self: 'a,
            MeshObject: 'a;

        fn evaluate<'a>(&'a self, object: &'a MeshObject) -> Result<CountedMesh<'a>> {
            if self.fail_on == Some(object.name.as_str()) {
                return Err(ExportError::MeshEvaluation {
                    object: object.name.clone(),
                    message: "modifier stack failed".to_string(),
                });
            }
            self.live.set(self.live.get() + 1);
            self.acquired.set(self.acquired.get() + 1);
            Ok(CountedMesh {
                mesh: &object.mesh,
                live: &self.live,
            })
        }
    }

    #[test]
    fn test_evaluated_meshes_are_released() {
        let evaluator = CountingEvaluator {
            live: Cell::new(0),
            acquired: Cell::new(0),
            fail_on: None,
        };
        let a = top_face_object(&[MOUNT_POINT_MATERIAL], 0);
        let b = top_face_object(&["Steel"], 0);
        let c = top_face_object(&["Steel", MOUNT_POINT_MATERIAL], 0);
        let mps = mount_point_definitions([&a, &b, &c], &evaluator, &large_box(), BlockSize::Large)
            .unwrap();

        assert_eq!(mps.len(), 1);
        // b has no MountPoint material and is never evaluated.
        assert_eq!(evaluator.acquired.get(), 2);
        assert_eq!(evaluator.live.get(), 0);
    }

    #[test]
    fn test_evaluation_error_propagates_after_release() {
        let evaluator = CountingEvaluator {
            live: Cell::new(0),
            acquired: Cell::new(0),
            fail_on: Some("Broken"),
        };
        let a = top_face_object(&[MOUNT_POINT_MATERIAL], 0);
        let mut broken = top_face_object(&[MOUNT_POINT_MATERIAL], 0);
        broken.name = "Broken".to_string();

        let result =
            mount_point_definitions([&a, &broken], &evaluator, &large_box(), BlockSize::Large);
        assert!(matches!(result, Err(ExportError::MeshEvaluation { .. })));
        assert_eq!(evaluator.acquired.get(), 1);
        assert_eq!(evaluator.live.get(), 0);
    }

    #[test]
    fn test_output_follows_object_then_polygon_order() {
        let mut mesh = PolyMesh::new();
        mesh.add_quad(
            [
                Vec3::new(1.25, -1.25, -1.25),
                Vec3::new(1.25, 1.25, -1.25),
                Vec3::new(1.25, 1.25, 1.25),
                Vec3::new(1.25, -1.25, 1.25),
            ],
            0,
        );
        mesh.add_quad(
            [
                Vec3::new(-1.25, -1.25, 1.25),
                Vec3::new(1.25, -1.25, 1.25),
                Vec3::new(1.25, 1.25, 1.25),
                Vec3::new(-1.25, 1.25, 1.25),
            ],
            0,
        );
        let first = MeshObject::new("LeftThenTop", mesh).with_material(MOUNT_POINT_MATERIAL);
        let second = top_face_object(&[MOUNT_POINT_MATERIAL], 0);

        let mps = mount_point_definitions(
            [&first, &second],
            &AsAuthored,
            &large_box(),
            BlockSize::Large,
        )
        .unwrap();
        let sides: Vec<Side> = mps.iter().map(|mp| mp.side).collect();
        assert_eq!(sides, vec![Side::Left, Side::Top, Side::Top]);
    }
}
