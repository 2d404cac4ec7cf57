//! A starter object with one mount-point quad per block side.

use super::MOUNT_POINT_MATERIAL;
use crate::scene::{MeshObject, PolyMesh};
use crate::types::{BlockConfig, Side};

/// Fraction of each side's extent covered by its skeleton quad.
pub const SKELETON_COVERAGE: f32 = 0.6;

/// Build an object with a centred `MountPoint` quad on each of the six sides.
///
/// Artists start from this and reshape the quads. Projected as is, every side
/// gets one mount point spanning the central 60% of the side.
pub fn mount_point_skeleton(config: &BlockConfig) -> MeshObject {
    let half = config.half_extents();
    let mut mesh = PolyMesh::new();

    for side in Side::ALL {
        let descriptor = side.descriptor();
        let normal = descriptor.normal;
        let center = normal * half;
        let u = descriptor.projection.u.abs() * half * SKELETON_COVERAGE;
        let v = descriptor.projection.v.abs() * half * SKELETON_COVERAGE;

        let corners = [center - u - v, center + u - v, center + u + v, center - u + v];
        let indices = corners.map(|c| mesh.add_vertex(c)).to_vec();
        mesh.add_polygon_with_normal(indices, 0, normal);
    }

    MeshObject::new(MOUNT_POINT_MATERIAL, mesh).with_material(MOUNT_POINT_MATERIAL)
}
