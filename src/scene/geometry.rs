//! In-memory polygon meshes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A polygon of a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertex indices, in winding order.
    pub vertices: Vec<u32>,
    /// Index into the owning object's material slots.
    #[serde(default)]
    pub material_index: usize,
    /// Face normal in object space. Zero means "not computed yet".
    #[serde(default)]
    pub normal: Vec3,
}

/// A polygon mesh with shared vertex positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyMesh {
    pub vertices: Vec<Vec3>,
    pub polygons: Vec<Polygon>,
}

impl PolyMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Add a polygon, computing its normal from the winding order.
    pub fn add_polygon(&mut self, vertices: Vec<u32>, material_index: usize) -> usize {
        let normal = self.newell_normal(&vertices);
        self.add_polygon_with_normal(vertices, material_index, normal)
    }

    /// Add a polygon with an explicit normal.
    pub fn add_polygon_with_normal(
        &mut self,
        vertices: Vec<u32>,
        material_index: usize,
        normal: Vec3,
    ) -> usize {
        self.polygons.push(Polygon {
            vertices,
            material_index,
            normal,
        });
        self.polygons.len() - 1
    }

    /// Add a quad from four positions given counter-clockwise around its normal.
    pub fn add_quad(&mut self, corners: [Vec3; 4], material_index: usize) -> usize {
        let indices = corners.map(|c| self.add_vertex(c));
        self.add_polygon(indices.to_vec(), material_index)
    }

    /// Fill in normals that were left zero (e.g. omitted in JSON input).
    pub fn compute_missing_normals(&mut self) {
        for i in 0..self.polygons.len() {
            if self.polygons[i].normal == Vec3::ZERO {
                let normal = self.newell_normal(&self.polygons[i].vertices);
                self.polygons[i].normal = normal;
            }
        }
    }

    /// Newell's method: robust for non-planar and concave polygons.
    /// Out-of-range indices are ignored.
    fn newell_normal(&self, indices: &[u32]) -> Vec3 {
        let points: Vec<Vec3> = indices
            .iter()
            .filter_map(|&i| self.vertices.get(i as usize).copied())
            .collect();
        let mut normal = Vec3::ZERO;
        for (i, current) in points.iter().enumerate() {
            let next = points[(i + 1) % points.len()];
            normal += current.cross(next);
        }
        normal.normalize_or_zero()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_normal_follows_winding() {
        let mut mesh = PolyMesh::new();
        let up = mesh.add_quad(
            [
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
            ],
            0,
        );
        let down = mesh.add_quad(
            [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
            0,
        );
        assert_eq!(mesh.polygons[up].normal, Vec3::Z);
        assert_eq!(mesh.polygons[down].normal, Vec3::NEG_Z);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.polygon_count(), 2);
    }

    #[test]
    fn test_compute_missing_normals_keeps_explicit_ones() {
        let mut mesh = PolyMesh::new();
        for p in [Vec3::ZERO, Vec3::X, Vec3::Y] {
            mesh.add_vertex(p);
        }
        mesh.polygons.push(Polygon {
            vertices: vec![0, 1, 2],
            material_index: 0,
            normal: Vec3::ZERO,
        });
        mesh.add_polygon_with_normal(vec![0, 1, 2], 0, Vec3::X);

        mesh.compute_missing_normals();
        assert_eq!(mesh.polygons[0].normal, Vec3::Z);
        assert_eq!(mesh.polygons[1].normal, Vec3::X);
    }

    #[test]
    fn test_degenerate_polygon_has_zero_normal() {
        let mut mesh = PolyMesh::new();
        mesh.add_vertex(Vec3::ZERO);
        mesh.add_vertex(Vec3::X);
        let p = mesh.add_polygon(vec![0, 1], 0);
        assert_eq!(mesh.polygons[p].normal, Vec3::ZERO);
    }
}
