//! Runtime geometry
//!
//! Geometries are built once per document entry and shared between nodes via
//! `Arc`. A box becomes an indexed triangle list (one quad grid per face, with
//! per-face normals); an edges geometry becomes an indexed line list.

use std::collections::HashSet;

use palletview_math::{Aabb, Vec3};

use crate::document::{BoxData, EdgesData, GeometryKind, GeometrySpec};

/// Primitive layout of the index buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    /// Three indices per triangle
    Triangles,
    /// Two indices per segment
    Lines,
}

/// Constructed geometry in object space
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    topology: Topology,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    bounds: Aabb,
}

impl Geometry {
    /// Build from a document entry; unknown kinds yield [`Geometry::unit_cube`]
    pub fn from_spec(spec: &GeometrySpec) -> Self {
        match &spec.kind {
            GeometryKind::Box(data) => {
                if data.exceeds_segment_limit() {
                    log::warn!(
                        "Geometry '{}': segment counts [{}, {}, {}] capped at {}",
                        spec.uuid,
                        data.width_segments,
                        data.height_segments,
                        data.depth_segments,
                        BoxData::MAX_SEGMENTS
                    );
                }
                Self::cuboid(data)
            }
            GeometryKind::Edges(data) => {
                let geometry = Self::edges(data);
                let dropped = data.edges.len() - geometry.indices.len() / 2;
                if dropped > 0 {
                    log::warn!(
                        "Geometry '{}': dropped {} edge(s) referencing missing vertices",
                        spec.uuid,
                        dropped
                    );
                }
                geometry
            }
            GeometryKind::Other { type_name, .. } => {
                log::warn!(
                    "Geometry '{}' has unknown type '{}', using unit cube",
                    spec.uuid,
                    type_name
                );
                Self::unit_cube()
            }
        }
    }

    /// 1x1x1 box centered at the origin
    pub fn unit_cube() -> Self {
        Self::cuboid(&BoxData::default())
    }

    /// Box centered at the origin
    ///
    /// Segment counts go through [`BoxData::clamped_segments`].
    pub fn cuboid(data: &BoxData) -> Self {
        let (w, h, d) = (data.width, data.height, data.depth);
        let [ws, hs, ds] = data.clamped_segments();

        let mut builder = BoxBuilder::default();
        // (normal, u axis, v axis, u size, v size, offset along normal, u segments, v segments)
        // u x v == normal so every face winds counter-clockwise seen from outside
        builder.face(Vec3::X, -Vec3::Z, Vec3::Y, d, h, w, ds, hs);
        builder.face(-Vec3::X, Vec3::Z, Vec3::Y, d, h, w, ds, hs);
        builder.face(Vec3::Y, Vec3::X, -Vec3::Z, w, d, h, ws, ds);
        builder.face(-Vec3::Y, Vec3::X, Vec3::Z, w, d, h, ws, ds);
        builder.face(Vec3::Z, Vec3::X, Vec3::Y, w, h, d, ws, hs);
        builder.face(-Vec3::Z, -Vec3::X, Vec3::Y, w, h, d, ws, hs);

        let bounds = Aabb::from_points(builder.positions.iter().copied());
        Self {
            topology: Topology::Triangles,
            positions: builder.positions,
            normals: builder.normals,
            indices: builder.indices,
            bounds,
        }
    }

    /// Line list from explicit vertices; pairs with an out-of-range index are dropped
    pub fn edges(data: &EdgesData) -> Self {
        let positions: Vec<Vec3> = data.vertices.iter().map(|v| Vec3::from_array(*v)).collect();
        let count = positions.len() as u32;
        let indices: Vec<u32> = data
            .edges
            .iter()
            .filter(|[a, b]| *a < count && *b < count)
            .flat_map(|[a, b]| [*a, *b])
            .collect();
        let bounds = Aabb::from_points(positions.iter().copied());
        Self {
            topology: Topology::Lines,
            positions,
            normals: Vec::new(),
            indices,
            bounds,
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-vertex normals (empty for line geometry)
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Object-space bounds (empty if there are no vertices)
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles or segments
    pub fn primitive_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Lines => self.indices.len() / 2,
        }
    }

    /// Line-list indices outlining every primitive
    ///
    /// For triangle geometry each shared edge appears once.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        match self.topology {
            Topology::Lines => self.indices.clone(),
            Topology::Triangles => {
                let mut seen = HashSet::new();
                let mut lines = Vec::with_capacity(self.indices.len() * 2);
                for tri in self.indices.chunks_exact(3) {
                    for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                        if seen.insert((a.min(b), a.max(b))) {
                            lines.push(a);
                            lines.push(b);
                        }
                    }
                }
                lines
            }
        }
    }
}

#[derive(Default)]
struct BoxBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl BoxBuilder {
    #[allow(clippy::too_many_arguments)]
    fn face(
        &mut self,
        normal: Vec3,
        u_axis: Vec3,
        v_axis: Vec3,
        u_size: f32,
        v_size: f32,
        normal_size: f32,
        u_segments: u32,
        v_segments: u32,
    ) {
        let base = self.positions.len() as u32;
        let center = normal * (normal_size * 0.5);

        for iy in 0..=v_segments {
            let v = (iy as f32 / v_segments as f32 - 0.5) * v_size;
            for ix in 0..=u_segments {
                let u = (ix as f32 / u_segments as f32 - 0.5) * u_size;
                self.positions.push(center + u_axis * u + v_axis * v);
                self.normals.push(normal);
            }
        }

        let row = u_segments + 1;
        for iy in 0..v_segments {
            for ix in 0..u_segments {
                let a = base + iy * row + ix;
                let b = a + 1;
                let c = a + row + 1;
                let d = a + row;
                self.indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_cuboid_counts_and_bounds() {
        let g = Geometry::cuboid(&BoxData::new(2.0, 4.0, 6.0));
        assert_eq!(g.topology(), Topology::Triangles);
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.primitive_count(), 12);
        assert_eq!(g.bounds().min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(g.bounds().max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_cuboid_segments() {
        let mut data = BoxData::new(1.0, 1.0, 1.0);
        data.width_segments = 2;
        let g = Geometry::cuboid(&data);
        // X faces unchanged (2 tris each), Y and Z faces doubled (4 tris each)
        assert_eq!(g.primitive_count(), 2 * 2 + 4 * 4);
    }

    #[test]
    fn test_zero_segments_treated_as_one() {
        let mut data = BoxData::default();
        data.height_segments = 0;
        assert_eq!(Geometry::cuboid(&data).primitive_count(), 12);
    }

    #[test]
    fn test_segment_counts_are_capped() {
        let mut data = BoxData::new(0.1, 0.1, 0.1);
        data.width_segments = 200_000;
        data.height_segments = 200_000;
        data.depth_segments = u32::MAX;
        let g = Geometry::cuboid(&data);

        let n = BoxData::MAX_SEGMENTS as usize;
        assert_eq!(g.primitive_count(), 6 * n * n * 2);
        assert_eq!(g.vertex_count(), 6 * (n + 1) * (n + 1));
        assert!((g.bounds().size() - Vec3::new(0.1, 0.1, 0.1)).length() < EPSILON);
    }

    #[test]
    fn test_cuboid_faces_wind_outward() {
        let g = Geometry::cuboid(&BoxData::default());
        let p = g.positions();
        for tri in g.indices().chunks_exact(3) {
            let (a, b, c) = (p[tri[0] as usize], p[tri[1] as usize], p[tri[2] as usize]);
            let n = (b - a).cross(c - a).normalized();
            let expected = g.normals()[tri[0] as usize];
            assert!((n - expected).length() < EPSILON, "{:?} vs {:?}", n, expected);
        }
    }

    #[test]
    fn test_edges_drop_out_of_range_pairs() {
        let data = EdgesData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
            edges: vec![[0, 1], [1, 2], [2, 7]],
        };
        let g = Geometry::edges(&data);
        assert_eq!(g.topology(), Topology::Lines);
        assert_eq!(g.indices(), &[0, 1, 1, 2]);
        assert_eq!(g.primitive_count(), 2);
        assert!(g.normals().is_empty());
    }

    #[test]
    fn test_empty_edges_have_empty_bounds() {
        let g = Geometry::edges(&EdgesData::default());
        assert!(g.bounds().is_empty());
    }

    #[test]
    fn test_unknown_spec_yields_unit_cube() {
        let spec = GeometrySpec::new(
            "t",
            GeometryKind::Other { type_name: "TorusGeometry".into(), data: serde_json::Value::Null },
        );
        assert_eq!(Geometry::from_spec(&spec), Geometry::unit_cube());
        assert_eq!(Geometry::unit_cube().bounds().size(), Vec3::ONE);
    }

    #[test]
    fn test_wireframe_indices_dedupe_shared_edges() {
        let g = Geometry::unit_cube();
        // 6 faces x (4 outline + 1 diagonal), vertices are not shared across faces
        assert_eq!(g.wireframe_indices().len() / 2, 30);
    }
}
