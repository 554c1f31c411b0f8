//! # `ManifoldKernel`: the `GeometryKernel` implementation
//!
//! Wires the standalone mesh algorithms in [`crate::manifold`] and
//! [`crate::cross_section`] up to [`csg_core::geometry::GeometryKernel`],
//! the contract the evaluator calls through. Everything in this file is
//! format conversion (`PolySet3D` ⇄ [`Mesh`]) and error-context attachment;
//! the actual geometry algorithms live in the modules it delegates to.

use csg_core::error::{CoreError, CoreResult};
use csg_core::geometry::{Face3D, Geometry, GeometryKernel, Outline2D, PolySet3D, Polygon2D};
use glam::{DVec2, DVec3};

use crate::cross_section::{boolean2d, hull2d, project};
use crate::error::ManifoldError;
use crate::manifold::{boolean, hull, minkowski};
use crate::mesh::halfedge::HalfEdgeMesh;
use crate::mesh::Mesh;

/// Vertex-welding tolerance used by the watertightness check in
/// [`ManifoldKernel::nef_from_polyset`].
const WELD_EPSILON: f32 = 1e-5;

/// Pure-Rust boolean kernel built on a BSP-tree mesh engine. Stateless:
/// every method is a free function in disguise, so a single instance can be
/// shared across threads without synchronization of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifoldKernel;

impl ManifoldKernel {
    /// Builds a new kernel instance. There is no configuration to pass:
    /// tolerances live as module-level constants next to the algorithms
    /// they tune.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn kernel_failure(op: &'static str, err: ManifoldError) -> CoreError {
    CoreError::KernelFailure {
        op,
        message: err.to_string(),
    }
}

impl GeometryKernel for ManifoldKernel {
    type Repr3D = Mesh;

    fn nef_from_polyset(&self, ps: &PolySet3D) -> CoreResult<Option<Mesh>> {
        if ps.is_empty() {
            return Ok(Some(Mesh::new()));
        }
        let mesh = polyset_to_mesh(ps);
        let welded = HalfEdgeMesh::from_triangle_mesh(&mesh, WELD_EPSILON);
        if !welded.is_closed() {
            return Ok(None);
        }
        Ok(Some(mesh))
    }

    fn polyset_from_nef(&self, nef: &Mesh) -> CoreResult<PolySet3D> {
        Ok(mesh_to_polyset(nef))
    }

    fn union_many(&self, nefs: &[Mesh]) -> CoreResult<Mesh> {
        boolean::union_all(nefs).map_err(|e| kernel_failure("union", e))
    }

    fn intersect(&self, a: &Mesh, b: &Mesh) -> CoreResult<Mesh> {
        boolean::intersection_all(&[a.clone(), b.clone()]).map_err(|e| kernel_failure("intersect", e))
    }

    fn difference(&self, a: &Mesh, b: &Mesh) -> CoreResult<Mesh> {
        boolean::difference_all(&[a.clone(), b.clone()]).map_err(|e| kernel_failure("difference", e))
    }

    fn minkowski(&self, a: &Mesh, b: &Mesh) -> CoreResult<Mesh> {
        minkowski::compute_minkowski(&[a.clone(), b.clone()]).map_err(|e| kernel_failure("minkowski", e))
    }

    fn hull(&self, geoms: &[Geometry]) -> CoreResult<Geometry> {
        let all_2d = geoms.iter().all(Geometry::is_2d);
        if all_2d {
            let points: Vec<DVec2> = geoms
                .iter()
                .filter_map(|g| match g {
                    Geometry::Polygon2D(p) => Some(p),
                    _ => None,
                })
                .flat_map(|p| p.outlines.iter().flat_map(|o| o.points.iter().copied()))
                .collect();
            return Ok(Geometry::Polygon2D(hull2d::hull_2d(&points)));
        }

        let mut cloud = Mesh::new();
        for g in geoms {
            match g {
                Geometry::Polygon2D(p) => {
                    for outline in &p.outlines {
                        for pt in &outline.points {
                            cloud.add_vertex(pt.x as f32, pt.y as f32, 0.0, 0.0, 0.0, 1.0);
                        }
                    }
                }
                Geometry::PolySet3D(ps) => {
                    for face in &ps.faces {
                        for v in &face.vertices {
                            cloud.add_vertex(v.x as f32, v.y as f32, v.z as f32, 0.0, 0.0, 1.0);
                        }
                    }
                }
                Geometry::Empty => {}
            }
        }
        let result = hull::compute_hull(&[cloud]).map_err(|e| kernel_failure("hull", e))?;
        Ok(Geometry::PolySet3D(mesh_to_polyset(&result)))
    }

    fn project(&self, nef: &Mesh, cut: bool) -> CoreResult<Polygon2D> {
        Ok(project::project(nef, cut))
    }

    fn union_2d(&self, polys: &[Polygon2D]) -> CoreResult<Polygon2D> {
        Ok(boolean2d::union_2d(polys))
    }

    fn intersect_2d(&self, a: &Polygon2D, b: &Polygon2D) -> CoreResult<Polygon2D> {
        Ok(boolean2d::intersect_2d(a, b))
    }

    fn difference_2d(&self, a: &Polygon2D, b: &Polygon2D) -> CoreResult<Polygon2D> {
        Ok(boolean2d::difference_2d(a, b))
    }
}

/// Converts a boundary-representation polyset into this kernel's flat
/// triangle [`Mesh`], fan-triangulating already-triangular faces directly
/// and ear-clipping (via `earcutr`, projected onto the face's dominant
/// plane) anything larger.
pub(crate) fn polyset_to_mesh(ps: &PolySet3D) -> Mesh {
    let mut mesh = Mesh::new();
    for face in &ps.faces {
        if face.vertices.len() < 3 {
            continue;
        }
        let normal = face.normal();
        let n32 = [normal.x as f32, normal.y as f32, normal.z as f32];
        let base: Vec<u32> = face
            .vertices
            .iter()
            .map(|v| mesh.add_vertex(v.x as f32, v.y as f32, v.z as f32, n32[0], n32[1], n32[2]))
            .collect();

        if face.vertices.len() == 3 {
            mesh.add_triangle(base[0], base[1], base[2]);
            continue;
        }

        for (a, b, c) in triangulate_face(face) {
            let (ia, ib, ic) = (base[a], base[b], base[c]);
            let tri_normal = (face.vertices[b] - face.vertices[a]).cross(face.vertices[c] - face.vertices[a]);
            if tri_normal.dot(normal) < 0.0 {
                mesh.add_triangle(ia, ic, ib);
            } else {
                mesh.add_triangle(ia, ib, ic);
            }
        }
    }
    mesh
}

/// Ear-clips a planar face wider than a triangle, projecting it onto the
/// 2D plane best aligned with its normal (dropping whichever axis the
/// normal points most directly along) since `earcutr` only triangulates 2D
/// point sets.
fn triangulate_face(face: &Face3D) -> Vec<(usize, usize, usize)> {
    let normal = face.normal();
    let (i0, i1) = if normal.x.abs() >= normal.y.abs() && normal.x.abs() >= normal.z.abs() {
        (1usize, 2usize)
    } else if normal.y.abs() >= normal.z.abs() {
        (0usize, 2usize)
    } else {
        (0usize, 1usize)
    };
    let component = |p: DVec3, idx: usize| match idx {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    };
    let mut flat = Vec::with_capacity(face.vertices.len() * 2);
    for v in &face.vertices {
        flat.push(component(*v, i0));
        flat.push(component(*v, i1));
    }
    match earcutr::earcut(&flat, &[], 2) {
        Ok(indices) => indices.chunks_exact(3).map(|c| (c[0], c[1], c[2])).collect(),
        Err(_) => Vec::new(),
    }
}

/// Converts a triangle [`Mesh`] back to a boundary-representation polyset,
/// one [`Face3D`] per triangle. Colors are dropped: the evaluator re-tags
/// the result via an explicit `color()` node wrapper rather than
/// expecting a boolean kernel to thread color through its solids.
pub(crate) fn mesh_to_polyset(mesh: &Mesh) -> PolySet3D {
    let mut faces = Vec::with_capacity(mesh.triangle_count());
    for tri in mesh.indices.chunks_exact(3) {
        let vertex = |idx: u32| -> DVec3 {
            let i = idx as usize * 3;
            DVec3::new(
                mesh.vertices[i] as f64,
                mesh.vertices[i + 1] as f64,
                mesh.vertices[i + 2] as f64,
            )
        };
        faces.push(Face3D {
            vertices: vec![vertex(tri[0]), vertex(tri[1]), vertex(tri[2])],
            color: None,
        });
    }
    PolySet3D {
        faces,
        color: None,
        convexity: 1,
        is_2d_slab: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_polyset(size: f64) -> PolySet3D {
        let h = size / 2.0;
        let corners = [
            DVec3::new(-h, -h, -h),
            DVec3::new(h, -h, -h),
            DVec3::new(h, h, -h),
            DVec3::new(-h, h, -h),
            DVec3::new(-h, -h, h),
            DVec3::new(h, -h, h),
            DVec3::new(h, h, h),
            DVec3::new(-h, h, h),
        ];
        let quads: [[usize; 4]; 6] = [
            [0, 3, 2, 1], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // front
            [1, 2, 6, 5], // right
            [2, 3, 7, 6], // back
            [3, 0, 4, 7], // left
        ];
        let faces = quads
            .iter()
            .map(|q| Face3D {
                vertices: q.iter().map(|&i| corners[i]).collect(),
                color: None,
            })
            .collect();
        PolySet3D {
            faces,
            color: None,
            convexity: 1,
            is_2d_slab: false,
        }
    }

    #[test]
    fn test_polyset_to_mesh_triangulates_quads() {
        let ps = cube_polyset(2.0);
        let mesh = polyset_to_mesh(&ps);
        // 6 quad faces -> 12 triangles, each contributing its own 3 vertices.
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_count(), 24);
    }

    #[test]
    fn test_nef_from_polyset_accepts_closed_cube() {
        let kernel = ManifoldKernel::new();
        let ps = cube_polyset(2.0);
        let nef = kernel.nef_from_polyset(&ps).unwrap();
        assert!(nef.is_some());
    }

    #[test]
    fn test_nef_from_polyset_rejects_open_shell() {
        let kernel = ManifoldKernel::new();
        let mut ps = cube_polyset(2.0);
        ps.faces.pop(); // remove one face: no longer watertight
        let nef = kernel.nef_from_polyset(&ps).unwrap();
        assert!(nef.is_none());
    }

    #[test]
    fn test_union_many_of_two_cubes() {
        let kernel = ManifoldKernel::new();
        let a = kernel.nef_from_polyset(&cube_polyset(2.0)).unwrap().unwrap();
        let mut b_ps = cube_polyset(2.0);
        for face in &mut b_ps.faces {
            for v in &mut face.vertices {
                v.x += 1.0;
            }
        }
        let b = kernel.nef_from_polyset(&b_ps).unwrap().unwrap();
        let union = kernel.union_many(&[a, b]).unwrap();
        assert!(!union.is_empty());
    }

    #[test]
    fn test_hull_of_mixed_2d_and_3d_returns_3d() {
        let kernel = ManifoldKernel::new();
        let square = Geometry::Polygon2D(Polygon2D {
            outlines: vec![Outline2D {
                points: vec![
                    DVec2::new(0.0, 0.0),
                    DVec2::new(1.0, 0.0),
                    DVec2::new(1.0, 1.0),
                    DVec2::new(0.0, 1.0),
                ],
                positive: true,
            }],
            sanitized: true,
            convexity: 1,
            color: None,
        });
        let cube = Geometry::PolySet3D(cube_polyset(2.0));
        let result = kernel.hull(&[square, cube]).unwrap();
        assert!(result.is_3d());
    }

    #[test]
    fn test_hull_of_all_2d_returns_2d() {
        let kernel = ManifoldKernel::new();
        let a = Geometry::Polygon2D(Polygon2D {
            outlines: vec![Outline2D {
                points: vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)],
                positive: true,
            }],
            sanitized: true,
            convexity: 1,
            color: None,
        });
        let b = Geometry::Polygon2D(Polygon2D {
            outlines: vec![Outline2D {
                points: vec![DVec2::new(3.0, 0.0), DVec2::new(4.0, 0.0), DVec2::new(3.0, 1.0)],
                positive: true,
            }],
            sanitized: true,
            convexity: 1,
            color: None,
        });
        let result = kernel.hull(&[a, b]).unwrap();
        assert!(result.is_2d());
    }
}
