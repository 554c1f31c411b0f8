//! # 3D → 2D Projection
//!
//! Implements the two `projection()` modes OpenSCAD exposes over a 3D
//! solid: `cut = true` intersects the solid with the z=0 plane and chains
//! the crossing segments into outlines (the "CSG slice" behavior); `cut =
//! false` projects every face's footprint onto z=0 and unions them (the
//! "silhouette" behavior).

use csg_core::geometry::{Outline2D, Polygon2D};
use glam::DVec2;

use crate::cross_section::boolean2d::union_2d;
use crate::mesh::Mesh;

/// Projects `mesh` to a 2D [`Polygon2D`] on the z=0 plane.
pub fn project(mesh: &Mesh, cut: bool) -> Polygon2D {
    if cut {
        project_cut(mesh)
    } else {
        project_silhouette(mesh)
    }
}

fn triangle_vertex(mesh: &Mesh, index: u32) -> [f32; 3] {
    let i = index as usize * 3;
    [mesh.vertices[i], mesh.vertices[i + 1], mesh.vertices[i + 2]]
}

/// Intersects every triangle with the z=0 plane, keeping the 0 or 2 edge
/// crossings per triangle, then chains the resulting segments into closed
/// outlines the same way the 2D boolean engine chains its clipped edges.
fn project_cut(mesh: &Mesh) -> Polygon2D {
    let mut segments: Vec<(DVec2, DVec2)> = Vec::new();
    for tri in mesh.indices.chunks_exact(3) {
        let verts = [
            triangle_vertex(mesh, tri[0]),
            triangle_vertex(mesh, tri[1]),
            triangle_vertex(mesh, tri[2]),
        ];
        let mut crossings = Vec::new();
        for k in 0..3 {
            let a = verts[k];
            let b = verts[(k + 1) % 3];
            if (a[2] >= 0.0) != (b[2] >= 0.0) {
                let t = a[2] / (a[2] - b[2]);
                let x = a[0] as f64 + t as f64 * (b[0] - a[0]) as f64;
                let y = a[1] as f64 + t as f64 * (b[1] - a[1]) as f64;
                crossings.push(DVec2::new(x, y));
            }
        }
        if crossings.len() == 2 {
            segments.push((crossings[0], crossings[1]));
        }
    }
    crate::cross_section::boolean2d::chain_segments(segments)
}

/// Projects every triangle's footprint to z=0 (CCW-normalized) and unions
/// them. Quadratic in triangle count; acceptable for the modest meshes this
/// kernel targets, since there is no spatial index to prune candidate pairs
/// against.
fn project_silhouette(mesh: &Mesh) -> Polygon2D {
    let mut footprints = Vec::with_capacity(mesh.triangle_count());
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [
            triangle_vertex(mesh, tri[0]),
            triangle_vertex(mesh, tri[1]),
            triangle_vertex(mesh, tri[2]),
        ];
        let mut points = vec![
            DVec2::new(a[0] as f64, a[1] as f64),
            DVec2::new(b[0] as f64, b[1] as f64),
            DVec2::new(c[0] as f64, c[1] as f64),
        ];
        let outline = Outline2D { points: points.clone(), positive: true };
        if outline.signed_area().abs() < 1e-15 {
            continue;
        }
        if outline.signed_area() < 0.0 {
            points.reverse();
        }
        footprints.push(Polygon2D {
            outlines: vec![Outline2D { points, positive: true }],
            sanitized: true,
            convexity: 1,
            color: None,
        });
    }
    union_2d(&footprints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Mesh {
        let mut m = Mesh::new();
        crate::manifold::constructors::build_cube(&mut m, [2.0, 2.0, 2.0], true);
        m
    }

    #[test]
    fn test_cut_through_centered_cube_yields_square_outline() {
        let mesh = unit_cube();
        let result = project(&mesh, true);
        assert!(!result.is_empty());
        let area: f64 = result.outlines.iter().map(|o| o.signed_area().abs()).sum();
        assert!((area - 4.0).abs() < 1e-6, "expected area ~4.0, got {area}");
    }

    #[test]
    fn test_silhouette_of_centered_cube_yields_square() {
        let mesh = unit_cube();
        let result = project(&mesh, false);
        assert!(!result.is_empty());
        let area: f64 = result.outlines.iter().map(|o| o.signed_area().abs()).sum();
        assert!((area - 4.0).abs() < 1e-6, "expected area ~4.0, got {area}");
    }
}
