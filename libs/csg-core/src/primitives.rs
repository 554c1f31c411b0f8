//! # Primitive Tessellation
//!
//! Builds concrete [`Geometry`] for the leaf node kinds (`Primitive3D`,
//! `Primitive2D`). This is pure geometry construction with no dependency
//! on the boolean kernel — primitives are leaves, not kernel operations.

use glam::{DVec2, DVec3};

use crate::geometry::{Face3D, Geometry, Outline2D, PolySet3D, Polygon2D};
use crate::node::{Primitive2DKind, Primitive3DKind};

/// Builds the geometry for a 3D primitive leaf.
pub fn build_3d(kind: &Primitive3DKind) -> Geometry {
    let ps = match kind {
        Primitive3DKind::Cube { size, center } => cube(*size, *center),
        Primitive3DKind::Sphere { r, segments } => sphere(*r, segments.fragments(*r)),
        Primitive3DKind::Cylinder {
            h,
            r1,
            r2,
            center,
            segments,
        } => {
            let frags = segments.fragments(r1.max(*r2));
            cylinder(*h, *r1, *r2, *center, frags)
        }
        Primitive3DKind::Polyhedron {
            points,
            faces,
            convexity,
        } => polyhedron(points, faces, *convexity),
    };
    Geometry::PolySet3D(ps)
}

/// Builds the geometry for a 2D primitive leaf.
pub fn build_2d(kind: &Primitive2DKind) -> Geometry {
    let p2 = match kind {
        Primitive2DKind::Square { size, center } => square(*size, *center),
        Primitive2DKind::Circle { r, segments } => circle(*r, segments.fragments(*r)),
        Primitive2DKind::Polygon {
            points,
            paths,
            convexity,
        } => polygon(points, paths, *convexity),
    };
    Geometry::Polygon2D(p2)
}

/// A box with 24 vertices (4 per face, unshared across faces) so every
/// face gets an exact flat normal rather than an averaged one.
fn cube(size: DVec3, center: bool) -> PolySet3D {
    if size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
        return PolySet3D::empty();
    }
    let (lo, hi) = if center {
        (-size / 2.0, size / 2.0)
    } else {
        (DVec3::ZERO, size)
    };
    let corners = [
        DVec3::new(lo.x, lo.y, lo.z),
        DVec3::new(hi.x, lo.y, lo.z),
        DVec3::new(hi.x, hi.y, lo.z),
        DVec3::new(lo.x, hi.y, lo.z),
        DVec3::new(lo.x, lo.y, hi.z),
        DVec3::new(hi.x, lo.y, hi.z),
        DVec3::new(hi.x, hi.y, hi.z),
        DVec3::new(lo.x, hi.y, hi.z),
    ];
    // Each face as a CCW quad (viewed from outside), split into two
    // triangles by the caller's renderer if it needs triangles; kept as
    // quads here since `Face3D` supports general polygons.
    let face_indices: [[usize; 4]; 6] = [
        [0, 3, 2, 1], // bottom (-z)
        [4, 5, 6, 7], // top (+z)
        [0, 1, 5, 4], // front (-y)
        [2, 3, 7, 6], // back (+y)
        [1, 2, 6, 5], // right (+x)
        [3, 0, 4, 7], // left (-x)
    ];
    let faces = face_indices
        .iter()
        .map(|idx| Face3D {
            vertices: idx.iter().map(|&i| corners[i]).collect(),
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

/// A cylinder or cone (`r1 != r2`), with separate vertex rings for the two
/// caps and the side wall so cap normals stay flat.
fn cylinder(h: f64, r1: f64, r2: f64, center: bool, segments: u32) -> PolySet3D {
    if h <= 0.0 || (r1 <= 0.0 && r2 <= 0.0) || segments < 3 {
        return PolySet3D::empty();
    }
    let (z0, z1) = if center { (-h / 2.0, h / 2.0) } else { (0.0, h) };
    let ring = |r: f64, z: f64| -> Vec<DVec3> {
        (0..segments)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * i as f64 / segments as f64;
                DVec3::new(r * theta.cos(), r * theta.sin(), z)
            })
            .collect()
    };
    let bottom = ring(r1, z0);
    let top = ring(r2, z1);

    let mut faces = Vec::new();
    // Side wall: one quad per segment (degenerates to a triangle when a
    // radius is zero, which is still a valid polygon with a repeated
    // vertex collapsed by the kernel's own sanitization on import).
    for i in 0..segments as usize {
        let j = (i + 1) % segments as usize;
        faces.push(Face3D {
            vertices: vec![bottom[i], bottom[j], top[j], top[i]],
            color: None,
        });
    }
    if r1 > 0.0 {
        let mut cap: Vec<DVec3> = bottom.clone();
        cap.reverse(); // CCW from outside looking up means reversed order here
        faces.push(Face3D {
            vertices: cap,
            color: None,
        });
    }
    if r2 > 0.0 {
        faces.push(Face3D {
            vertices: top.clone(),
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

/// A latitude/longitude sphere. Pole rings collapse to a single point but
/// are still emitted as degenerate-top/bottom triangle fans so every face
/// stays a manifold triangle rather than requiring a special pole case.
fn sphere(r: f64, segments: u32) -> PolySet3D {
    if r <= 0.0 || segments < 3 {
        return PolySet3D::empty();
    }
    let rings = (segments / 2).max(2);
    let mut ring_points: Vec<Vec<DVec3>> = Vec::with_capacity(rings as usize + 1);
    for ring in 0..=rings {
        let phi = std::f64::consts::PI * ring as f64 / rings as f64; // 0..=pi
        let y = r * phi.cos();
        let ring_r = r * phi.sin();
        if ring == 0 || ring == rings {
            ring_points.push(vec![DVec3::new(0.0, 0.0, y)]);
            continue;
        }
        let pts = (0..segments)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * i as f64 / segments as f64;
                DVec3::new(ring_r * theta.cos(), ring_r * theta.sin(), y)
            })
            .collect();
        ring_points.push(pts);
    }

    let mut faces = Vec::new();
    for ring in 0..rings as usize {
        let a = &ring_points[ring];
        let b = &ring_points[ring + 1];
        if a.len() == 1 {
            // Top cap: fan from the pole point to ring b.
            for i in 0..b.len() {
                let j = (i + 1) % b.len();
                faces.push(Face3D {
                    vertices: vec![a[0], b[j], b[i]],
                    color: None,
                });
            }
        } else if b.len() == 1 {
            // Bottom cap: fan from ring a to the pole point.
            for i in 0..a.len() {
                let j = (i + 1) % a.len();
                faces.push(Face3D {
                    vertices: vec![a[i], a[j], b[0]],
                    color: None,
                });
            }
        } else {
            for i in 0..a.len() {
                let j = (i + 1) % a.len();
                faces.push(Face3D {
                    vertices: vec![a[i], a[j], b[j], b[i]],
                    color: None,
                });
            }
        }
    }
    PolySet3D {
        faces,
        color: None,
        convexity: 1,
        is_2d_slab: false,
    }
}

fn polyhedron(points: &[DVec3], faces: &[Vec<u32>], convexity: u32) -> PolySet3D {
    let built = faces
        .iter()
        .filter_map(|face| {
            let vertices: Option<Vec<DVec3>> =
                face.iter().map(|&i| points.get(i as usize).copied()).collect();
            vertices.map(|vertices| Face3D {
                vertices,
                color: None,
            })
        })
        .collect();
    PolySet3D {
        faces: built,
        color: None,
        convexity,
        is_2d_slab: false,
    }
}

fn square(size: DVec2, center: bool) -> Polygon2D {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Polygon2D::empty();
    }
    let (lo, hi) = if center {
        (-size / 2.0, size / 2.0)
    } else {
        (DVec2::ZERO, size)
    };
    let outline = Outline2D {
        points: vec![
            DVec2::new(lo.x, lo.y),
            DVec2::new(hi.x, lo.y),
            DVec2::new(hi.x, hi.y),
            DVec2::new(lo.x, hi.y),
        ],
        positive: true,
    };
    Polygon2D {
        outlines: vec![outline],
        sanitized: true,
        convexity: 1,
        color: None,
    }
}

fn circle(r: f64, segments: u32) -> Polygon2D {
    if r <= 0.0 || segments < 3 {
        return Polygon2D::empty();
    }
    let points = (0..segments)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * i as f64 / segments as f64;
            DVec2::new(r * theta.cos(), r * theta.sin())
        })
        .collect();
    Polygon2D {
        outlines: vec![Outline2D {
            points,
            positive: true,
        }],
        sanitized: true,
        convexity: 1,
        color: None,
    }
}

fn polygon(points: &[DVec2], paths: &[Vec<u32>], convexity: u32) -> Polygon2D {
    if points.len() < 3 {
        return Polygon2D::empty();
    }
    let outlines = if paths.is_empty() {
        vec![Outline2D {
            points: points.to_vec(),
            positive: true,
        }]
    } else {
        paths
            .iter()
            .enumerate()
            .filter_map(|(i, path)| {
                let pts: Option<Vec<DVec2>> =
                    path.iter().map(|&idx| points.get(idx as usize).copied()).collect();
                pts.map(|points| Outline2D {
                    points,
                    // The first path is the outer boundary; the rest are
                    // holes. Sanitization (winding correction) happens
                    // later, since user-authored polygons are not
                    // guaranteed simple.
                    positive: i == 0,
                })
            })
            .collect()
    };
    Polygon2D {
        outlines,
        // A user-authored polygon is not guaranteed non-self-intersecting
        // or canonically wound; it must pass through the clipping kernel
        // before being treated as sanitized.
        sanitized: false,
        convexity,
        color: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SegmentParams;

    #[test]
    fn test_cube_has_six_faces() {
        let ps = cube(DVec3::splat(2.0), false);
        assert_eq!(ps.faces.len(), 6);
    }

    #[test]
    fn test_cube_zero_size_is_empty() {
        let ps = cube(DVec3::new(0.0, 1.0, 1.0), false);
        assert!(ps.is_empty());
    }

    #[test]
    fn test_cube_bbox_matches_size_when_centered() {
        let ps = cube(DVec3::splat(10.0), true);
        let (lo, hi) = ps.bbox().unwrap();
        assert!((lo - DVec3::splat(-5.0)).length() < 1e-9);
        assert!((hi - DVec3::splat(5.0)).length() < 1e-9);
    }

    #[test]
    fn test_sphere_face_count_scales_with_segments() {
        let low = sphere(5.0, 8);
        let high = sphere(5.0, 16);
        assert!(high.faces.len() > low.faces.len());
    }

    #[test]
    fn test_cylinder_degenerates_to_cone_when_top_radius_zero() {
        let ps = cylinder(10.0, 5.0, 0.0, false, 16);
        // Only the bottom cap plus the side wall; no top cap face.
        assert_eq!(ps.faces.len(), 16 + 1);
    }

    #[test]
    fn test_circle_fragments_from_default_segment_params() {
        let params = SegmentParams::default();
        let frags = params.fragments(10.0);
        let circ = circle(10.0, frags);
        assert_eq!(circ.outlines[0].points.len(), frags as usize);
    }

    #[test]
    fn test_polygon_with_hole_marks_first_path_positive() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(8.0, 2.0),
            DVec2::new(8.0, 8.0),
            DVec2::new(2.0, 8.0),
        ];
        let paths = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
        let poly = polygon(&points, &paths, 1);
        assert!(poly.outlines[0].positive);
        assert!(!poly.outlines[1].positive);
    }
}
