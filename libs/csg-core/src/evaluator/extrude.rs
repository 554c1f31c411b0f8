//! `LinearExtrude` and `RotateExtrude` (§4.5).

use glam::{DMat2, DVec2, DVec3};

use crate::error::{CoreError, CoreResult, Warning};
use crate::geometry::{Face3D, Outline2D, PolySet3D, Polygon2D};
use crate::node::SegmentParams;

/// Sweeps `profile` (already the union of the node's children) along z,
/// building one ring of vertices per slice, twisting and scaling linearly
/// between the base and top rings, and capping both ends with the (scaled)
/// profile itself.
///
/// An empty profile, a non-positive height, or fewer than one slice
/// degrades to empty geometry with a [`Warning`].
pub fn linear_extrude(
    node_index: u32,
    profile: Polygon2D,
    height: f64,
    twist_degrees: f64,
    scale: DVec2,
    slices: u32,
    center: bool,
    warnings: &mut Vec<Warning>,
) -> PolySet3D {
    if profile.is_empty() || !(height > 0.0) || slices < 1 {
        warnings.push(Warning::new(
            node_index,
            CoreError::DegenerateTransform {
                node_index,
                reason: "linear_extrude of empty profile or non-positive height".to_string(),
            },
        ));
        return PolySet3D::empty();
    }

    let z_offset = if center { -height / 2.0 } else { 0.0 };
    let mut faces = Vec::new();

    let rot_at = |slice: u32| -> f64 { twist_degrees.to_radians() * (slice as f64 / slices as f64) };

    // One ring of transformed points per slice boundary, outline by outline.
    let ring_at = |slice: u32, outline: &Outline2D| -> Vec<DVec3> {
        let t = slice as f64 / slices as f64;
        let z = z_offset + t * height;
        let s = DVec2::new(1.0 + (scale.x - 1.0) * t, 1.0 + (scale.y - 1.0) * t);
        let rot = DMat2::from_angle(rot_at(slice));
        outline
            .points
            .iter()
            .map(|p| {
                let scaled = DVec2::new(p.x * s.x, p.y * s.y);
                let rotated = rot * scaled;
                DVec3::new(rotated.x, rotated.y, z)
            })
            .collect()
    };

    for outline in &profile.outlines {
        let n = outline.points.len();
        if n < 2 {
            continue;
        }
        let mut rings = Vec::with_capacity(slices as usize + 1);
        for slice in 0..=slices {
            rings.push(ring_at(slice, outline));
        }
        for (slice, w) in rings.windows(2).enumerate() {
            let (lower, upper) = (&w[0], &w[1]);
            let rot_prev = rot_at(slice as u32);
            let rot_next = rot_at(slice as u32 + 1);
            // Under twist the quad's two diagonal choices aren't equivalent:
            // picking the one this tie-break names keeps both triangles
            // non-degenerate as the ring rotates between slices.
            let alternate_diagonal = (rot_prev - rot_next).sin() < 0.0;
            for i in 0..n {
                let j = (i + 1) % n;
                if alternate_diagonal {
                    faces.push(Face3D {
                        vertices: vec![lower[i], lower[j], upper[i]],
                        color: None,
                    });
                    faces.push(Face3D {
                        vertices: vec![lower[j], upper[j], upper[i]],
                        color: None,
                    });
                } else {
                    faces.push(Face3D {
                        vertices: vec![lower[i], lower[j], upper[j]],
                        color: None,
                    });
                    faces.push(Face3D {
                        vertices: vec![lower[i], upper[j], upper[i]],
                        color: None,
                    });
                }
            }
        }
    }

    faces.extend(cap_faces(&profile, z_offset, false));
    let top_z = z_offset + height;
    let top_profile = scale_profile(&profile, scale, twist_degrees);
    faces.extend(cap_faces(&top_profile, top_z, true));

    PolySet3D {
        faces,
        color: profile.color,
        convexity: profile.convexity,
        is_2d_slab: false,
    }
}

fn scale_profile(profile: &Polygon2D, scale: DVec2, twist_degrees: f64) -> Polygon2D {
    let rot = DMat2::from_angle(twist_degrees.to_radians());
    let outlines = profile
        .outlines
        .iter()
        .map(|o| Outline2D {
            points: o
                .points
                .iter()
                .map(|p| rot * DVec2::new(p.x * scale.x, p.y * scale.y))
                .collect(),
            positive: o.positive,
        })
        .collect();
    Polygon2D {
        outlines,
        sanitized: profile.sanitized,
        convexity: profile.convexity,
        color: profile.color,
    }
}

/// Triangulates a (sanitized) profile as a planar cap at height `z`. `flip`
/// reverses winding for the top cap, which faces +z rather than -z.
fn cap_faces(profile: &Polygon2D, z: f64, flip: bool) -> Vec<Face3D> {
    let mut faces = Vec::new();
    for outline in &profile.outlines {
        if outline.points.len() < 3 {
            continue;
        }
        let mut pts: Vec<DVec3> = outline.points.iter().map(|p| DVec3::new(p.x, p.y, z)).collect();
        if flip {
            pts.reverse();
        }
        let anchor = pts[0];
        for i in 1..pts.len() - 1 {
            faces.push(Face3D {
                vertices: vec![anchor, pts[i], pts[i + 1]],
                color: None,
            });
        }
    }
    faces
}

/// Revolves `profile` around the z axis by `angle_degrees` (`(0, 360]`).
/// Every vertex must be non-negative x, or every vertex non-positive x;
/// a profile straddling the y axis is rejected with an error rather than
/// silently clamped, since clamping would collapse part of the profile
/// onto the axis and produce a self-intersecting solid.
///
/// A sweep strictly less than 360 degrees caps both end faces with the
/// (unrevolved) profile.
pub fn rotate_extrude(
    node_index: u32,
    profile: Polygon2D,
    angle_degrees: f64,
    segments: SegmentParams,
    warnings: &mut Vec<Warning>,
) -> PolySet3D {
    if profile.is_empty() || !(angle_degrees > 0.0) {
        warnings.push(Warning::new(
            node_index,
            CoreError::DegenerateTransform {
                node_index,
                reason: "rotate_extrude of empty profile or non-positive angle".to_string(),
            },
        ));
        return PolySet3D::empty();
    }
    let Some((lo, hi)) = profile.bbox() else {
        return PolySet3D::empty();
    };
    if lo.x < 0.0 && hi.x > 0.0 {
        warnings.push(Warning::new(
            node_index,
            CoreError::DegenerateTransform {
                node_index,
                reason: format!(
                    "rotate_extrude profile must have all x >= 0 or all x <= 0, got range {}..{}",
                    lo.x, hi.x
                ),
            },
        ));
        return PolySet3D::empty();
    }
    let all_non_positive = hi.x <= 0.0;

    let max_radius = hi.x.max(-lo.x).max(0.0);
    let fragments = segments.fragments(max_radius).max(3);
    let full_circle = (angle_degrees - 360.0).abs() < config::constants::EPSILON;
    let steps = if full_circle {
        fragments
    } else {
        ((fragments as f64 * angle_degrees / 360.0).ceil() as u32).max(1)
    };
    // §4.5.5: all-positive-x with a partial sweep, or all-negative-x with a
    // full sweep, comes out with reversed winding; flip it back.
    let flip_winding = (!all_non_positive && !full_circle) || (all_non_positive && full_circle);

    let mut faces = Vec::new();
    // §4.5.6 legacy offset: ring `step` sits at `step·angle/steps − 90°`
    // rather than starting at 0, so a full rotation's first ring lands on
    // the +x half-plane once the sweep wraps back around.
    let ring_angle = |step: u32| -> f64 { (angle_degrees * (step as f64 / steps as f64) - 90.0).to_radians() };
    let ring_at = |step: u32, outline: &Outline2D| -> Vec<DVec3> {
        let (sin, cos) = ring_angle(step).sin_cos();
        outline
            .points
            .iter()
            .map(|p| DVec3::new(p.x * cos, p.x * sin, p.y))
            .collect()
    };

    for outline in &profile.outlines {
        let n = outline.points.len();
        if n < 2 {
            continue;
        }
        let mut rings = Vec::with_capacity(steps as usize + 1);
        for step in 0..=steps {
            rings.push(ring_at(step, outline));
        }
        for w in rings.windows(2) {
            let (lower, upper) = (&w[0], &w[1]);
            for i in 0..n {
                let j = (i + 1) % n;
                push_quad(&mut faces, lower[i], lower[j], upper[j], upper[i], flip_winding);
            }
        }
    }

    if !full_circle {
        faces.extend(cap_in_plane(&profile, ring_angle(0), true));
        faces.extend(cap_in_plane(&profile, ring_angle(steps), false));
    }

    PolySet3D {
        faces,
        color: profile.color,
        convexity: profile.convexity,
        is_2d_slab: false,
    }
}

/// Emits the two triangles of a quad `a, b, c, d` (in CCW winding order,
/// before any flip), reversing vertex order in each if `flip` is set.
fn push_quad(faces: &mut Vec<Face3D>, a: DVec3, b: DVec3, c: DVec3, d: DVec3, flip: bool) {
    let tri = |v0: DVec3, v1: DVec3, v2: DVec3| Face3D {
        vertices: if flip { vec![v2, v1, v0] } else { vec![v0, v1, v2] },
        color: None,
    };
    faces.push(tri(a, b, c));
    faces.push(tri(a, c, d));
}

/// Caps the revolution at a fixed angle (radians, already including the
/// legacy ring offset), placing the (xy-plane) profile into the plane
/// containing the z axis at that angle.
fn cap_in_plane(profile: &Polygon2D, angle_radians: f64, flip: bool) -> Vec<Face3D> {
    let (sin, cos) = angle_radians.sin_cos();
    let mut faces = Vec::new();
    for outline in &profile.outlines {
        if outline.points.len() < 3 {
            continue;
        }
        let mut pts: Vec<DVec3> = outline
            .points
            .iter()
            .map(|p| DVec3::new(p.x * cos, p.x * sin, p.y))
            .collect();
        if flip {
            pts.reverse();
        }
        let anchor = pts[0];
        for i in 1..pts.len() - 1 {
            faces.push(Face3D {
                vertices: vec![anchor, pts[i], pts[i + 1]],
                color: None,
            });
        }
    }
    faces
}
