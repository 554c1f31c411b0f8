//! Affine transform application (`NodeKind::Transform`, §4.5).

use glam::{DMat2, DMat4, DVec2};

use crate::error::{CoreError, Warning};
use crate::geometry::{Geometry, Outline2D, PolySet3D, Polygon2D};

/// Applies `m` to `geometry`, dispatching on dimension.
///
/// Rejects matrices containing NaN/infinity or with a near-zero
/// determinant, producing empty geometry and a [`Warning`] instead (the
/// `DegenerateTransform` tag).
pub fn apply_transform(
    node_index: u32,
    m: DMat4,
    geometry: Geometry,
    warnings: &mut Vec<Warning>,
) -> Geometry {
    if !m.is_finite() {
        warnings.push(Warning::new(
            node_index,
            CoreError::DegenerateTransform {
                node_index,
                reason: "matrix contains NaN or infinity".to_string(),
            },
        ));
        return Geometry::Empty;
    }
    let det = m.determinant();
    if det.abs() < config::constants::EPSILON {
        warnings.push(Warning::new(
            node_index,
            CoreError::DegenerateTransform {
                node_index,
                reason: format!("determinant is ~0 ({det})"),
            },
        ));
        return Geometry::Empty;
    }

    match geometry {
        Geometry::Empty => Geometry::Empty,
        Geometry::Polygon2D(p) => Geometry::Polygon2D(apply_2d(m, p)),
        Geometry::PolySet3D(p) => Geometry::PolySet3D(apply_3d(m, p)),
    }
}

/// 2D transforms use the matrix's top-left 2×2 block plus translation. A
/// negative determinant on that block flips winding for a sanitized
/// polygon so its outlines stay canonically wound.
fn apply_2d(m: DMat4, mut poly: Polygon2D) -> Polygon2D {
    let block = DMat2::from_cols(
        DVec2::new(m.x_axis.x, m.x_axis.y),
        DVec2::new(m.y_axis.x, m.y_axis.y),
    );
    let translation = DVec2::new(m.w_axis.x, m.w_axis.y);
    let flip = poly.sanitized && block.determinant() < 0.0;

    for outline in &mut poly.outlines {
        for p in &mut outline.points {
            *p = block * *p + translation;
        }
        if flip {
            outline.reverse();
            outline.positive = !outline.positive;
        }
    }
    poly
}

fn apply_3d(m: DMat4, mut ps: PolySet3D) -> PolySet3D {
    for face in &mut ps.faces {
        for v in &mut face.vertices {
            *v = m.transform_point3(*v);
        }
    }
    ps
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_nan_matrix_produces_empty_with_warning() {
        let mut warnings = Vec::new();
        let m = DMat4::from_cols_array(&[f64::NAN; 16]);
        let result = apply_transform(1, m, Geometry::Empty, &mut warnings);
        assert_eq!(result, Geometry::Empty);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_zero_determinant_produces_empty() {
        let mut warnings = Vec::new();
        let m = DMat4::from_scale(DVec3::new(0.0, 1.0, 1.0));
        let geometry = Geometry::PolySet3D(PolySet3D::empty());
        let result = apply_transform(1, m, geometry, &mut warnings);
        assert_eq!(result, Geometry::Empty);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_negative_determinant_flips_winding_on_sanitized_2d() {
        let mut warnings = Vec::new();
        let m = DMat4::from_scale(DVec3::new(-1.0, 1.0, 1.0));
        let square = Polygon2D {
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
        };
        let before_area = square.outlines[0].signed_area();
        let result = apply_transform(1, m, Geometry::Polygon2D(square), &mut warnings);
        let Geometry::Polygon2D(p) = result else {
            panic!("expected polygon")
        };
        assert!(warnings.is_empty());
        // Mirrored and then winding-corrected: area sign should still read
        // positive for the (re-reversed) outline.
        assert!(before_area > 0.0);
        assert!(p.outlines[0].positive);
    }

    #[test]
    fn test_translation_moves_3d_vertex() {
        let mut warnings = Vec::new();
        let m = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
        let ps = PolySet3D {
            faces: vec![crate::geometry::Face3D {
                vertices: vec![DVec3::ZERO, DVec3::X, DVec3::Y],
                color: None,
            }],
            color: None,
            convexity: 1,
            is_2d_slab: false,
        };
        let result = apply_transform(1, m, Geometry::PolySet3D(ps), &mut warnings);
        let Geometry::PolySet3D(p) = result else {
            panic!("expected polyset")
        };
        assert_eq!(p.faces[0].vertices[0], DVec3::new(1.0, 2.0, 3.0));
    }
}
