//! `AdvCsgOp{minkowski,hull,resize}` (§4.5).

use glam::{DMat4, DVec3};

use crate::error::{CoreError, CoreResult, Warning};
use crate::geometry::{Geometry, GeometryKernel, PolySet3D, Polygon2D};

/// Minkowski sum of all operands. Mixed-dimension input (one 2D, one 3D
/// operand) is a [`CoreError::DimensionMismatch`] warning degrading to
/// empty; same-dimension 2D input is summed outline-wise via repeated 2D
/// unions of a translated copy, which is the degenerate-but-correct
/// specialization of a 3D Minkowski sum to z=0.
pub fn minkowski<K: GeometryKernel>(
    kernel: &K,
    node_index: u32,
    operands: Vec<Geometry>,
    warnings: &mut Vec<Warning>,
) -> CoreResult<Geometry> {
    let non_empty: Vec<Geometry> = operands.into_iter().filter(|g| !g.is_empty()).collect();
    if non_empty.is_empty() {
        return Ok(Geometry::Empty);
    }
    if non_empty.len() == 1 {
        return Ok(non_empty.into_iter().next().expect("len checked"));
    }
    let all_3d = non_empty.iter().all(Geometry::is_3d);
    let all_2d = non_empty.iter().all(Geometry::is_2d);
    if !all_3d && !all_2d {
        warnings.push(Warning::new(
            node_index,
            CoreError::DimensionMismatch { op: "minkowski" },
        ));
        return Ok(Geometry::Empty);
    }

    if all_3d {
        let mut iter = non_empty.into_iter();
        let Geometry::PolySet3D(first) = iter.next().expect("non-empty") else {
            unreachable!("all_3d checked")
        };
        let Some(mut acc) = kernel.nef_from_polyset(&first)? else {
            return Ok(Geometry::Empty);
        };
        for g in iter {
            let Geometry::PolySet3D(ps) = g else {
                unreachable!("all_3d checked")
            };
            let Some(nef) = kernel.nef_from_polyset(&ps)? else {
                continue;
            };
            acc = kernel.minkowski(&acc, &nef)?;
        }
        Ok(Geometry::PolySet3D(kernel.polyset_from_nef(&acc)?))
    } else {
        // 2D Minkowski: union of the first operand translated to every
        // point of the second, repeated pairwise across the operand list.
        let mut iter = non_empty.into_iter();
        let Geometry::Polygon2D(mut acc) = iter.next().expect("non-empty") else {
            unreachable!("all_2d checked")
        };
        for g in iter {
            let Geometry::Polygon2D(next) = g else {
                unreachable!("all_2d checked")
            };
            acc = minkowski_2d(kernel, &acc, &next)?;
        }
        Ok(Geometry::Polygon2D(acc))
    }
}

fn minkowski_2d<K: GeometryKernel>(kernel: &K, a: &Polygon2D, b: &Polygon2D) -> CoreResult<Polygon2D> {
    let translations: Vec<glam::DVec2> = b.outlines.iter().flat_map(|o| o.points.iter().copied()).collect();
    if translations.is_empty() {
        return Ok(a.clone());
    }
    let copies: Vec<Polygon2D> = translations
        .into_iter()
        .map(|t| {
            let outlines = a
                .outlines
                .iter()
                .map(|o| crate::geometry::Outline2D {
                    points: o.points.iter().map(|p| *p + t).collect(),
                    positive: o.positive,
                })
                .collect();
            Polygon2D {
                outlines,
                sanitized: a.sanitized,
                convexity: a.convexity,
                color: a.color,
            }
        })
        .collect();
    kernel.union_2d(&copies)
}

/// Convex hull of the union of all operands' vertices. Mixed 2D/3D input is
/// accepted by the kernel directly (§4.5's hull is the one combinator that
/// does not enforce dimensional uniformity).
pub fn hull<K: GeometryKernel>(kernel: &K, operands: Vec<Geometry>) -> CoreResult<Geometry> {
    let non_empty: Vec<Geometry> = operands.into_iter().filter(|g| !g.is_empty()).collect();
    if non_empty.is_empty() {
        return Ok(Geometry::Empty);
    }
    kernel.hull(&non_empty)
}

/// Rescales the bounding box of `geometry` to `new_size`, preserving its
/// center. A zero `new_size` component with `autosize` false leaves that
/// axis unscaled; with `autosize` true, that axis takes the largest
/// explicit scale factor computed on the other axes (or 1.0 if none is
/// explicit).
pub fn resize(
    node_index: u32,
    geometry: Geometry,
    new_size: DVec3,
    autosize: [bool; 3],
    warnings: &mut Vec<Warning>,
) -> Geometry {
    match geometry {
        Geometry::Empty => Geometry::Empty,
        Geometry::Polygon2D(p) => {
            let Some((lo, hi)) = p.bbox() else {
                return Geometry::Polygon2D(p);
            };
            let extent = hi - lo;
            let center = (lo + hi) * 0.5;
            let scale2 = resize_scale_2d(
                glam::DVec2::new(extent.x, extent.y),
                glam::DVec2::new(new_size.x, new_size.y),
                [autosize[0], autosize[1]],
            );
            let outlines = p
                .outlines
                .iter()
                .map(|o| crate::geometry::Outline2D {
                    points: o
                        .points
                        .iter()
                        .map(|pt| center + (*pt - center) * scale2)
                        .collect(),
                    positive: o.positive,
                })
                .collect();
            Geometry::Polygon2D(Polygon2D {
                outlines,
                sanitized: p.sanitized,
                convexity: p.convexity,
                color: p.color,
            })
        }
        Geometry::PolySet3D(ps) => {
            let Some((lo, hi)) = ps.bbox() else {
                return Geometry::PolySet3D(ps);
            };
            let extent = hi - lo;
            if extent.x.min(extent.y).min(extent.z) < config::constants::EPSILON {
                warnings.push(Warning::new(
                    node_index,
                    CoreError::DegenerateTransform {
                        node_index,
                        reason: "resize of a degenerate (zero-extent) bounding box".to_string(),
                    },
                ));
            }
            let scale = resize_scale_3d(extent, new_size, autosize);
            let center = (lo + hi) * 0.5;
            let m = DMat4::from_translation(center)
                * DMat4::from_scale(scale)
                * DMat4::from_translation(-center);
            super::transform::apply_transform(node_index, m, Geometry::PolySet3D(ps), warnings)
        }
    }
}

fn resize_scale_2d(extent: glam::DVec2, new_size: glam::DVec2, autosize: [bool; 2]) -> glam::DVec2 {
    let explicit = [
        axis_scale(extent.x, new_size.x, autosize[0]),
        axis_scale(extent.y, new_size.y, autosize[1]),
    ];
    let fallback = largest_explicit(&explicit);
    glam::DVec2::new(
        explicit[0].unwrap_or(fallback),
        explicit[1].unwrap_or(fallback),
    )
}

fn resize_scale_3d(extent: DVec3, new_size: DVec3, autosize: [bool; 3]) -> DVec3 {
    let explicit = [
        axis_scale(extent.x, new_size.x, autosize[0]),
        axis_scale(extent.y, new_size.y, autosize[1]),
        axis_scale(extent.z, new_size.z, autosize[2]),
    ];
    let fallback = largest_explicit(&explicit);
    DVec3::new(
        explicit[0].unwrap_or(fallback),
        explicit[1].unwrap_or(fallback),
        explicit[2].unwrap_or(fallback),
    )
}

/// `None` means "derive from the other axes" — either `autosize` was set,
/// or `new_size` was 0 with `autosize` unset, which leaves the axis at
/// scale 1.0 (handled by the zero-new_size branch below, not `None`).
fn axis_scale(extent: f64, new_size: f64, autosize: bool) -> Option<f64> {
    if autosize {
        return None;
    }
    if new_size <= 0.0 {
        return Some(1.0);
    }
    if extent.abs() < config::constants::EPSILON {
        return Some(1.0);
    }
    Some(new_size / extent)
}

fn largest_explicit(explicit: &[Option<f64>]) -> f64 {
    explicit
        .iter()
        .filter_map(|s| *s)
        .fold(1.0_f64, |acc, s| if s > acc { s } else { acc })
}
