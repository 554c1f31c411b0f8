//! `Projection{cut}` (§4.5): reduces the 3D union of children to 2D.

use crate::error::CoreResult;
use crate::geometry::{Geometry, GeometryKernel, Polygon2D};

/// Projects `solid` to the xy plane. `cut = true` intersects with the z=0
/// plane rather than flattening every face, producing a cross-section
/// instead of a silhouette.
///
/// Non-3D or empty input produces [`Polygon2D::empty`] rather than an
/// error: projection of nothing is nothing.
pub fn project<K: GeometryKernel>(
    kernel: &K,
    solid: Geometry,
    cut: bool,
) -> CoreResult<Polygon2D> {
    let Geometry::PolySet3D(ps) = solid else {
        return Ok(Polygon2D::empty());
    };
    if ps.is_empty() {
        return Ok(Polygon2D::empty());
    }
    let Some(nef) = kernel.nef_from_polyset(&ps)? else {
        return Ok(Polygon2D::empty());
    };
    kernel.project(&nef, cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PolySet3D;

    struct StubKernel;

    impl GeometryKernel for StubKernel {
        type Repr3D = PolySet3D;
        fn nef_from_polyset(&self, ps: &PolySet3D) -> CoreResult<Option<Self::Repr3D>> {
            Ok(Some(ps.clone()))
        }
        fn polyset_from_nef(&self, nef: &Self::Repr3D) -> CoreResult<PolySet3D> {
            Ok(nef.clone())
        }
        fn union_many(&self, nefs: &[Self::Repr3D]) -> CoreResult<Self::Repr3D> {
            Ok(nefs.first().cloned().unwrap_or_else(PolySet3D::empty))
        }
        fn intersect(&self, a: &Self::Repr3D, _b: &Self::Repr3D) -> CoreResult<Self::Repr3D> {
            Ok(a.clone())
        }
        fn difference(&self, a: &Self::Repr3D, _b: &Self::Repr3D) -> CoreResult<Self::Repr3D> {
            Ok(a.clone())
        }
        fn minkowski(&self, a: &Self::Repr3D, _b: &Self::Repr3D) -> CoreResult<Self::Repr3D> {
            Ok(a.clone())
        }
        fn hull(&self, geoms: &[Geometry]) -> CoreResult<Geometry> {
            Ok(geoms.first().cloned().unwrap_or(Geometry::Empty))
        }
        fn project(&self, _nef: &Self::Repr3D, _cut: bool) -> CoreResult<Polygon2D> {
            Ok(Polygon2D {
                outlines: vec![crate::geometry::Outline2D {
                    points: vec![],
                    positive: true,
                }],
                sanitized: true,
                convexity: 1,
                color: None,
            })
        }
        fn union_2d(&self, polys: &[Polygon2D]) -> CoreResult<Polygon2D> {
            Ok(polys.first().cloned().unwrap_or_else(Polygon2D::empty))
        }
        fn intersect_2d(&self, a: &Polygon2D, _b: &Polygon2D) -> CoreResult<Polygon2D> {
            Ok(a.clone())
        }
        fn difference_2d(&self, a: &Polygon2D, _b: &Polygon2D) -> CoreResult<Polygon2D> {
            Ok(a.clone())
        }
    }

    #[test]
    fn test_project_non_3d_input_is_empty() {
        let result = project(&StubKernel, Geometry::Empty, false).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_project_delegates_to_kernel() {
        let ps = PolySet3D {
            faces: vec![crate::geometry::Face3D {
                vertices: vec![glam::DVec3::ZERO, glam::DVec3::X, glam::DVec3::Y],
                color: None,
            }],
            color: None,
            convexity: 1,
            is_2d_slab: false,
        };
        let result = project(&StubKernel, Geometry::PolySet3D(ps), true).unwrap();
        assert_eq!(result.outlines.len(), 1);
    }
}
