//! Boolean combinators: union-type nodes and `CsgOp{intersection,difference}`
//! (§4.5).

use crate::error::{CoreError, CoreResult, Warning};
use crate::geometry::{Geometry, GeometryKernel, PolySet3D, Polygon2D};
use crate::node::BooleanOp;

/// One child's contribution to a boolean combinator: its geometry plus
/// whether it was tagged `%` (background — kept for bounding-box purposes
/// upstream, excluded from this combinator's output).
pub struct Operand {
    /// The child's evaluated geometry.
    pub geometry: Geometry,
    /// `%`-tagged: excluded from this node's output.
    pub background: bool,
}

/// Splits operands by dimension, warning (`DimensionMismatch`) and
/// dropping the 2D side if both are present — the dominant-dimension rule
/// applies uniformly to every boolean combinator in §4.5.
fn split_by_dimension(
    node_index: u32,
    op: &'static str,
    geoms: Vec<Geometry>,
    warnings: &mut Vec<Warning>,
) -> DimGroup {
    let mut polys2d = Vec::new();
    let mut polys3d = Vec::new();
    for g in geoms {
        match g {
            Geometry::Empty => {}
            Geometry::Polygon2D(p) => polys2d.push(p),
            Geometry::PolySet3D(p) => polys3d.push(p),
        }
    }
    if !polys2d.is_empty() && !polys3d.is_empty() {
        warnings.push(Warning::new(node_index, CoreError::DimensionMismatch { op }));
        DimGroup::ThreeD(polys3d)
    } else if !polys3d.is_empty() {
        DimGroup::ThreeD(polys3d)
    } else if !polys2d.is_empty() {
        DimGroup::TwoD(polys2d)
    } else {
        DimGroup::Empty
    }
}

enum DimGroup {
    Empty,
    TwoD(Vec<Polygon2D>),
    ThreeD(Vec<PolySet3D>),
}

/// Unions all non-background operands. Single-child fast path and the
/// empty-is-identity rule both fall out of folding with `union_geoms`.
pub fn union<K: GeometryKernel>(
    kernel: &K,
    node_index: u32,
    operands: Vec<Operand>,
    warnings: &mut Vec<Warning>,
) -> CoreResult<Geometry> {
    let geoms: Vec<Geometry> = operands
        .into_iter()
        .filter(|o| !o.background)
        .map(|o| o.geometry)
        .collect();
    if geoms.len() == 1 {
        return Ok(geoms.into_iter().next().expect("len checked"));
    }
    match split_by_dimension(node_index, "union", geoms, warnings) {
        DimGroup::Empty => Ok(Geometry::Empty),
        DimGroup::TwoD(polys) => {
            let polys: Vec<Polygon2D> = polys.into_iter().filter(|p| !p.is_empty()).collect();
            if polys.is_empty() {
                return Ok(Geometry::Empty);
            }
            Ok(Geometry::Polygon2D(kernel.union_2d(&polys)?))
        }
        DimGroup::ThreeD(polys) => {
            let nefs = nefs_from_polysets(kernel, &polys)?;
            if nefs.is_empty() {
                return Ok(Geometry::Empty);
            }
            if nefs.len() == 1 {
                return Ok(Geometry::PolySet3D(
                    kernel.polyset_from_nef(&nefs[0])?,
                ));
            }
            let unioned = kernel.union_many(&nefs)?;
            Ok(Geometry::PolySet3D(kernel.polyset_from_nef(&unioned)?))
        }
    }
}

fn nefs_from_polysets<K: GeometryKernel>(
    kernel: &K,
    polys: &[PolySet3D],
) -> CoreResult<Vec<K::Repr3D>> {
    let mut nefs = Vec::with_capacity(polys.len());
    for p in polys {
        if p.is_empty() {
            continue;
        }
        if let Some(nef) = kernel.nef_from_polyset(p)? {
            nefs.push(nef);
        }
    }
    Ok(nefs)
}

/// `CsgOp{intersection}` / `CsgOp{difference}`. `difference`'s first
/// operand is positive; every subsequent operand subtracts. Empty-operand
/// rules: intersection with any empty operand is empty; difference with
/// an empty first operand is empty; empty subsequent difference operands
/// are identity.
pub fn intersect_or_difference<K: GeometryKernel>(
    kernel: &K,
    node_index: u32,
    op: BooleanOp,
    children: Vec<Geometry>,
    warnings: &mut Vec<Warning>,
) -> CoreResult<Geometry> {
    debug_assert!(op != BooleanOp::Union);
    let op_name = op.token();
    match split_by_dimension(node_index, op_name, children, warnings) {
        DimGroup::Empty => Ok(Geometry::Empty),
        DimGroup::TwoD(polys) => intersect_or_difference_2d(kernel, op, polys),
        DimGroup::ThreeD(polys) => intersect_or_difference_3d(kernel, op, polys),
    }
}

fn intersect_or_difference_2d<K: GeometryKernel>(
    kernel: &K,
    op: BooleanOp,
    polys: Vec<Polygon2D>,
) -> CoreResult<Geometry> {
    let mut iter = polys.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Geometry::Empty);
    };
    if op == BooleanOp::Difference && first.is_empty() {
        return Ok(Geometry::Empty);
    }
    let mut acc = first;
    for next in iter {
        if op == BooleanOp::Intersection && next.is_empty() {
            return Ok(Geometry::Empty);
        }
        if op == BooleanOp::Difference && next.is_empty() {
            continue;
        }
        acc = match op {
            BooleanOp::Intersection => kernel.intersect_2d(&acc, &next)?,
            BooleanOp::Difference => kernel.difference_2d(&acc, &next)?,
            BooleanOp::Union => unreachable!("union handled separately"),
        };
    }
    Ok(Geometry::Polygon2D(acc))
}

fn intersect_or_difference_3d<K: GeometryKernel>(
    kernel: &K,
    op: BooleanOp,
    polys: Vec<PolySet3D>,
) -> CoreResult<Geometry> {
    let mut iter = polys.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Geometry::Empty);
    };
    if op == BooleanOp::Difference && first.is_empty() {
        return Ok(Geometry::Empty);
    }
    let Some(mut acc) = kernel.nef_from_polyset(&first)? else {
        return Ok(Geometry::Empty);
    };
    for next in iter {
        if op == BooleanOp::Intersection && next.is_empty() {
            return Ok(Geometry::Empty);
        }
        if next.is_empty() {
            continue;
        }
        let Some(next_nef) = kernel.nef_from_polyset(&next)? else {
            if op == BooleanOp::Intersection {
                return Ok(Geometry::Empty);
            }
            continue;
        };
        acc = match op {
            BooleanOp::Intersection => kernel.intersect(&acc, &next_nef)?,
            BooleanOp::Difference => kernel.difference(&acc, &next_nef)?,
            BooleanOp::Union => unreachable!("union handled separately"),
        };
    }
    Ok(Geometry::PolySet3D(kernel.polyset_from_nef(&acc)?))
}
