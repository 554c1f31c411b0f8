//! # Geometry (C6 output type) and the boolean-kernel contract (C8)
//!
//! [`Geometry`] is the tagged union produced by the evaluator: either
//! empty, a 2D polygon set, or a 3D polygon set. [`GeometryKernel`] is the
//! narrow trait a concrete boolean-kernel crate (e.g. `manifold-kernel`)
//! implements; `csg-core` depends only on this trait, never on a concrete
//! kernel, matching the black-box contract in the core's interface design.

use glam::{DVec2, DVec3};

use crate::error::CoreResult;

/// A single closed 2D outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline2D {
    /// Ordered boundary points.
    pub points: Vec<DVec2>,
    /// `true` for an outer boundary (positive winding), `false` for a hole
    /// (negative winding). Only meaningful once `Polygon2D::sanitized`.
    pub positive: bool,
}

impl Outline2D {
    /// Signed area via the shoelace formula; positive for CCW outlines.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let p0 = self.points[i];
            let p1 = self.points[(i + 1) % n];
            area += p0.x * p1.y - p1.x * p0.y;
        }
        area * 0.5
    }

    /// Reverses point order, flipping winding.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }
}

/// A 2D polygon set: zero or more outlines (outer boundaries and holes).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon2D {
    /// All outlines, outer boundaries and holes intermixed.
    pub outlines: Vec<Outline2D>,
    /// Whether outlines are known to be non-self-intersecting with
    /// canonical winding (CCW outer, CW holes). An unsanitized polygon may
    /// be handed to the clipping kernel to become sanitized.
    pub sanitized: bool,
    /// Convexity hint for ray-based renderers.
    pub convexity: u32,
    /// Optional uniform color.
    pub color: Option<[f32; 4]>,
}

impl Polygon2D {
    /// The empty polygon set.
    pub fn empty() -> Self {
        Self {
            outlines: Vec::new(),
            sanitized: true,
            convexity: 1,
            color: None,
        }
    }

    /// True if there are no outlines.
    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }

    /// Total vertex count across all outlines.
    pub fn vertex_count(&self) -> usize {
        self.outlines.iter().map(|o| o.points.len()).sum()
    }

    /// Axis-aligned bounding box, or `None` if empty.
    pub fn bbox(&self) -> Option<(DVec2, DVec2)> {
        let mut iter = self.outlines.iter().flat_map(|o| o.points.iter().copied());
        let first = iter.next()?;
        let (mut lo, mut hi) = (first, first);
        for p in iter {
            lo = lo.min(p);
            hi = hi.max(p);
        }
        Some((lo, hi))
    }
}

/// A single 3D face: a planar polygon, CCW when viewed from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Face3D {
    /// Ordered vertex positions (triangle if len == 3, general polygon
    /// otherwise).
    pub vertices: Vec<DVec3>,
    /// Optional per-face color, overriding [`PolySet3D::color`].
    pub color: Option<[f32; 4]>,
}

impl Face3D {
    /// Outward unit normal, via Newell's method (robust for non-triangular
    /// or near-degenerate faces).
    pub fn normal(&self) -> DVec3 {
        let mut n = DVec3::ZERO;
        let len = self.vertices.len();
        for i in 0..len {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % len];
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        n.normalize_or_zero()
    }
}

/// A 3D polygon set: a list of faces, optionally tagged as a thin 2D slab
/// (a projected/extrusion cap embedded in 3D) rather than a solid mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct PolySet3D {
    /// Faces making up the mesh or slab.
    pub faces: Vec<Face3D>,
    /// Default color applied to faces without their own.
    pub color: Option<[f32; 4]>,
    /// Convexity hint.
    pub convexity: u32,
    /// `true` when this polyset represents a 2D shape embedded in the xy
    /// plane (e.g. a rotate_extrude cap) rather than a closed solid.
    pub is_2d_slab: bool,
}

impl PolySet3D {
    /// The empty polyset.
    pub fn empty() -> Self {
        Self {
            faces: Vec::new(),
            color: None,
            convexity: 1,
            is_2d_slab: false,
        }
    }

    /// True if there are no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Axis-aligned bounding box, or `None` if empty.
    pub fn bbox(&self) -> Option<(DVec3, DVec3)> {
        let mut iter = self.faces.iter().flat_map(|f| f.vertices.iter().copied());
        let first = iter.next()?;
        let (mut lo, mut hi) = (first, first);
        for p in iter {
            lo = lo.min(p);
            hi = hi.max(p);
        }
        Some((lo, hi))
    }

    /// Signed volume via the divergence theorem, assuming triangulated
    /// faces with outward-facing normals and consistent winding. General
    /// (non-triangular) faces are fan-triangulated first.
    pub fn volume(&self) -> f64 {
        let mut vol = 0.0;
        for face in &self.faces {
            if face.vertices.len() < 3 {
                continue;
            }
            let v0 = face.vertices[0];
            for i in 1..face.vertices.len() - 1 {
                let v1 = face.vertices[i];
                let v2 = face.vertices[i + 1];
                vol += v0.dot(v1.cross(v2)) / 6.0;
            }
        }
        vol.abs()
    }
}

/// The evaluator's output type: empty, a 2D polygon set, or a 3D polyset.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// No geometry (propagates naturally, e.g. `difference` of equal sets).
    Empty,
    /// A 2D polygon set.
    Polygon2D(Polygon2D),
    /// A 3D polygon set.
    PolySet3D(PolySet3D),
}

impl Geometry {
    /// True for [`Geometry::Empty`], or for a non-empty variant whose
    /// contents are themselves empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Empty => true,
            Geometry::Polygon2D(p) => p.is_empty(),
            Geometry::PolySet3D(p) => p.is_empty(),
        }
    }

    /// True if this is a (possibly empty) 2D geometry.
    pub fn is_2d(&self) -> bool {
        matches!(self, Geometry::Polygon2D(_))
    }

    /// True if this is a (possibly empty) 3D geometry.
    pub fn is_3d(&self) -> bool {
        matches!(self, Geometry::PolySet3D(_))
    }

    /// Approximate in-memory footprint in bytes, used for cache accounting.
    pub fn byte_size(&self) -> usize {
        match self {
            Geometry::Empty => std::mem::size_of::<Self>(),
            Geometry::Polygon2D(p) => {
                std::mem::size_of::<Self>()
                    + p.outlines
                        .iter()
                        .map(|o| o.points.len() * std::mem::size_of::<DVec2>())
                        .sum::<usize>()
            }
            Geometry::PolySet3D(p) => {
                std::mem::size_of::<Self>()
                    + p.faces
                        .iter()
                        .map(|f| f.vertices.len() * std::mem::size_of::<DVec3>())
                        .sum::<usize>()
            }
        }
    }
}

/// The boolean-kernel contract (C8): every capability the evaluator
/// delegates to an external, swappable kernel.
///
/// `Repr3D` is the kernel's own internal representation of a 3D solid
/// (conceptually a Nef polyhedron or equivalent exact-arithmetic object);
/// it is what the kernel cache stores, distinct from [`PolySet3D`], which
/// is the evaluator-facing, boundary-representation form. A kernel may
/// choose `Repr3D = PolySet3D` if it has no separate internal form.
pub trait GeometryKernel: Send + Sync {
    /// The kernel's internal 3D representation.
    type Repr3D: Clone + Send + Sync;

    /// Converts a boundary-representation polyset to the kernel's internal
    /// form. Fails (returns `Ok(None)`) for non-manifold input rather than
    /// raising, per the local-recovery error policy.
    fn nef_from_polyset(&self, ps: &PolySet3D) -> CoreResult<Option<Self::Repr3D>>;

    /// Converts the kernel's internal form back to a boundary
    /// representation.
    fn polyset_from_nef(&self, nef: &Self::Repr3D) -> CoreResult<PolySet3D>;

    /// Repeatedly pairwise-unions the inputs.
    fn union_many(&self, nefs: &[Self::Repr3D]) -> CoreResult<Self::Repr3D>;

    /// Pairwise intersection.
    fn intersect(&self, a: &Self::Repr3D, b: &Self::Repr3D) -> CoreResult<Self::Repr3D>;

    /// Pairwise difference (`a - b`).
    fn difference(&self, a: &Self::Repr3D, b: &Self::Repr3D) -> CoreResult<Self::Repr3D>;

    /// Minkowski sum of two solids.
    fn minkowski(&self, a: &Self::Repr3D, b: &Self::Repr3D) -> CoreResult<Self::Repr3D>;

    /// Convex hull of the union of all input geometries' vertices. Accepts
    /// both 2D and 3D inputs (mixing is rejected earlier by the evaluator).
    fn hull(&self, geoms: &[Geometry]) -> CoreResult<Geometry>;

    /// Intersects `nef` with the z=0 plane and extracts outlines (`cut =
    /// true`), or projects all faces to z=0 and unions them (`cut =
    /// false`).
    fn project(&self, nef: &Self::Repr3D, cut: bool) -> CoreResult<Polygon2D>;

    /// 2D union via the clipping library.
    fn union_2d(&self, polys: &[Polygon2D]) -> CoreResult<Polygon2D>;

    /// 2D intersection via the clipping library.
    fn intersect_2d(&self, a: &Polygon2D, b: &Polygon2D) -> CoreResult<Polygon2D>;

    /// 2D difference via the clipping library.
    fn difference_2d(&self, a: &Polygon2D, b: &Polygon2D) -> CoreResult<Polygon2D>;
}
