//! # Node Tree (C1)
//!
//! The tagged sum type representing the scene graph handed to the core by
//! its script-evaluator collaborator. A [`Node`] owns its children; the
//! tree is immutable once built except for the bottom-up rewrites the
//! normalizer performs in place.

use glam::DMat4;

/// Boolean operator kind for [`NodeKind::CsgOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    /// Union of all children.
    Union,
    /// Intersection of all children.
    Intersection,
    /// First child minus the remaining children.
    Difference,
}

impl BooleanOp {
    /// The canonical, whitespace-free token used in fingerprints.
    pub fn token(self) -> &'static str {
        match self {
            BooleanOp::Union => "union",
            BooleanOp::Intersection => "intersection",
            BooleanOp::Difference => "difference",
        }
    }
}

/// Non-boolean combining operator kind for [`NodeKind::AdvCsgOp`].
#[derive(Debug, Clone, PartialEq)]
pub enum AdvOp {
    /// Minkowski sum of all children.
    Minkowski,
    /// Convex hull of all children's vertices.
    Hull,
    /// Rescale the bounding box of the children's union.
    Resize {
        /// Target size; a zero component with the matching `autosize` flag
        /// set means "derive from the other axes' scale".
        new_size: glam::DVec3,
        /// Per-axis auto-size flags.
        autosize: [bool; 3],
    },
}

/// Parameters for the three 3D primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive3DKind {
    /// Axis-aligned box.
    Cube {
        /// Full size along each axis.
        size: glam::DVec3,
        /// Centered at the origin rather than `[0,size]^3`.
        center: bool,
    },
    /// A UV sphere (or, for OpenSCAD parity, a latitude/longitude sphere
    /// without pole vertices).
    Sphere {
        /// Radius.
        r: f64,
        /// Curve discretization.
        segments: SegmentParams,
    },
    /// A cylinder or cone (`r1 != r2`).
    Cylinder {
        /// Height along z.
        h: f64,
        /// Bottom radius.
        r1: f64,
        /// Top radius.
        r2: f64,
        /// Centered on z rather than `[0,h]`.
        center: bool,
        /// Curve discretization.
        segments: SegmentParams,
    },
    /// An explicit face/vertex mesh.
    Polyhedron {
        /// Vertex positions.
        points: Vec<glam::DVec3>,
        /// Faces, each a list of vertex indices (CCW, outward normal).
        faces: Vec<Vec<u32>>,
        /// Convexity hint passed through to ray-based renderers.
        convexity: u32,
    },
}

/// Parameters for the three 2D primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive2DKind {
    /// Axis-aligned rectangle.
    Square {
        /// Full size along x/y.
        size: glam::DVec2,
        /// Centered at the origin.
        center: bool,
    },
    /// A circle (or discretized ellipse-free disc).
    Circle {
        /// Radius.
        r: f64,
        /// Curve discretization.
        segments: SegmentParams,
    },
    /// An explicit polygon, optionally with holes.
    Polygon {
        /// Outer/hole point ring, flattened; see `paths` for grouping.
        points: Vec<glam::DVec2>,
        /// Index paths into `points`; first path is the outline, the rest
        /// are holes. Empty means a single outline using all points in order.
        paths: Vec<Vec<u32>>,
        /// Convexity hint.
        convexity: u32,
    },
}

/// Curve discretization parameters (OpenSCAD's `$fn`/`$fa`/`$fs`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParams {
    /// Forced fragment count; `0` means "derive from `fa`/`fs`".
    pub fn_: u32,
    /// Minimum angle per fragment, in degrees.
    pub fa: f64,
    /// Minimum fragment edge length.
    pub fs: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            fn_: config::constants::DEFAULT_FN as u32,
            fa: config::constants::DEFAULT_FA,
            fs: config::constants::DEFAULT_FS,
        }
    }
}

impl SegmentParams {
    /// Number of fragments to use for a circle of the given radius,
    /// following OpenSCAD's `max(ceil(360/fa), ceil(2*pi*r/fs), 3)` rule
    /// when `fn_` is not forced.
    pub fn fragments(&self, radius: f64) -> u32 {
        config::constants::compute_fragments(radius, self.fn_ as f64, self.fa, self.fs)
    }
}

/// User tags carried by a "modinst" record: background/highlight/root-mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModInst {
    /// `%` prefix: shown in preview, excluded from the union/output.
    pub background: bool,
    /// `#` prefix: shown in preview with emphasis, normal in output.
    pub highlight: bool,
    /// `!` prefix: restricts the whole tree's output to root-marked subtrees.
    pub root_mark: bool,
}

impl ModInst {
    /// True if any tag is set.
    pub fn is_tagged(&self) -> bool {
        self.background || self.highlight || self.root_mark
    }
}

/// The variant payload of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A 3D primitive leaf.
    Primitive3D(Primitive3DKind),
    /// A 2D primitive leaf.
    Primitive2D(Primitive2DKind),
    /// A boolean combinator.
    CsgOp(BooleanOp),
    /// A non-boolean combinator.
    AdvCsgOp(AdvOp),
    /// An affine transform applied to the union of children.
    Transform(DMat4),
    /// A color tag applied to the union of children.
    Color([f32; 4]),
    /// Sweeps the 2D union of children along z.
    LinearExtrude {
        /// Extrusion height.
        height: f64,
        /// Total twist in degrees, bottom to top.
        twist: f64,
        /// Final x/y scale relative to the base profile.
        scale: glam::DVec2,
        /// Number of intermediate rings (at least 1).
        slices: u32,
        /// Centered on z rather than `[0,height]`.
        center: bool,
    },
    /// Revolves the 2D union of children around the z axis.
    RotateExtrude {
        /// Sweep angle in degrees, `(0, 360]`.
        angle: f64,
        /// Curve discretization for the sweep.
        segments: SegmentParams,
    },
    /// Reduces the 3D union of children to a 2D polygon set.
    Projection {
        /// Slice at z=0 rather than project along z.
        cut: bool,
    },
    /// Forces kernel-backed (rather than clipping-library) evaluation of
    /// its subtree; otherwise behaves like [`NodeKind::Group`].
    Render,
    /// The tree root; unions its children by default.
    Root,
    /// A transparent grouping node; unions its children by default.
    Group,
    /// A non-unioning flatten point: children are evaluated independently.
    List,
}

impl NodeKind {
    /// The canonical token used by the fingerprint builder and by
    /// diagnostics. Does not include parameters.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Primitive3D(Primitive3DKind::Cube { .. }) => "cube",
            NodeKind::Primitive3D(Primitive3DKind::Sphere { .. }) => "sphere",
            NodeKind::Primitive3D(Primitive3DKind::Cylinder { .. }) => "cylinder",
            NodeKind::Primitive3D(Primitive3DKind::Polyhedron { .. }) => "polyhedron",
            NodeKind::Primitive2D(Primitive2DKind::Square { .. }) => "square",
            NodeKind::Primitive2D(Primitive2DKind::Circle { .. }) => "circle",
            NodeKind::Primitive2D(Primitive2DKind::Polygon { .. }) => "polygon",
            NodeKind::CsgOp(op) => op.token(),
            NodeKind::AdvCsgOp(AdvOp::Minkowski) => "minkowski",
            NodeKind::AdvCsgOp(AdvOp::Hull) => "hull",
            NodeKind::AdvCsgOp(AdvOp::Resize { .. }) => "resize",
            NodeKind::Transform(_) => "multmatrix",
            NodeKind::Color(_) => "color",
            NodeKind::LinearExtrude { .. } => "linear_extrude",
            NodeKind::RotateExtrude { .. } => "rotate_extrude",
            NodeKind::Projection { .. } => "projection",
            NodeKind::Render => "render",
            NodeKind::Root => "root",
            NodeKind::Group => "group",
            NodeKind::List => "list",
        }
    }

    /// Whether this is one of the "union-type" kinds that default to
    /// unioning their children (§4.5): `Group`, `Root`, `List`, bare
    /// `CsgOp(Union)`, `Color`, `Render`.
    pub fn is_union_type(&self) -> bool {
        matches!(
            self,
            NodeKind::Group
                | NodeKind::Root
                | NodeKind::List
                | NodeKind::Color(_)
                | NodeKind::Render
                | NodeKind::CsgOp(BooleanOp::Union)
        )
    }

    /// Structural nodes eligible for single-child unwrapping: `Group`,
    /// `Root`, `List`, or any `CsgOp`.
    pub fn is_structural_or_boolean(&self) -> bool {
        matches!(
            self,
            NodeKind::Group | NodeKind::Root | NodeKind::List | NodeKind::CsgOp(_)
        )
    }
}

/// A node in the scene graph.
///
/// Indices are assigned by the tree's builder and are stable and unique
/// within one tree (consecutive from 1); they exist purely for
/// diagnostics and are excluded from the fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable index, unique within the owning tree.
    pub index: u32,
    /// Owned children, in declaration order.
    pub children: Vec<Node>,
    /// User tags, if any were attached to this node.
    pub modinst: ModInst,
    /// The variant payload.
    pub kind: NodeKind,
}

impl Node {
    /// Builds a leaf or interior node with no tags.
    pub fn new(index: u32, kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            index,
            children,
            modinst: ModInst::default(),
            kind,
        }
    }

    /// Builds a node with explicit tags.
    pub fn tagged(index: u32, kind: NodeKind, children: Vec<Node>, modinst: ModInst) -> Self {
        Self {
            index,
            children,
            modinst,
            kind,
        }
    }

    /// True if this node is a 3D primitive leaf.
    pub fn is_3d_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Primitive3D(_))
    }

    /// True if this node is a 2D primitive leaf.
    pub fn is_2d_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Primitive2D(_))
    }

    /// Renumbers this subtree's indices consecutively from `start`,
    /// depth-first, returning the next free index. Used after normalizer
    /// rewrites invalidate the original numbering.
    pub fn renumber(&mut self, start: u32) -> u32 {
        self.index = start;
        let mut next = start + 1;
        for child in &mut self.children {
            next = child.renumber(next);
        }
        next
    }
}
