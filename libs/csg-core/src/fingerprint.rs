//! # Fingerprint Builder (C3)
//!
//! Produces a canonical, whitespace-free string for each subtree such that
//! structurally equivalent subtrees (same node kinds, same parameters, same
//! child fingerprints, in the same order) produce identical strings.
//! Node indices, source locations and other diagnostics-only fields are
//! excluded by construction — [`format_params`] only ever reads the
//! parameter fields of [`NodeKind`], never `Node::index`.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::node::{AdvOp, BooleanOp, Node, NodeKind, Primitive2DKind, Primitive3DKind};

/// Appends a canonical decimal rendering of `v` to `out`.
///
/// Uses a fixed number of significant digits so that floating-point noise
/// below the precision OpenSCAD-family kernels care about does not produce
/// spurious fingerprint mismatches, while staying far more precise than
/// any geometry-visible tolerance.
fn push_f64(out: &mut String, v: f64) {
    let _ = write!(out, "{v:.9}");
}

fn push_vec2(out: &mut String, v: glam::DVec2) {
    out.push('(');
    push_f64(out, v.x);
    out.push(',');
    push_f64(out, v.y);
    out.push(')');
}

fn push_vec3(out: &mut String, v: glam::DVec3) {
    out.push('(');
    push_f64(out, v.x);
    out.push(',');
    push_f64(out, v.y);
    out.push(',');
    push_f64(out, v.z);
    out.push(')');
}

/// Writes the node-kind token and its parameters (but not its children) to
/// `out`.
fn format_params(out: &mut String, kind: &NodeKind) {
    out.push_str(kind.name());
    match kind {
        NodeKind::Primitive3D(Primitive3DKind::Cube { size, center }) => {
            out.push('{');
            push_vec3(out, *size);
            let _ = write!(out, ",c={center}");
            out.push('}');
        }
        NodeKind::Primitive3D(Primitive3DKind::Sphere { r, segments }) => {
            let _ = write!(
                out,
                "{{r={r:.9},fn={},fa={:.9},fs={:.9}}}",
                segments.fn_, segments.fa, segments.fs
            );
        }
        NodeKind::Primitive3D(Primitive3DKind::Cylinder {
            h,
            r1,
            r2,
            center,
            segments,
        }) => {
            let _ = write!(
                out,
                "{{h={h:.9},r1={r1:.9},r2={r2:.9},c={center},fn={},fa={:.9},fs={:.9}}}",
                segments.fn_, segments.fa, segments.fs
            );
        }
        NodeKind::Primitive3D(Primitive3DKind::Polyhedron {
            points,
            faces,
            convexity,
        }) => {
            out.push('{');
            for p in points {
                push_vec3(out, *p);
            }
            out.push('|');
            for f in faces {
                out.push('[');
                for idx in f {
                    let _ = write!(out, "{idx},");
                }
                out.push(']');
            }
            let _ = write!(out, ",cx={convexity}}}");
        }
        NodeKind::Primitive2D(Primitive2DKind::Square { size, center }) => {
            out.push('{');
            push_vec2(out, *size);
            let _ = write!(out, ",c={center}}}");
        }
        NodeKind::Primitive2D(Primitive2DKind::Circle { r, segments }) => {
            let _ = write!(
                out,
                "{{r={r:.9},fn={},fa={:.9},fs={:.9}}}",
                segments.fn_, segments.fa, segments.fs
            );
        }
        NodeKind::Primitive2D(Primitive2DKind::Polygon {
            points,
            paths,
            convexity,
        }) => {
            out.push('{');
            for p in points {
                push_vec2(out, *p);
            }
            out.push('|');
            for path in paths {
                out.push('[');
                for idx in path {
                    let _ = write!(out, "{idx},");
                }
                out.push(']');
            }
            let _ = write!(out, ",cx={convexity}}}");
        }
        NodeKind::CsgOp(_) => {}
        NodeKind::AdvCsgOp(AdvOp::Minkowski) | NodeKind::AdvCsgOp(AdvOp::Hull) => {}
        NodeKind::AdvCsgOp(AdvOp::Resize { new_size, autosize }) => {
            out.push('{');
            push_vec3(out, *new_size);
            let _ = write!(out, ",a=({},{},{})}}", autosize[0], autosize[1], autosize[2]);
        }
        NodeKind::Transform(m) => {
            out.push('{');
            for col in m.to_cols_array() {
                push_f64(out, col);
                out.push(',');
            }
            out.push('}');
        }
        NodeKind::Color(rgba) => {
            let _ = write!(
                out,
                "{{{:.6},{:.6},{:.6},{:.6}}}",
                rgba[0], rgba[1], rgba[2], rgba[3]
            );
        }
        NodeKind::LinearExtrude {
            height,
            twist,
            scale,
            slices,
            center,
        } => {
            out.push('{');
            push_f64(out, *height);
            push_f64(out, *twist);
            push_vec2(out, *scale);
            let _ = write!(out, ",sl={slices},c={center}}}");
        }
        NodeKind::RotateExtrude { angle, segments } => {
            let _ = write!(
                out,
                "{{a={angle:.9},fn={},fa={:.9},fs={:.9}}}",
                segments.fn_, segments.fa, segments.fs
            );
        }
        NodeKind::Projection { cut } => {
            let _ = write!(out, "{{cut={cut}}}");
        }
        NodeKind::Render | NodeKind::Root | NodeKind::Group | NodeKind::List => {}
    }
}

/// Builds the canonical fingerprint string for the subtree rooted at
/// `node`, writing into `out` (exposed for reuse by callers building many
/// fingerprints without repeated allocation).
pub fn fingerprint_into(node: &Node, out: &mut String) {
    format_params(out, &node.kind);
    out.push('[');
    for (i, child) in node.children.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        fingerprint_into(child, out);
    }
    out.push(']');
}

/// Builds the canonical fingerprint string for the subtree rooted at `node`.
///
/// `fingerprint(a) == fingerprint(b)` implies `a` and `b` evaluate to equal
/// geometries; the converse need not hold.
pub fn fingerprint(node: &Node) -> String {
    let mut out = String::new();
    fingerprint_into(node, &mut out);
    out
}

/// A per-tree memoization table mapping node index to its fingerprint.
///
/// The node tree is immutable during one evaluation pass, so fingerprints
/// are computed once bottom-up and reused for the lifetime of the table;
/// building a new `FingerprintTable` (as the normalizer does after each
/// rewrite) is the invalidation mechanism.
#[derive(Debug, Default)]
pub struct FingerprintTable {
    by_index: HashMap<u32, String>,
}

impl FingerprintTable {
    /// Builds a table covering every node in the subtree rooted at `root`.
    pub fn build(root: &Node) -> Self {
        let mut table = Self::default();
        table.fill(root);
        table
    }

    fn fill(&mut self, node: &Node) {
        for child in &node.children {
            self.fill(child);
        }
        self.by_index.insert(node.index, fingerprint(node));
    }

    /// Looks up the fingerprint for a node by index, if previously built.
    pub fn get(&self, index: u32) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }
}
