//! # Geometry Export
//!
//! Text-format exporters for evaluated geometry: STL, OFF, and WRL for
//! [`PolySet3D`], SVG for [`Polygon2D`]. The teacher's original version of
//! this module only emitted `f32` GPU buffers for WebGL rendering; these
//! exporters write the on-disk interchange formats a CSG evaluator's output
//! is actually handed off to downstream tools in.
//!
//! All numeric output goes through [`fmt_num`], which always renders a
//! period decimal point regardless of the process locale — `write!`/`{}`
//! on `f64` never consults `LC_NUMERIC`, but routing every number through
//! one function keeps that guarantee visible and gives every format the
//! same precision.

use csg_core::geometry::{Outline2D, PolySet3D, Polygon2D};

use crate::kernel_impl::polyset_to_mesh;

/// Fixed-precision, period-decimal formatting for exported coordinates.
fn fmt_num(x: f64) -> String {
    format!("{x:.6}")
}

/// Serializes `ps` to ASCII STL (`solid ... endsolid`).
///
/// Faces are triangulated first (STL has no concept of an n-gon), and a
/// per-triangle facet normal is computed via the cross product of its edges
/// rather than reused from the source face, matching what `cross_section`
/// does wherever a derived normal is needed.
pub fn to_stl(ps: &PolySet3D, name: &str) -> String {
    let mesh = polyset_to_mesh(ps);
    let mut out = String::new();
    out.push_str(&format!("solid {name}\n"));
    for tri in mesh.indices.chunks_exact(3) {
        let v = |i: u32| {
            let b = i as usize * 3;
            [mesh.vertices[b] as f64, mesh.vertices[b + 1] as f64, mesh.vertices[b + 2] as f64]
        };
        let [a, b, c] = [v(tri[0]), v(tri[1]), v(tri[2])];
        let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        let n = [
            ab[1] * ac[2] - ab[2] * ac[1],
            ab[2] * ac[0] - ab[0] * ac[2],
            ab[0] * ac[1] - ab[1] * ac[0],
        ];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        let n = if len > 1e-12 { [n[0] / len, n[1] / len, n[2] / len] } else { [0.0, 0.0, 0.0] };
        out.push_str(&format!(
            "  facet normal {} {} {}\n    outer loop\n",
            fmt_num(n[0]),
            fmt_num(n[1]),
            fmt_num(n[2])
        ));
        for p in [a, b, c] {
            out.push_str(&format!(
                "      vertex {} {} {}\n",
                fmt_num(p[0]),
                fmt_num(p[1]),
                fmt_num(p[2])
            ));
        }
        out.push_str("    endloop\n  endfacet\n");
    }
    out.push_str(&format!("endsolid {name}\n"));
    out
}

/// Serializes `ps` to Geomview OFF. Unlike STL, OFF faces keep their
/// original arity, so the source polygons are deduplicated into a shared
/// vertex array and indexed rather than triangulated.
pub fn to_off(ps: &PolySet3D) -> String {
    let mut vertices: Vec<[f64; 3]> = Vec::new();
    let mut lookup: std::collections::HashMap<(i64, i64, i64), usize> = std::collections::HashMap::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();
    let scale = 1e6;
    for face in &ps.faces {
        let mut indices = Vec::with_capacity(face.vertices.len());
        for v in &face.vertices {
            let key = ((v.x * scale).round() as i64, (v.y * scale).round() as i64, (v.z * scale).round() as i64);
            let idx = *lookup.entry(key).or_insert_with(|| {
                vertices.push([v.x, v.y, v.z]);
                vertices.len() - 1
            });
            indices.push(idx);
        }
        if indices.len() >= 3 {
            faces.push(indices);
        }
    }

    let mut out = String::new();
    out.push_str("OFF\n");
    out.push_str(&format!("{} {} 0\n", vertices.len(), faces.len()));
    for v in &vertices {
        out.push_str(&format!("{} {} {}\n", fmt_num(v[0]), fmt_num(v[1]), fmt_num(v[2])));
    }
    for f in &faces {
        let idx_str: Vec<String> = f.iter().map(|i| i.to_string()).collect();
        out.push_str(&format!("{} {}\n", f.len(), idx_str.join(" ")));
    }
    out
}

/// Serializes `ps` to a VRML97 `IndexedFaceSet`. Like OFF, faces are emitted
/// at their original arity (VRML's `coordIndex` terminates each face with
/// `-1` rather than carrying an explicit arity count).
pub fn to_wrl(ps: &PolySet3D) -> String {
    let mut vertices: Vec<[f64; 3]> = Vec::new();
    let mut lookup: std::collections::HashMap<(i64, i64, i64), usize> = std::collections::HashMap::new();
    let mut coord_index: Vec<String> = Vec::new();
    let scale = 1e6;
    for face in &ps.faces {
        if face.vertices.len() < 3 {
            continue;
        }
        for v in &face.vertices {
            let key = ((v.x * scale).round() as i64, (v.y * scale).round() as i64, (v.z * scale).round() as i64);
            let idx = *lookup.entry(key).or_insert_with(|| {
                vertices.push([v.x, v.y, v.z]);
                vertices.len() - 1
            });
            coord_index.push(idx.to_string());
        }
        coord_index.push("-1".to_string());
    }

    let point_lines: Vec<String> = vertices
        .iter()
        .map(|v| format!("{} {} {}", fmt_num(v[0]), fmt_num(v[1]), fmt_num(v[2])))
        .collect();

    format!(
        "#VRML V2.0 utf8\nShape {{\n  geometry IndexedFaceSet {{\n    coord Coordinate {{\n      point [\n        {}\n      ]\n    }}\n    coordIndex [\n      {}\n    ]\n    solid TRUE\n  }}\n}}\n",
        point_lines.join(",\n        "),
        coord_index.join(", "),
    )
}

/// Serializes `poly` to SVG, one `<path>` per outline with the even-odd
/// fill rule so holes (negative outlines) render correctly without needing
/// to be nested under their containing outline. SVG's y-axis grows
/// downward, so outline y-coordinates are negated to keep CAD "up" pointing
/// up on screen.
pub fn to_svg(poly: &Polygon2D) -> String {
    if poly.is_empty() {
        return "<svg xmlns=\"http://www.w3.org/2000/svg\"/>\n".to_string();
    }
    let bbox = poly.bbox().expect("non-empty polygon has a bbox");
    let margin = 1.0;
    let (min_x, min_y, max_x, max_y) = (bbox.0.x - margin, -bbox.1.y - margin, bbox.1.x + margin, -bbox.0.y + margin);
    let (w, h) = (max_x - min_x, max_y - min_y);

    let mut path = String::new();
    for outline in &poly.outlines {
        path.push_str(&svg_outline_path(outline));
    }

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\">\n  <path d=\"{}\" fill-rule=\"evenodd\" fill=\"black\" stroke=\"none\"/>\n</svg>\n",
        fmt_num(min_x),
        fmt_num(min_y),
        fmt_num(w),
        fmt_num(h),
        path.trim_end(),
    )
}

fn svg_outline_path(outline: &Outline2D) -> String {
    if outline.points.is_empty() {
        return String::new();
    }
    let mut s = format!("M {} {} ", fmt_num(outline.points[0].x), fmt_num(-outline.points[0].y));
    for p in &outline.points[1..] {
        s.push_str(&format!("L {} {} ", fmt_num(p.x), fmt_num(-p.y)));
    }
    s.push_str("Z ");
    s
}
