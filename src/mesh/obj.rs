//! Line-oriented OBJ parsing.
//!
//! Recognized records: `mtllib`, `v`, `vt`, `usemtl`, `f`. Anything else is
//! skipped with a diagnostic. Malformed records are recoverable: the line is
//! skipped, the rest of the mesh still parses.

use log::{debug, warn};

use super::{Face, FaceCorner, Mesh};
use crate::math::Fraction;

/// Parse an OBJ document. Vertex positions are scaled by `scale` as they are
/// read, so downstream stages never see unscaled coordinates.
pub fn parse(text: &str, scale: &Fraction) -> Mesh {
    let mut mesh = Mesh::default();
    let mut current_material = String::new();

    for (ln, line) in text.lines().enumerate() {
        let Some((keyword, data)) = line.trim_end().split_once(' ') else {
            continue;
        };

        match keyword {
            "mtllib" => {
                debug!("L{ln}: material library {data}");
                mesh.material_lib = Some(data.trim().to_string());
            }
            "v" => match parse_floats::<3>(data) {
                Some([x, y, z]) => mesh.vertices.push([
                    Fraction::from_f64(x) * scale,
                    Fraction::from_f64(y) * scale,
                    Fraction::from_f64(z) * scale,
                ]),
                None => warn!("skip L{ln}: malformed vertex: {line}"),
            },
            "vt" => match parse_floats::<2>(data) {
                Some([u, v]) => mesh
                    .texcoords
                    .push([Fraction::from_f64(u), Fraction::from_f64(v)]),
                None => warn!("skip L{ln}: malformed texcoord: {line}"),
            },
            "usemtl" => {
                debug!("L{ln}: select material {data}");
                current_material = data.trim().to_string();
            }
            "f" => match parse_face(data) {
                Some(corners) if corners.len() >= 3 => mesh.faces.push(Face {
                    corners,
                    material: current_material.clone(),
                    line: ln,
                }),
                _ => warn!("skip L{ln}: malformed face: {line}"),
            },
            _ => debug!("skip L{ln}: {line}"),
        }
    }

    mesh
}

fn parse_floats<const N: usize>(data: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut fields = data.split_whitespace();
    for slot in &mut out {
        *slot = fields.next()?.parse().ok()?;
    }
    Some(out)
}

/// Parse `v/vt` corner pairs. Corners without a texcoord component make the
/// whole face malformed; the sampler cannot texture it.
fn parse_face(data: &str) -> Option<Vec<FaceCorner>> {
    data.split_whitespace()
        .map(|corner| {
            let (v, vt) = corner.split_once('/')?;
            let vt = vt.split('/').next()?;
            Some(FaceCorner {
                vertex: v.parse().ok()?,
                texcoord: vt.parse().ok()?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
mtllib model.mtl
o cube
v 0.0 0.0 0.0
v 10.0 0.0 0.0
v 5.0 8.66 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.5 1.0
usemtl skin
f 1/1 2/2 3/3
f 1/1 2/2
# comment line
";

    #[test]
    fn test_parses_recognized_records() {
        let mesh = parse(SAMPLE, &Fraction::one());
        assert_eq!(mesh.material_lib.as_deref(), Some("model.mtl"));
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.texcoords.len(), 3);
        // The two-corner face is dropped, the unknown records are skipped.
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.faces[0].material, "skin");
    }

    #[test]
    fn test_vertices_are_scaled() {
        let mesh = parse(SAMPLE, &Fraction::new(2, 1));
        assert_eq!(mesh.vertices[1][0], Fraction::from_int(20));
    }

    #[test]
    fn test_face_with_triple_slash_indices() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1/1 2/2/1 3/3/1\n", &Fraction::one());
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.faces[0].corners[2].texcoord, 3);
    }

    #[test]
    fn test_corner_without_texcoord_is_skipped() {
        let mesh = parse("f 1 2 3\n", &Fraction::one());
        assert!(mesh.faces.is_empty());
    }
}
