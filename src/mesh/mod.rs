//! Mesh data model: vertex/texcoord tables and face records.
//!
//! Faces hold raw 1-based index pairs exactly as parsed; resolution into
//! concrete triangles happens once per face, and an out-of-range index is
//! fatal because it means the tables are internally inconsistent.

pub mod mtl;
pub mod obj;

pub use mtl::TextureGrid;

use crate::core::error::{Error, Result};
use crate::math::{Point3, Uv};

/// One `vertex/texcoord` pair of a face record, 1-based as in the source.
#[derive(Clone, Copy, Debug)]
pub struct FaceCorner {
    pub vertex: i64,
    pub texcoord: i64,
}

/// One face record: three or more corners plus the material selected when
/// the face was declared.
#[derive(Clone, Debug)]
pub struct Face {
    pub corners: Vec<FaceCorner>,
    pub material: String,
    /// Source line, for diagnostics.
    pub line: usize,
}

/// A face resolved into concrete geometry; transient, scoped to one
/// sampling task.
#[derive(Clone, Debug)]
pub struct Triangle {
    pub positions: [Point3; 3],
    pub uvs: [Uv; 3],
}

/// Parsed mesh: shared vertex/texcoord tables plus face records.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Point3>,
    pub texcoords: Vec<Uv>,
    pub faces: Vec<Face>,
    /// Material library referenced by `mtllib`, if any.
    pub material_lib: Option<String>,
}

impl Mesh {
    fn vertex(&self, index: i64) -> Result<&Point3> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i >= 1)
            .and_then(|i| self.vertices.get(i - 1))
            .ok_or(Error::IndexOutOfRange {
                table: "vertex",
                index,
                len: self.vertices.len(),
            })
    }

    fn texcoord(&self, index: i64) -> Result<&Uv> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i >= 1)
            .and_then(|i| self.texcoords.get(i - 1))
            .ok_or(Error::IndexOutOfRange {
                table: "texcoord",
                index,
                len: self.texcoords.len(),
            })
    }

    /// Resolve a face into triangles by fan decomposition around its first
    /// corner. Quads and larger polygons yield `corners - 2` triangles.
    pub fn resolve_triangles(&self, face: &Face) -> Result<Vec<Triangle>> {
        let resolve = |corner: &FaceCorner| -> Result<(Point3, Uv)> {
            Ok((
                self.vertex(corner.vertex)?.clone(),
                self.texcoord(corner.texcoord)?.clone(),
            ))
        };

        let mut triangles = Vec::with_capacity(face.corners.len().saturating_sub(2));
        for i in 1..face.corners.len().saturating_sub(1) {
            let (p0, t0) = resolve(&face.corners[0])?;
            let (p1, t1) = resolve(&face.corners[i])?;
            let (p2, t2) = resolve(&face.corners[i + 1])?;
            triangles.push(Triangle {
                positions: [p0, p1, p2],
                uvs: [t0, t1, t2],
            });
        }
        Ok(triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fraction;

    fn mesh_with_quad() -> Mesh {
        let vertices = vec![
            [Fraction::zero(), Fraction::zero(), Fraction::zero()],
            [Fraction::one(), Fraction::zero(), Fraction::zero()],
            [Fraction::one(), Fraction::one(), Fraction::zero()],
            [Fraction::zero(), Fraction::one(), Fraction::zero()],
        ];
        let texcoords = vec![
            [Fraction::zero(), Fraction::zero()],
            [Fraction::one(), Fraction::zero()],
            [Fraction::one(), Fraction::one()],
            [Fraction::zero(), Fraction::one()],
        ];
        let corners = (1..=4)
            .map(|i| FaceCorner {
                vertex: i,
                texcoord: i,
            })
            .collect();
        Mesh {
            vertices,
            texcoords,
            faces: vec![Face {
                corners,
                material: "mat".to_string(),
                line: 1,
            }],
            material_lib: None,
        }
    }

    #[test]
    fn test_quad_fans_into_two_triangles() {
        let mesh = mesh_with_quad();
        let triangles = mesh.resolve_triangles(&mesh.faces[0]).unwrap();
        assert_eq!(triangles.len(), 2);
        // Both triangles share the fan pivot.
        assert_eq!(triangles[0].positions[0], triangles[1].positions[0]);
    }

    #[test]
    fn test_out_of_range_index_is_fatal() {
        let mesh = mesh_with_quad();
        let face = Face {
            corners: vec![
                FaceCorner { vertex: 1, texcoord: 1 },
                FaceCorner { vertex: 2, texcoord: 2 },
                FaceCorner { vertex: 99, texcoord: 3 },
            ],
            material: "mat".to_string(),
            line: 9,
        };
        assert!(matches!(
            mesh.resolve_triangles(&face),
            Err(Error::IndexOutOfRange { table: "vertex", index: 99, .. })
        ));
    }

    #[test]
    fn test_zero_index_is_fatal() {
        let mesh = mesh_with_quad();
        let face = Face {
            corners: vec![
                FaceCorner { vertex: 0, texcoord: 1 },
                FaceCorner { vertex: 2, texcoord: 2 },
                FaceCorner { vertex: 3, texcoord: 3 },
            ],
            material: "mat".to_string(),
            line: 3,
        };
        assert!(mesh.resolve_triangles(&face).is_err());
    }
}
