use crate::error::Result;
use crate::math::Point3;
use crate::mesh::MeshBuffers;

use super::{flatten, require_positive};

/// Corner triples of the 12 box triangles, two per face, outward wound.
///
/// Corner `i` sits at `(i & 1, i >> 1 & 1, i >> 2 & 1)` between the two
/// box corners. Faces come in the order `-X, +X, -Y, +Y, -Z, +Z`.
const BOX_TRIANGLES: [u32; 36] = [
    0, 4, 6, 0, 6, 2, // -X
    1, 3, 7, 1, 7, 5, // +X
    0, 1, 5, 0, 5, 4, // -Y
    2, 6, 7, 2, 7, 3, // +Y
    0, 2, 3, 0, 3, 1, // -Z
    4, 5, 7, 4, 7, 6, // +Z
];

/// Creates an indexed axis-aligned box mesh from two corner points.
pub struct MakeBoxMesh {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBoxMesh {
    /// Creates a new `MakeBoxMesh` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the box is flat along any axis.
    pub fn execute(&self) -> Result<MeshBuffers> {
        let lo = self.min_corner.inf(&self.max_corner);
        let hi = self.min_corner.sup(&self.max_corner);
        require_positive("box width", hi.x - lo.x)?;
        require_positive("box depth", hi.y - lo.y)?;
        require_positive("box height", hi.z - lo.z)?;

        let corners: Vec<Point3> = (0..8)
            .map(|i| {
                Point3::new(
                    if i & 1 == 0 { lo.x } else { hi.x },
                    if i & 2 == 0 { lo.y } else { hi.y },
                    if i & 4 == 0 { lo.z } else { hi.z },
                )
            })
            .collect();

        Ok(MeshBuffers::new(flatten(&corners), Some(BOX_TRIANGLES.to_vec())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::mesh::ExtractTriangles;

    #[test]
    fn box_has_outward_faces_in_order() {
        let mesh = MakeBoxMesh::new(Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 2.0, 4.0))
            .execute()
            .unwrap();
        let tris = ExtractTriangles::new(&mesh).execute().unwrap();
        assert_eq!(tris.len(), 12);

        let expected = [
            -Vector3::x(),
            Vector3::x(),
            -Vector3::y(),
            Vector3::y(),
            -Vector3::z(),
            Vector3::z(),
        ];
        for (i, t) in tris.iter().enumerate() {
            assert!((t.normal.unwrap() - expected[i / 2]).norm() < 1e-12, "triangle {i}");
        }
        let area: f64 = tris.iter().map(|t| t.area).sum();
        // 2 * (2*1 + 2*3 + 1*3)
        assert!((area - 22.0).abs() < 1e-12);
    }

    #[test]
    fn swapped_corners_are_normalized() {
        let mesh = MakeBoxMesh::new(Point3::new(1.0, 1.0, 1.0), Point3::origin())
            .execute()
            .unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.positions[..3], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn flat_box_fails() {
        let result = MakeBoxMesh::new(Point3::origin(), Point3::new(1.0, 1.0, 0.0)).execute();
        assert!(result.is_err());
    }
}
