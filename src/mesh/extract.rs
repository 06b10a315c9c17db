use tracing::debug;

use crate::error::{MeshError, Result};
use crate::math::Point3;

use super::{MeshBuffers, Triangle};

/// Triangles whose corner angle sine falls below this are degenerate.
pub const DEGENERATE_SINE_EPSILON: f64 = 1e-12;

/// Decodes raw mesh buffers into [`Triangle`] records.
///
/// Missing position data yields an empty list. Degenerate triangles are kept
/// with `normal: None` so triangle indices stay aligned with the source
/// buffers.
pub struct ExtractTriangles<'a> {
    mesh: &'a MeshBuffers,
}

impl<'a> ExtractTriangles<'a> {
    /// Creates a new `ExtractTriangles` operation.
    #[must_use]
    pub fn new(mesh: &'a MeshBuffers) -> Self {
        Self { mesh }
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// Returns an error if the position or index buffer length is not a
    /// multiple of 3, or an index refers past the last vertex.
    pub fn execute(&self) -> Result<Vec<Triangle>> {
        let positions = &self.mesh.positions;
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        if positions.len() % 3 != 0 {
            return Err(MeshError::PositionLength(positions.len()).into());
        }

        let points: Vec<Point3> = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();

        let corners: Vec<[usize; 3]> = match &self.mesh.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(MeshError::IndexLength(indices.len()).into());
                }
                let mut corners = Vec::with_capacity(indices.len() / 3);
                for tri in indices.chunks_exact(3) {
                    let mut slot = [0usize; 3];
                    for (dst, &idx) in slot.iter_mut().zip(tri) {
                        if idx as usize >= points.len() {
                            return Err(MeshError::IndexOutOfRange {
                                index: idx,
                                vertex_count: points.len(),
                            }
                            .into());
                        }
                        *dst = idx as usize;
                    }
                    corners.push(slot);
                }
                corners
            }
            None => (0..points.len() / 3)
                .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
                .collect(),
        };

        let triangles: Vec<Triangle> = corners
            .iter()
            .enumerate()
            .map(|(index, c)| build_triangle(index, [points[c[0]], points[c[1]], points[c[2]]]))
            .collect();

        debug!(
            triangles = triangles.len(),
            degenerate = triangles.iter().filter(|t| t.is_degenerate()).count(),
            "extracted triangles"
        );
        Ok(triangles)
    }
}

fn build_triangle(index: usize, vertices: [Point3; 3]) -> Triangle {
    let [v0, v1, v2] = vertices;
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let cross = e1.cross(&e2);
    let cross_len = cross.norm();

    let normal = if cross_len > DEGENERATE_SINE_EPSILON * e1.norm() * e2.norm() {
        Some(cross / cross_len)
    } else {
        None
    };
    let area = if normal.is_some() { cross_len * 0.5 } else { 0.0 };
    let centroid = Point3::from((v0.coords + v1.coords + v2.coords) / 3.0);

    Triangle {
        index,
        normal,
        centroid,
        vertices,
        area,
        is_curved: false,
        native_face: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MeshFacetError;
    use crate::math::Vector3;
    use approx::assert_relative_eq;

    fn extract(positions: Vec<f64>, indices: Option<Vec<u32>>) -> Result<Vec<Triangle>> {
        ExtractTriangles::new(&MeshBuffers::new(positions, indices)).execute()
    }

    #[test]
    fn sequential_triangle() {
        let tris = extract(vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0], None).unwrap();
        assert_eq!(tris.len(), 1);
        let t = &tris[0];
        assert_relative_eq!(t.area, 2.0);
        assert!((t.normal.unwrap() - Vector3::z()).norm() < 1e-12);
        assert!((t.centroid - Point3::new(2.0 / 3.0, 2.0 / 3.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn indexed_quad() {
        let positions = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ];
        let tris = extract(positions, Some(vec![0, 1, 2, 0, 2, 3])).unwrap();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[1].index, 1);
        assert_relative_eq!(tris.iter().map(|t| t.area).sum::<f64>(), 1.0);
    }

    #[test]
    fn empty_positions_are_not_an_error() {
        assert!(extract(vec![], None).unwrap().is_empty());
        assert!(extract(vec![], Some(vec![0, 1, 2])).unwrap().is_empty());
    }

    #[test]
    fn degenerate_triangle_is_flagged() {
        let tris = extract(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0], None).unwrap();
        assert_eq!(tris.len(), 1);
        assert!(tris[0].is_degenerate());
        assert!(tris[0].area.abs() < f64::EPSILON);
    }

    #[test]
    fn trailing_vertices_are_ignored() {
        let mut positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        positions.extend([5.0, 5.0, 5.0]);
        assert_eq!(extract(positions, None).unwrap().len(), 1);
    }

    #[test]
    fn index_out_of_range() {
        let err = extract(vec![0.0; 9], Some(vec![0, 1, 3])).unwrap_err();
        assert!(matches!(
            err,
            MeshFacetError::Mesh(MeshError::IndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn ragged_buffers() {
        assert!(extract(vec![0.0; 8], None).is_err());
        assert!(extract(vec![0.0; 9], Some(vec![0, 1])).is_err());
    }
}
