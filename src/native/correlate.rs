use tracing::debug;

use crate::math::GridKey;
use crate::mesh::Triangle;

use super::{NativeFaceCache, NativeFaceCacheEntry};

/// Native face assigned to each triangle by [`CorrelateNativeFaces`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    /// Native face index per triangle, `None` for a correlation miss.
    pub assignments: Vec<Option<usize>>,
    /// Number of triangles with an assignment.
    pub matched: usize,
}

impl Correlation {
    /// Share of triangles that correlated, `0.0` for an empty mesh.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn matched_fraction(&self) -> f64 {
        if self.assignments.is_empty() {
            0.0
        } else {
            self.matched as f64 / self.assignments.len() as f64
        }
    }
}

/// Matches mesh triangles to the BREP faces in a [`NativeFaceCache`].
///
/// Among faces whose bounds contain the triangle centroid, the one sharing
/// the most quantized vertex keys wins if it shares at least
/// `min_vertex_matches`. Otherwise the face with the nearest bounds wins if
/// it lies within `fallback_max_distance`. Ties go to the lower face index.
pub struct CorrelateNativeFaces<'a> {
    cache: &'a NativeFaceCache,
}

impl<'a> CorrelateNativeFaces<'a> {
    /// Creates a new `CorrelateNativeFaces` operation.
    #[must_use]
    pub fn new(cache: &'a NativeFaceCache) -> Self {
        Self { cache }
    }

    /// Correlates every triangle.
    #[must_use]
    pub fn execute(&self, triangles: &[Triangle]) -> Correlation {
        let assignments: Vec<Option<usize>> =
            triangles.iter().map(|t| self.correlate(t)).collect();
        let matched = assignments.iter().filter(|a| a.is_some()).count();

        debug!(
            matched,
            total = triangles.len(),
            faces = self.cache.entries().len(),
            "correlated triangles with native faces"
        );
        Correlation {
            assignments,
            matched,
        }
    }

    fn correlate(&self, triangle: &Triangle) -> Option<usize> {
        let params = self.cache.params();
        let keys = triangle
            .vertices
            .map(|v| GridKey::quantize(&v, params.quantum));

        let mut best: Option<(usize, &NativeFaceCacheEntry)> = None;
        for entry in self.cache.entries() {
            if !entry.bounds.contains(&triangle.centroid) {
                continue;
            }
            let shared = keys.iter().filter(|k| entry.vertex_keys.contains(*k)).count();
            if best.is_none_or(|(count, _)| shared > count) {
                best = Some((shared, entry));
            }
        }
        if let Some((count, entry)) = best {
            if count >= params.min_vertex_matches {
                return Some(entry.face_index);
            }
        }

        let mut nearest: Option<(f64, usize)> = None;
        for entry in self.cache.entries() {
            let distance = entry.bounds.distance_to(&triangle.centroid);
            if nearest.is_none_or(|(d, _)| distance < d) {
                nearest = Some((distance, entry.face_index));
            }
        }
        nearest
            .filter(|(d, _)| *d <= params.fallback_max_distance)
            .map(|(_, face)| face)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::creation::MakeBoxMesh;
    use crate::math::Point3;
    use crate::mesh::{ExtractTriangles, MeshBuffers, MeshId};
    use crate::native::testing::SoupFace;
    use crate::native::{CorrelationParams, SurfaceKind};

    fn cube() -> (MeshBuffers, Vec<Triangle>) {
        let mesh = MakeBoxMesh::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        let tris = ExtractTriangles::new(&mesh).execute().unwrap();
        (mesh, tris)
    }

    fn cube_shape(tris: &[Triangle]) -> Vec<SoupFace> {
        tris.chunks(2)
            .map(|pair| SoupFace::from_triangles(SurfaceKind::Planar, &[&pair[0], &pair[1]]))
            .collect()
    }

    #[test]
    fn every_cube_triangle_finds_its_face() {
        let (mesh, tris) = cube();
        let cache = NativeFaceCache::build(mesh.id, &cube_shape(&tris), CorrelationParams::default());
        let correlation = CorrelateNativeFaces::new(&cache).execute(&tris);
        assert_eq!(correlation.matched, 12);
        for (i, face) in correlation.assignments.iter().enumerate() {
            assert_eq!(*face, Some(i / 2));
        }
        assert!((correlation.matched_fraction() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distant_triangle_is_a_miss() {
        let (_, tris) = cube();
        let cache = NativeFaceCache::build(MeshId(0), &cube_shape(&tris), CorrelationParams::default());
        let far = ExtractTriangles::new(&MeshBuffers::new(
            vec![10.0, 10.0, 10.0, 11.0, 10.0, 10.0, 10.0, 11.0, 10.0],
            None,
        ))
        .execute()
        .unwrap();
        let correlation = CorrelateNativeFaces::new(&cache).execute(&far);
        assert_eq!(correlation.assignments, vec![None]);
        assert!(correlation.matched_fraction().abs() < f64::EPSILON);
    }

    #[test]
    fn nearest_box_fallback_accepts_close_triangles() {
        let (_, tris) = cube();
        let cache = NativeFaceCache::build(MeshId(0), &cube_shape(&tris), CorrelationParams::default());
        // Just above the +Z face, no shared vertices, outside every box.
        let z = 1.0 + 0.006;
        let hover = ExtractTriangles::new(&MeshBuffers::new(
            vec![0.2, 0.2, z, 0.4, 0.2, z, 0.2, 0.4, z],
            None,
        ))
        .execute()
        .unwrap();
        let correlation = CorrelateNativeFaces::new(&cache).execute(&hover);
        assert_eq!(correlation.assignments, vec![Some(5)]);
    }

    #[test]
    fn scaled_params_follow_model_units() {
        let mesh = MakeBoxMesh::new(Point3::origin(), Point3::new(1000.0, 1000.0, 1000.0))
            .execute()
            .unwrap();
        let tris = ExtractTriangles::new(&mesh).execute().unwrap();
        let shape = cube_shape(&tris);
        let z = 1006.0;
        let hover = ExtractTriangles::new(&MeshBuffers::new(
            vec![200.0, 200.0, z, 400.0, 200.0, z, 200.0, 400.0, z],
            None,
        ))
        .execute()
        .unwrap();

        let unscaled = NativeFaceCache::build(mesh.id, &shape, CorrelationParams::default());
        assert_eq!(CorrelateNativeFaces::new(&unscaled).execute(&hover).assignments, vec![None]);

        let params = CorrelationParams::scaled_to(1000.0 * 3.0_f64.sqrt());
        assert!(params.validate().is_ok());
        let scaled = NativeFaceCache::build(mesh.id, &shape, params);
        assert_eq!(CorrelateNativeFaces::new(&scaled).execute(&hover).assignments, vec![Some(5)]);
        assert_eq!(CorrelateNativeFaces::new(&scaled).execute(&tris).matched, 12);
    }

    #[test]
    fn empty_cache_matches_nothing() {
        let (_, tris) = cube();
        let shape: Vec<SoupFace> = Vec::new();
        let cache = NativeFaceCache::build(MeshId(0), &shape, CorrelationParams::default());
        let correlation = CorrelateNativeFaces::new(&cache).execute(&tris);
        assert_eq!(correlation.matched, 0);
    }
}
