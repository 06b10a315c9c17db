use tracing::debug;

use crate::math::{angle_between_deg, cardinal_deviation_deg};
use crate::mesh::Triangle;

use super::{AdjacencyGraph, SegmentationParams};

/// Labels each triangle planar or curved from the normal angles to its
/// graph neighbors.
///
/// A triangle is curved when at least one neighbor bends away from it by an
/// angle strictly inside `(noise_angle_deg, sharp_edge_angle_deg)`. Triangles
/// whose neighbors are all coplanar never satisfy that. Degenerate triangles
/// are planar.
///
/// With `axis_aligned_flat_override` set, a triangle facing a cardinal axis
/// is forced planar when it lies on a flat panel: its coplanar patch (the
/// triangles reachable through neighbors within `noise_angle_deg`) must be
/// at least `flat_patch_area_ratio` times larger than every patch it bends
/// into. An axis-facing facet of a tessellated cylinder is no larger than
/// the facets beside it and stays curved.
pub struct ClassifyCurvature<'a> {
    graph: &'a AdjacencyGraph,
    params: SegmentationParams,
}

impl<'a> ClassifyCurvature<'a> {
    /// Creates a new `ClassifyCurvature` operation.
    #[must_use]
    pub fn new(graph: &'a AdjacencyGraph, params: SegmentationParams) -> Self {
        Self { graph, params }
    }

    /// Writes `is_curved` on every triangle and returns the curved count.
    pub fn execute(&self, triangles: &mut [Triangle]) -> usize {
        let patches = self.coplanar_patches(triangles);
        let labels: Vec<bool> = (0..triangles.len())
            .map(|i| self.is_curved(triangles, &patches, i))
            .collect();

        for (tri, curved) in triangles.iter_mut().zip(&labels) {
            tri.is_curved = *curved;
        }

        let curved = labels.iter().filter(|c| **c).count();
        debug!(curved, planar = labels.len() - curved, "classified curvature");
        curved
    }

    fn is_curved(&self, triangles: &[Triangle], patches: &Patches, index: usize) -> bool {
        let Some(normal) = triangles[index].normal else {
            return false;
        };

        let mut bent_patch_area: Option<f64> = None;
        for &n in self.graph.neighbors(index) {
            let Some(other) = triangles[n].normal else {
                continue;
            };
            let angle = angle_between_deg(&normal, &other);
            if angle > self.params.noise_angle_deg && angle < self.params.sharp_edge_angle_deg {
                let area = patches.area_of(n);
                bent_patch_area = Some(bent_patch_area.map_or(area, |a| a.max(area)));
            }
        }
        let Some(bent_patch_area) = bent_patch_area else {
            return false;
        };

        let on_flat_panel = self.params.axis_aligned_flat_override
            && cardinal_deviation_deg(&normal) <= self.params.axis_alignment_deg
            && patches.area_of(index) >= self.params.flat_patch_area_ratio * bent_patch_area;
        !on_flat_panel
    }

    /// Splits non-degenerate triangles into patches connected through
    /// neighbors within the noise angle.
    fn coplanar_patches(&self, triangles: &[Triangle]) -> Patches {
        let mut patch_of = vec![usize::MAX; triangles.len()];
        let mut areas = Vec::new();
        let mut stack = Vec::new();

        for seed in 0..triangles.len() {
            if patch_of[seed] != usize::MAX || triangles[seed].is_degenerate() {
                continue;
            }
            let patch = areas.len();
            let mut area = 0.0;
            patch_of[seed] = patch;
            stack.push(seed);
            while let Some(current) = stack.pop() {
                area += triangles[current].area;
                let Some(current_normal) = triangles[current].normal else {
                    continue;
                };
                for &next in self.graph.neighbors(current) {
                    if patch_of[next] != usize::MAX {
                        continue;
                    }
                    let coplanar = triangles[next].normal.is_some_and(|other| {
                        angle_between_deg(&current_normal, &other) <= self.params.noise_angle_deg
                    });
                    if coplanar {
                        patch_of[next] = patch;
                        stack.push(next);
                    }
                }
            }
            areas.push(area);
        }

        Patches { patch_of, areas }
    }
}

struct Patches {
    patch_of: Vec<usize>,
    areas: Vec<f64>,
}

impl Patches {
    fn area_of(&self, triangle: usize) -> f64 {
        self.patch_of
            .get(triangle)
            .and_then(|&p| self.areas.get(p))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::creation::{MakeBoxMesh, MakeCylinderMesh};
    use crate::math::{Point3, Vector3};
    use crate::mesh::{ExtractTriangles, MeshBuffers};
    use crate::segmentation::BuildAdjacency;

    fn classify(mesh: &MeshBuffers, params: SegmentationParams) -> Vec<Triangle> {
        let mut tris = ExtractTriangles::new(mesh).execute().unwrap();
        let graph = BuildAdjacency::new(&tris, 1e-4).execute();
        ClassifyCurvature::new(&graph, params).execute(&mut tris);
        tris
    }

    #[test]
    fn cube_is_all_planar() {
        let mesh = MakeBoxMesh::new(Point3::origin(), Point3::new(2.0, 1.0, 3.0))
            .execute()
            .unwrap();
        let tris = classify(&mesh, SegmentationParams::default());
        assert!(tris.iter().all(|t| !t.is_curved));
    }

    #[test]
    fn cylinder_wall_is_curved_and_caps_planar() {
        let mesh = MakeCylinderMesh::new(Point3::origin(), 1.0, Vector3::z(), 2.0, 32)
            .execute()
            .unwrap();
        let tris = classify(&mesh, SegmentationParams::default());
        for t in &tris {
            let n = t.normal.unwrap();
            let is_cap = n.z.abs() > 0.99;
            assert_eq!(t.is_curved, !is_cap, "triangle {} misclassified", t.index);
        }
    }

    #[test]
    fn cardinal_wall_facets_stay_curved() {
        // 18 segments put wall facets facing +Y and -Y exactly.
        let mesh = MakeCylinderMesh::new(Point3::origin(), 1.0, Vector3::z(), 2.0, 18)
            .execute()
            .unwrap();
        let tris = classify(&mesh, SegmentationParams::default());
        assert!(tris[..36].iter().all(|t| t.is_curved));
        assert!(tris[36..].iter().all(|t| !t.is_curved));
    }

    #[test]
    fn panel_beside_shallow_fold_is_pinned_flat() {
        // A 2x2 panel facing +Z, with one triangle folded up by 20 degrees
        // along its y = 0 edge.
        let lift = 20.0_f64.to_radians().tan();
        let mesh = MeshBuffers::new(
            vec![
                0.0, 0.0, 0.0, 2.0, -2.0, 0.0, 2.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, -2.0, 0.0, 2.0, -2.0, 0.0, //
                0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, lift,
            ],
            None,
        );
        let strict = SegmentationParams {
            axis_aligned_flat_override: false,
            ..SegmentationParams::default()
        };
        assert!(classify(&mesh, strict).iter().all(|t| t.is_curved));

        let tris = classify(&mesh, SegmentationParams::default());
        assert!(!tris[0].is_curved);
        assert!(!tris[1].is_curved);
        assert!(tris[2].is_curved);
    }

    #[test]
    fn small_cardinal_patch_is_not_a_panel() {
        let lift = 20.0_f64.to_radians().tan();
        let mesh = MeshBuffers::new(
            vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, 1.0, lift, 1.0, 0.0, 0.0,
            ],
            None,
        );
        let tris = classify(&mesh, SegmentationParams::default());
        assert!(tris.iter().all(|t| t.is_curved));
    }
}
