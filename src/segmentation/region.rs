use tracing::debug;

use crate::math::angle_between_deg;
use crate::mesh::Triangle;

use super::{AdjacencyGraph, FaceGroup, SegmentationParams};

/// Flood-fills the adjacency graph into [`FaceGroup`]s.
///
/// Seeds are taken in ascending triangle order. A neighbor joins the current
/// region when its curvature class matches the seed's and its normal is
/// within the class merge angle of the triangle that reached it. Degenerate
/// triangles join the group of their lowest-indexed grouped neighbor, or
/// become a singleton group.
///
/// Groups come out ordered by their lowest member index, members ascending.
pub struct GrowRegions<'a> {
    graph: &'a AdjacencyGraph,
    params: SegmentationParams,
    eligible: Option<&'a [bool]>,
}

impl<'a> GrowRegions<'a> {
    /// Creates a new `GrowRegions` operation over every triangle.
    #[must_use]
    pub fn new(graph: &'a AdjacencyGraph, params: SegmentationParams) -> Self {
        Self {
            graph,
            params,
            eligible: None,
        }
    }

    /// Restricts the fill to triangles whose mask entry is `true`.
    ///
    /// Ineligible triangles are neither seeded nor absorbed.
    #[must_use]
    pub fn restricted_to(mut self, eligible: &'a [bool]) -> Self {
        self.eligible = Some(eligible);
        self
    }

    /// Executes the fill.
    #[must_use]
    pub fn execute(&self, triangles: &[Triangle]) -> Vec<FaceGroup> {
        let n = triangles.len();
        let eligible = |i: usize| {
            self.eligible
                .is_none_or(|mask| mask.get(i).copied().unwrap_or(false))
        };

        let mut group_of: Vec<Option<usize>> = vec![None; n];
        let mut regions: Vec<(bool, Vec<usize>)> = Vec::new();
        let mut stack = Vec::new();

        for seed in 0..n {
            if group_of[seed].is_some() || !eligible(seed) || triangles[seed].is_degenerate() {
                continue;
            }
            let region = regions.len();
            let curved = triangles[seed].is_curved;
            let threshold = if curved {
                self.params.curved_merge_angle_deg
            } else {
                self.params.planar_merge_angle_deg
            };

            let mut members = vec![seed];
            group_of[seed] = Some(region);
            stack.push(seed);

            while let Some(current) = stack.pop() {
                let Some(current_normal) = triangles[current].normal else {
                    continue;
                };
                for &next in self.graph.neighbors(current) {
                    if group_of[next].is_some() || !eligible(next) {
                        continue;
                    }
                    let candidate = &triangles[next];
                    let Some(next_normal) = candidate.normal else {
                        continue;
                    };
                    if candidate.is_curved != curved {
                        continue;
                    }
                    if angle_between_deg(&current_normal, &next_normal) < threshold {
                        group_of[next] = Some(region);
                        members.push(next);
                        stack.push(next);
                    }
                }
            }
            regions.push((curved, members));
        }

        for index in 0..n {
            if group_of[index].is_some() || !eligible(index) {
                continue;
            }
            let host = self
                .graph
                .neighbors(index)
                .iter()
                .filter(|&&nb| !triangles[nb].is_degenerate())
                .find_map(|&nb| group_of[nb]);
            if let Some(region) = host {
                regions[region].1.push(index);
                group_of[index] = Some(region);
            } else {
                group_of[index] = Some(regions.len());
                regions.push((false, vec![index]));
            }
        }

        let mut groups: Vec<FaceGroup> = regions
            .into_iter()
            .map(|(curved, members)| FaceGroup::from_members(triangles, members, curved, None))
            .collect();
        groups.sort_by_key(|g| g.members.first().copied().unwrap_or(usize::MAX));

        debug!(groups = groups.len(), "grew regions");
        groups
    }
}
