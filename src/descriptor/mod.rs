//! Regeneration-resilient face fingerprints.
//!
//! A [`FaceDescriptor`] captures a face group's orientation, its position
//! relative to the mesh bounds and its share of the total area. Because none
//! of these depend on triangle indices, a descriptor stored next to a role
//! assignment can be resolved against a freshly remeshed solid after a
//! dimension edit.

mod reidentify;

pub use reidentify::{Reidentified, Reidentify};

use serde::{Deserialize, Serialize};

use crate::math::{angle_between_deg, Aabb, Vector3, TOLERANCE};
use crate::segmentation::FaceGroup;

/// Candidates whose normal deviates more than this are never matched, in degrees.
pub const MATCH_MAX_NORMAL_ANGLE_DEG: f64 = 5.0;

/// Score weight per degree of normal deviation.
pub const NORMAL_ANGLE_WEIGHT: f64 = 2.0;

/// Score weight per unit of normalized center distance.
pub const CENTER_DISTANCE_WEIGHT: f64 = 10.0;

/// Score weight of the relative area difference.
pub const AREA_DIFFERENCE_WEIGHT: f64 = 5.0;

/// Normalized fingerprint of a face group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceDescriptor {
    /// Unit group normal.
    pub normal: [f64; 3],
    /// Group centroid mapped into the mesh bounds' unit cube.
    pub normalized_center: [f64; 3],
    /// Group area as a fraction of the total mesh area.
    pub area: f64,
}

impl FaceDescriptor {
    /// Builds the descriptor of `group` in a mesh with the given bounds and
    /// total area.
    #[must_use]
    pub fn from_group(group: &FaceGroup, bounds: &Aabb, total_area: f64) -> Self {
        let area = if total_area > 0.0 {
            group.total_area / total_area
        } else {
            0.0
        };
        Self {
            normal: group.normal.into(),
            normalized_center: bounds.normalize(&group.centroid),
            area,
        }
    }

    /// Match score against `other`, or `None` if the normals differ by more
    /// than [`MATCH_MAX_NORMAL_ANGLE_DEG`]. Lower is better.
    ///
    /// A zero normal, as left by a group of degenerate triangles, never
    /// matches.
    #[must_use]
    pub fn score(&self, other: &Self) -> Option<f64> {
        let (normal, other_normal) = (Vector3::from(self.normal), Vector3::from(other.normal));
        if normal.norm() <= TOLERANCE || other_normal.norm() <= TOLERANCE {
            return None;
        }
        let angle = angle_between_deg(&normal, &other_normal);
        if angle > MATCH_MAX_NORMAL_ANGLE_DEG {
            return None;
        }
        let center_distance =
            (Vector3::from(self.normalized_center) - Vector3::from(other.normalized_center)).norm();
        let larger = self.area.max(other.area);
        let area_difference = if larger > 0.0 {
            (self.area - other.area).abs() / larger
        } else {
            0.0
        };
        Some(
            NORMAL_ANGLE_WEIGHT * angle
                + CENTER_DISTANCE_WEIGHT * center_distance
                + AREA_DIFFERENCE_WEIGHT * area_difference,
        )
    }
}

/// Best candidate found by [`MatchDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorMatch {
    /// Face number of the matched group.
    pub group_index: usize,
    /// Match score, lower is better.
    pub score: f64,
}

/// Finds the face group that best matches a stored descriptor.
pub struct MatchDescriptor<'a> {
    target: &'a FaceDescriptor,
}

impl<'a> MatchDescriptor<'a> {
    /// Creates a new `MatchDescriptor` query.
    #[must_use]
    pub fn new(target: &'a FaceDescriptor) -> Self {
        Self { target }
    }

    /// Scores every group and returns the lowest-scoring one. Ties go to the
    /// lower face number; `None` if no group passes the normal cutoff.
    #[must_use]
    pub fn execute(
        &self,
        groups: &[FaceGroup],
        bounds: &Aabb,
        total_area: f64,
    ) -> Option<DescriptorMatch> {
        let mut best: Option<DescriptorMatch> = None;
        for (group_index, group) in groups.iter().enumerate() {
            let candidate = FaceDescriptor::from_group(group, bounds, total_area);
            let Some(score) = self.target.score(&candidate) else {
                continue;
            };
            if best.is_none_or(|b| score < b.score) {
                best = Some(DescriptorMatch { group_index, score });
            }
        }
        best
    }
}
