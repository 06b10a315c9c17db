use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::Triangle;

/// A set of triangles standing for one real face of the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGroup {
    /// Unweighted mean of the member normals, renormalized. Zero when every
    /// member is degenerate.
    pub normal: Vector3,
    /// Mean of the member centroids.
    pub centroid: Point3,
    /// Sum of member areas.
    pub total_area: f64,
    /// Member triangle indices, ascending.
    pub members: Vec<usize>,
    /// Whether the group represents a curved surface.
    pub is_curved: bool,
    /// BREP face this group was correlated with, if any.
    pub native_face: Option<usize>,
}

impl FaceGroup {
    /// Aggregates `members` of `triangles` into a group.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_members(
        triangles: &[Triangle],
        mut members: Vec<usize>,
        is_curved: bool,
        native_face: Option<usize>,
    ) -> Self {
        members.sort_unstable();

        let mut normal_sum = Vector3::zeros();
        let mut centroid_sum = Vector3::zeros();
        let mut total_area = 0.0;
        for &m in &members {
            let tri = &triangles[m];
            if let Some(n) = tri.normal {
                normal_sum += n;
            }
            centroid_sum += tri.centroid.coords;
            total_area += tri.area;
        }

        let len = normal_sum.norm();
        let normal = if len > TOLERANCE {
            normal_sum / len
        } else {
            Vector3::zeros()
        };
        let centroid = if members.is_empty() {
            Point3::origin()
        } else {
            Point3::from(centroid_sum / members.len() as f64)
        };

        Self {
            normal,
            centroid,
            total_area,
            members,
            is_curved,
            native_face,
        }
    }

    /// Number of member triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `true` if triangle `index` belongs to this group.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.members.binary_search(&index).is_ok()
    }
}
