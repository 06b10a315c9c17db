use std::collections::{HashMap, HashSet};

use crate::math::{GridKey, Point3};

use super::Segmentation;

/// An edge on the border between two face groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryEdge {
    /// First endpoint, as wound by the owning group's triangle.
    pub start: Point3,
    /// Second endpoint.
    pub end: Point3,
    /// Face number of the group on the other side.
    pub neighbor_group: usize,
}

type EdgeKey = (GridKey, GridKey);

fn edge_key(a: &Point3, b: &Point3, quantum: f64) -> EdgeKey {
    let ka = GridKey::quantize(a, quantum);
    let kb = GridKey::quantize(b, quantum);
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}

/// Collects the edges a group shares with triangles of other groups.
///
/// These are the candidate edges for a rounding operation between two
/// faces. Edges are matched by their quantized endpoints, so shared edges
/// are found even when the two triangles do not share vertex indices.
pub struct GroupBoundary<'a> {
    segmentation: &'a Segmentation,
    group: usize,
}

impl<'a> GroupBoundary<'a> {
    /// Creates a new `GroupBoundary` query for face number `group`.
    #[must_use]
    pub fn new(segmentation: &'a Segmentation, group: usize) -> Self {
        Self {
            segmentation,
            group,
        }
    }

    /// Executes the query. Unknown groups have no boundary.
    #[must_use]
    pub fn execute(&self) -> Vec<BoundaryEdge> {
        let seg = self.segmentation;
        let Some(group) = seg.group(self.group) else {
            return Vec::new();
        };
        let quantum = seg.vertex_tolerance();
        let triangles = seg.triangles();

        let mut edge_owners: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
        for tri in triangles.iter().filter(|t| !t.is_degenerate()) {
            for (a, b) in tri.edges() {
                edge_owners
                    .entry(edge_key(&a, &b, quantum))
                    .or_default()
                    .push(tri.index);
            }
        }

        let mut seen: HashSet<(EdgeKey, usize)> = HashSet::new();
        let mut edges = Vec::new();
        for &member in &group.members {
            let tri = &triangles[member];
            if tri.is_degenerate() {
                continue;
            }
            for (start, end) in tri.edges() {
                let key = edge_key(&start, &end, quantum);
                let Some(owners) = edge_owners.get(&key) else {
                    continue;
                };
                for &other in owners {
                    let Some(neighbor_group) = seg.group_of_triangle(other) else {
                        continue;
                    };
                    if neighbor_group != self.group && seen.insert((key, neighbor_group)) {
                        edges.push(BoundaryEdge {
                            start,
                            end,
                            neighbor_group,
                        });
                    }
                }
            }
        }
        edges
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::creation::{MakeBoxMesh, MakeCylinderMesh};
    use crate::math::{Point3, Vector3};
    use crate::segmentation::SegmentMesh;

    #[test]
    fn cube_face_has_four_outer_edges() {
        let mesh = MakeBoxMesh::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        let seg = SegmentMesh::new(&mesh).execute().unwrap();
        for g in 0..seg.len() {
            let edges = seg.boundary_edges(g);
            assert_eq!(edges.len(), 4, "group {g}");
            let mut neighbors: Vec<usize> = edges.iter().map(|e| e.neighbor_group).collect();
            neighbors.sort_unstable();
            neighbors.dedup();
            assert_eq!(neighbors.len(), 4);
            assert!(!neighbors.contains(&g));
            for e in &edges {
                assert!(((e.end - e.start).norm() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn cylinder_cap_borders_only_the_wall() {
        let mesh = MakeCylinderMesh::new(Point3::origin(), 1.0, Vector3::z(), 2.0, 16)
            .execute()
            .unwrap();
        let seg = SegmentMesh::new(&mesh).execute().unwrap();
        let wall = seg.groups().iter().position(|g| g.is_curved).unwrap();
        let cap = seg.groups().iter().position(|g| !g.is_curved).unwrap();

        let edges = seg.boundary_edges(cap);
        assert_eq!(edges.len(), 16);
        assert!(edges.iter().all(|e| e.neighbor_group == wall));
    }

    #[test]
    fn unknown_group_is_empty() {
        let mesh = MakeBoxMesh::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        let seg = SegmentMesh::new(&mesh).execute().unwrap();
        assert!(seg.boundary_edges(99).is_empty());
    }
}
