use tracing::debug;

use crate::math::VertexGrid;
use crate::mesh::Triangle;

/// Undirected triangle graph: two triangles are neighbors when any of their
/// corners coincide within tolerance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyGraph {
    neighbors: Vec<Vec<usize>>,
}

impl AdjacencyGraph {
    /// Sorted, deduplicated neighbors of triangle `index`.
    #[must_use]
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map_or(&[], Vec::as_slice)
    }

    /// Number of triangles in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns `true` if the graph has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Returns `true` if `a` and `b` are neighbors.
    #[must_use]
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }
}

/// Builds the vertex-sharing [`AdjacencyGraph`] with a spatial hash.
///
/// Every corner goes into a [`VertexGrid`] whose cells are one tolerance
/// wide, so each corner only probes its 27 surrounding cells instead of
/// every other triangle.
pub struct BuildAdjacency<'a> {
    triangles: &'a [Triangle],
    tolerance: f64,
}

impl<'a> BuildAdjacency<'a> {
    /// Creates a new `BuildAdjacency` operation with an absolute tolerance.
    #[must_use]
    pub fn new(triangles: &'a [Triangle], tolerance: f64) -> Self {
        Self {
            triangles,
            tolerance,
        }
    }

    /// Executes the build.
    #[must_use]
    pub fn execute(&self) -> AdjacencyGraph {
        let mut grid = VertexGrid::new(self.tolerance);
        for (slot, tri) in self.triangles.iter().enumerate() {
            for v in &tri.vertices {
                grid.insert(*v, slot);
            }
        }

        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); self.triangles.len()];
        for (slot, tri) in self.triangles.iter().enumerate() {
            let list = &mut neighbors[slot];
            for v in &tri.vertices {
                grid.for_each_near(v, |other| {
                    if other != slot {
                        list.push(other);
                    }
                });
            }
            list.sort_unstable();
            list.dedup();
        }

        debug!(
            triangles = self.triangles.len(),
            links = neighbors.iter().map(Vec::len).sum::<usize>() / 2,
            tolerance = self.tolerance,
            "built adjacency graph"
        );
        AdjacencyGraph { neighbors }
    }
}
