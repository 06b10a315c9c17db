use std::collections::HashMap;

use super::Point3;

/// Integer lattice coordinate of a point on a uniform grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey(pub i64, pub i64, pub i64);

impl GridKey {
    /// Snaps `point` to the nearest lattice node of spacing `quantum`.
    ///
    /// Two points closer than `quantum / 2` along every axis usually share a
    /// key; points straddling a rounding boundary do not.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn quantize(point: &Point3, quantum: f64) -> Self {
        Self(
            (point.x / quantum).round() as i64,
            (point.y / quantum).round() as i64,
            (point.z / quantum).round() as i64,
        )
    }

    /// Returns the grid cell of size `cell_size` containing `point`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell(point: &Point3, cell_size: f64) -> Self {
        Self(
            (point.x / cell_size).floor() as i64,
            (point.y / cell_size).floor() as i64,
            (point.z / cell_size).floor() as i64,
        )
    }

    fn offset(self, dx: i64, dy: i64, dz: i64) -> Self {
        Self(self.0 + dx, self.1 + dy, self.2 + dz)
    }
}

/// Bucketed spatial hash of points, each tagged with a caller payload.
///
/// Cells are as large as the query radius, so every point within the radius
/// of a query lives in the 3x3x3 cell block around the query's own cell.
#[derive(Debug)]
pub struct VertexGrid<T> {
    cell_size: f64,
    cells: HashMap<GridKey, Vec<(Point3, T)>>,
}

impl<T: Copy> VertexGrid<T> {
    /// Creates an empty grid whose queries use `radius` as the match distance.
    #[must_use]
    pub fn new(radius: f64) -> Self {
        Self {
            cell_size: radius.max(super::TOLERANCE),
            cells: HashMap::new(),
        }
    }

    /// Inserts `point` tagged with `payload`.
    pub fn insert(&mut self, point: Point3, payload: T) {
        let key = GridKey::cell(&point, self.cell_size);
        self.cells.entry(key).or_default().push((point, payload));
    }

    /// Calls `visit` for every stored payload within the grid radius of `point`.
    pub fn for_each_near(&self, point: &Point3, mut visit: impl FnMut(T)) {
        let center = GridKey::cell(point, self.cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&center.offset(dx, dy, dz)) else {
                        continue;
                    };
                    for (other, payload) in bucket {
                        if (other - point).norm() <= self.cell_size {
                            visit(*payload);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_rounds_to_nearest() {
        let k = GridKey::quantize(&Point3::new(0.0014, -0.0016, 1.0), 0.001);
        assert_eq!(k, GridKey(1, -2, 1000));
    }

    #[test]
    fn cell_floors_negative_coordinates() {
        let k = GridKey::cell(&Point3::new(-0.5, 0.5, 2.0), 1.0);
        assert_eq!(k, GridKey(-1, 0, 2));
    }

    #[test]
    fn finds_points_across_cell_boundaries() {
        let mut grid = VertexGrid::new(0.01);
        grid.insert(Point3::new(0.0099, 0.0, 0.0), 1_usize);
        grid.insert(Point3::new(0.5, 0.0, 0.0), 2_usize);

        let mut found = Vec::new();
        grid.for_each_near(&Point3::new(0.0101, 0.0, 0.0), |p| found.push(p));
        assert_eq!(found, vec![1]);
    }
}
