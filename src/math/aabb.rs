use super::{Point3, Vector3};

/// An axis-aligned bounding box.
///
/// An empty box has `min` at `+inf` and `max` at `-inf`, so including the
/// first point makes it a degenerate box around that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Creates an empty bounding box that contains nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Creates the tightest bounding box around `points`.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include(p);
        }
        aabb
    }

    /// Grows the box so that it contains `point`.
    pub fn include(&mut self, point: &Point3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Returns `true` if no point has been included yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Edge lengths along each axis, zero for an empty box.
    #[must_use]
    pub fn extent(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.extent().norm()
    }

    /// Returns a copy grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        let m = Vector3::repeat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Returns `true` if `point` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, point: &Point3) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Euclidean distance from `point` to the box, zero when inside.
    #[must_use]
    pub fn distance_to(&self, point: &Point3) -> f64 {
        if self.is_empty() {
            return f64::INFINITY;
        }
        let mut sq = 0.0;
        for i in 0..3 {
            let d = (self.min[i] - point[i]).max(point[i] - self.max[i]).max(0.0);
            sq += d * d;
        }
        sq.sqrt()
    }

    /// Maps `point` into the box-relative unit cube.
    ///
    /// Axes with zero extent map to `0.5`. Results are clamped to `[0, 1]`.
    #[must_use]
    pub fn normalize(&self, point: &Point3) -> [f64; 3] {
        let extent = self.extent();
        let mut out = [0.5; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            if extent[i] > super::TOLERANCE {
                *slot = ((point[i] - self.min[i]) / extent[i]).clamp(0.0, 1.0);
            }
        }
        out
    }
}
