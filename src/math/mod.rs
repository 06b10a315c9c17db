pub mod aabb;
pub mod grid;

pub use aabb::Aabb;
pub use grid::{GridKey, VertexGrid};

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// Uses `atan2(|a x b|, a . b)`, which stays accurate for nearly parallel
/// vectors and returns exactly zero for identical ones.
#[must_use]
pub fn angle_between_deg(a: &Vector3, b: &Vector3) -> f64 {
    a.cross(b).norm().atan2(a.dot(b)).to_degrees()
}

/// Smallest angle in degrees between `normal` and any of the six cardinal
/// directions (`±X`, `±Y`, `±Z`).
#[must_use]
pub fn cardinal_deviation_deg(normal: &Vector3) -> f64 {
    let len = normal.norm();
    if len < TOLERANCE {
        return 90.0;
    }
    let max_component = normal.x.abs().max(normal.y.abs()).max(normal.z.abs()) / len;
    max_component.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_zero_angle() {
        let v = Vector3::new(0.3, -0.4, 0.866).normalize();
        assert!(angle_between_deg(&v, &v).abs() < f64::EPSILON);
    }

    #[test]
    fn perpendicular_and_opposite() {
        assert!((angle_between_deg(&Vector3::x(), &Vector3::y()) - 90.0).abs() < 1e-12);
        assert!((angle_between_deg(&Vector3::x(), &-Vector3::x()) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn cardinal_deviation() {
        assert!(cardinal_deviation_deg(&-Vector3::z()).abs() < 1e-6);
        let diag = Vector3::new(1.0, 1.0, 0.0).normalize();
        assert!((cardinal_deviation_deg(&diag) - 45.0).abs() < 1e-9);
        assert!((cardinal_deviation_deg(&Vector3::zeros()) - 90.0).abs() < f64::EPSILON);
    }
}
