use crate::math::{Point3, Vector3};

/// A single mesh triangle with its derived geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Position in the flat triangle list.
    pub index: usize,
    /// Unit normal, or `None` for a degenerate (zero-area) triangle.
    pub normal: Option<Vector3>,
    /// Mean of the three vertices.
    pub centroid: Point3,
    /// Corner positions in winding order.
    pub vertices: [Point3; 3],
    /// Surface area, never negative.
    pub area: f64,
    /// Set by curvature classification or by native face correlation.
    pub is_curved: bool,
    /// Index into the BREP face list when correlated.
    pub native_face: Option<usize>,
}

impl Triangle {
    /// Returns `true` if the triangle has no usable normal.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.normal.is_none()
    }

    /// The three edges as vertex pairs, in winding order.
    #[must_use]
    pub fn edges(&self) -> [(Point3, Point3); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}
