use std::f64::consts::TAU;

use crate::error::{ParamsError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::MeshBuffers;

use super::{flatten, require_positive};

/// Creates an indexed capped-cylinder mesh.
///
/// The wall is `segments` flat quads, each split into two triangles; each
/// cap is a fan of `segments` triangles around a center vertex. Triangles
/// are emitted wall first, then the bottom cap, then the top cap, all wound
/// outward.
pub struct MakeCylinderMesh {
    center: Point3,
    radius: f64,
    axis: Vector3,
    height: f64,
    segments: u32,
}

impl MakeCylinderMesh {
    /// Creates a new `MakeCylinderMesh` operation.
    ///
    /// `center` is the middle of the bottom cap; the cylinder extends
    /// `height` along `axis`.
    #[must_use]
    pub fn new(center: Point3, radius: f64, axis: Vector3, height: f64, segments: u32) -> Self {
        Self {
            center,
            radius,
            axis,
            height,
            segments,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or height is not positive, the axis is
    /// zero-length, or fewer than 3 segments are requested.
    pub fn execute(&self) -> Result<MeshBuffers> {
        require_positive("cylinder radius", self.radius)?;
        require_positive("cylinder height", self.height)?;
        let axis_len = self.axis.norm();
        require_positive("cylinder axis length", axis_len)?;
        if self.segments < 3 {
            return Err(ParamsError::Invalid {
                parameter: "cylinder segments",
                value: f64::from(self.segments),
                reason: "at least 3 segments are needed",
            }
            .into());
        }

        let axis = self.axis / axis_len;
        let ref_dir = perpendicular_dir(&axis);
        let binormal = axis.cross(&ref_dir);
        let rise = axis * self.height;
        let n = self.segments;

        // Layout: bottom ring [0, n), top ring [n, 2n), bottom center 2n, top center 2n + 1.
        let mut points = Vec::with_capacity(2 * n as usize + 2);
        for i in 0..n {
            let theta = TAU * f64::from(i) / f64::from(n);
            points.push(self.center + (ref_dir * theta.cos() + binormal * theta.sin()) * self.radius);
        }
        for i in 0..n as usize {
            points.push(points[i] + rise);
        }
        points.push(self.center);
        points.push(self.center + rise);

        let bottom_center = 2 * n;
        let top_center = 2 * n + 1;
        let mut indices = Vec::with_capacity(12 * n as usize);
        for i in 0..n {
            let next = (i + 1) % n;
            let (b0, b1, t0, t1) = (i, next, n + i, n + next);
            indices.extend([b0, b1, t1, b0, t1, t0]);
        }
        for i in 0..n {
            indices.extend([bottom_center, (i + 1) % n, i]);
        }
        for i in 0..n {
            indices.extend([top_center, n + i, n + (i + 1) % n]);
        }

        Ok(MeshBuffers::new(flatten(&points), Some(indices)))
    }
}

/// Finds a direction perpendicular to the given unit vector.
fn perpendicular_dir(axis: &Vector3) -> Vector3 {
    let candidate = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let perp = axis.cross(&candidate);
    perp / perp.norm().max(TOLERANCE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::ExtractTriangles;

    #[test]
    fn triangle_layout_and_orientation() {
        let mesh = MakeCylinderMesh::new(Point3::origin(), 2.0, Vector3::z(), 3.0, 12)
            .execute()
            .unwrap();
        let tris = ExtractTriangles::new(&mesh).execute().unwrap();
        assert_eq!(tris.len(), 48);

        for t in &tris[..24] {
            let n = t.normal.unwrap();
            let radial = Vector3::new(t.centroid.x, t.centroid.y, 0.0).normalize();
            assert!(n.z.abs() < 1e-12);
            assert!(n.dot(&radial) > 0.9, "wall triangle {} faces inward", t.index);
        }
        assert!(tris[24..36].iter().all(|t| t.normal.unwrap().z < -0.999_999));
        assert!(tris[36..].iter().all(|t| t.normal.unwrap().z > 0.999_999));
    }

    #[test]
    fn tilted_axis_keeps_caps_perpendicular() {
        let axis = Vector3::new(1.0, 2.0, 2.0);
        let mesh = MakeCylinderMesh::new(Point3::new(1.0, 0.0, 0.0), 0.5, axis, 1.0, 8)
            .execute()
            .unwrap();
        let tris = ExtractTriangles::new(&mesh).execute().unwrap();
        let unit = axis.normalize();
        assert!(tris[16..24].iter().all(|t| (t.normal.unwrap() + unit).norm() < 1e-9));
        assert!(tris[24..].iter().all(|t| (t.normal.unwrap() - unit).norm() < 1e-9));
    }

    #[test]
    fn invalid_inputs_fail() {
        let o = Point3::origin();
        assert!(MakeCylinderMesh::new(o, 0.0, Vector3::z(), 1.0, 8).execute().is_err());
        assert!(MakeCylinderMesh::new(o, 1.0, Vector3::z(), 0.0, 8).execute().is_err());
        assert!(MakeCylinderMesh::new(o, 1.0, Vector3::zeros(), 1.0, 8).execute().is_err());
        assert!(MakeCylinderMesh::new(o, 1.0, Vector3::z(), 1.0, 2).execute().is_err());
    }
}
