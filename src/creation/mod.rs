//! Canonical triangle meshes for fixtures and demos.

mod make_box;
mod make_cylinder;

pub use make_box::MakeBoxMesh;
pub use make_cylinder::MakeCylinderMesh;

use crate::error::{ParamsError, Result};
use crate::math::{Point3, TOLERANCE};

fn require_positive(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > TOLERANCE {
        Ok(())
    } else {
        Err(ParamsError::Invalid {
            parameter,
            value,
            reason: "must be positive",
        }
        .into())
    }
}

fn flatten(points: &[Point3]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
}
