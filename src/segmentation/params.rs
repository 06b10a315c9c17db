use crate::error::{ParamsError, Result};
use crate::math::TOLERANCE;

/// Neighbor angles at or below this are numerical noise, in degrees.
pub const DEFAULT_NOISE_ANGLE_DEG: f64 = 1.5;

/// Neighbor angles at or above this are hard edges, in degrees.
pub const DEFAULT_SHARP_EDGE_ANGLE_DEG: f64 = 50.0;

/// Largest angle between neighbors merged into one planar group, in degrees.
pub const DEFAULT_PLANAR_MERGE_ANGLE_DEG: f64 = 10.0;

/// Largest angle between neighbors merged into one curved group, in degrees.
pub const DEFAULT_CURVED_MERGE_ANGLE_DEG: f64 = 30.0;

/// Normals this close to a cardinal axis are forced planar, in degrees.
pub const DEFAULT_AXIS_ALIGNMENT_DEG: f64 = 0.5;

/// A cardinal-facing patch counts as a flat panel when it is at least this
/// many times the area of every patch it bends into.
pub const DEFAULT_FLAT_PATCH_AREA_RATIO: f64 = 2.0;

/// Default vertex-sharing tolerance as a fraction of the mesh diagonal.
pub const DEFAULT_RELATIVE_ADJACENCY_TOLERANCE: f64 = 1e-4;

/// Distance under which two triangle corners count as the same vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjacencyTolerance {
    /// Fixed distance in model units.
    Absolute(f64),
    /// Fraction of the mesh bounding-box diagonal.
    RelativeToDiagonal(f64),
}

impl AdjacencyTolerance {
    /// Resolves the tolerance for a mesh with the given bounding diagonal.
    #[must_use]
    pub fn resolve(self, diagonal: f64) -> f64 {
        match self {
            Self::Absolute(tol) => tol.max(TOLERANCE),
            Self::RelativeToDiagonal(fraction) => (fraction * diagonal).max(TOLERANCE),
        }
    }

    fn value(self) -> f64 {
        match self {
            Self::Absolute(v) | Self::RelativeToDiagonal(v) => v,
        }
    }
}

impl Default for AdjacencyTolerance {
    fn default() -> Self {
        Self::RelativeToDiagonal(DEFAULT_RELATIVE_ADJACENCY_TOLERANCE)
    }
}

/// Thresholds controlling heuristic segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationParams {
    /// Vertex-sharing tolerance for the adjacency graph.
    pub adjacency_tolerance: AdjacencyTolerance,
    /// Lower bound (exclusive) of the continuous-bend band.
    pub noise_angle_deg: f64,
    /// Upper bound (exclusive) of the continuous-bend band.
    pub sharp_edge_angle_deg: f64,
    /// Merge threshold between planar neighbors.
    pub planar_merge_angle_deg: f64,
    /// Merge threshold between curved neighbors.
    pub curved_merge_angle_deg: f64,
    /// Cardinal-axis tolerance for the flat override.
    pub axis_alignment_deg: f64,
    /// Forces triangles facing a cardinal axis to be planar when they lie on
    /// a flat panel.
    pub axis_aligned_flat_override: bool,
    /// Area ratio between a patch and its bent neighbors above which the
    /// flat override applies.
    pub flat_patch_area_ratio: f64,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            adjacency_tolerance: AdjacencyTolerance::default(),
            noise_angle_deg: DEFAULT_NOISE_ANGLE_DEG,
            sharp_edge_angle_deg: DEFAULT_SHARP_EDGE_ANGLE_DEG,
            planar_merge_angle_deg: DEFAULT_PLANAR_MERGE_ANGLE_DEG,
            curved_merge_angle_deg: DEFAULT_CURVED_MERGE_ANGLE_DEG,
            axis_alignment_deg: DEFAULT_AXIS_ALIGNMENT_DEG,
            axis_aligned_flat_override: true,
            flat_patch_area_ratio: DEFAULT_FLAT_PATCH_AREA_RATIO,
        }
    }
}

impl SegmentationParams {
    /// Checks that every threshold is finite and consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is negative or not finite, or the
    /// continuous-bend band is empty.
    pub fn validate(&self) -> Result<()> {
        check_non_negative("adjacency_tolerance", self.adjacency_tolerance.value())?;
        check_angle("noise_angle_deg", self.noise_angle_deg)?;
        check_angle("sharp_edge_angle_deg", self.sharp_edge_angle_deg)?;
        check_angle("planar_merge_angle_deg", self.planar_merge_angle_deg)?;
        check_angle("curved_merge_angle_deg", self.curved_merge_angle_deg)?;
        check_angle("axis_alignment_deg", self.axis_alignment_deg)?;
        check_non_negative("flat_patch_area_ratio", self.flat_patch_area_ratio)?;
        if self.sharp_edge_angle_deg <= self.noise_angle_deg {
            return Err(ParamsError::Invalid {
                parameter: "sharp_edge_angle_deg",
                value: self.sharp_edge_angle_deg,
                reason: "must exceed noise_angle_deg",
            }
            .into());
        }
        Ok(())
    }
}

pub(crate) fn check_non_negative(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ParamsError::Invalid {
            parameter,
            value,
            reason: "must be finite and non-negative",
        }
        .into())
    }
}

fn check_angle(parameter: &'static str, value: f64) -> Result<()> {
    check_non_negative(parameter, value)?;
    if value > 180.0 {
        return Err(ParamsError::Invalid {
            parameter,
            value,
            reason: "must not exceed 180 degrees",
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SegmentationParams::default().validate().is_ok());
    }

    #[test]
    fn empty_bend_band_is_rejected() {
        let params = SegmentationParams {
            noise_angle_deg: 40.0,
            sharp_edge_angle_deg: 30.0,
            ..SegmentationParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn nan_is_rejected() {
        let params = SegmentationParams {
            curved_merge_angle_deg: f64::NAN,
            ..SegmentationParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn relative_tolerance_scales_with_diagonal() {
        let tol = AdjacencyTolerance::RelativeToDiagonal(1e-3);
        assert!((tol.resolve(100.0) - 0.1).abs() < 1e-12);
        assert!(tol.resolve(0.0) > 0.0);
        assert!((AdjacencyTolerance::Absolute(0.5).resolve(1e6) - 0.5).abs() < f64::EPSILON);
    }
}
