mod cache;
mod correlate;

pub use cache::{CorrelationParams, NativeFaceCache, NativeFaceCacheEntry, SharedFaceCache};
pub use correlate::{CorrelateNativeFaces, Correlation};

use crate::error::NativeError;
use crate::math::{Point3, Vector3};

/// Surface type a BREP kernel reports for a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// A plane.
    Planar,
    /// A cylinder.
    Cylindrical,
    /// A cone.
    Conical,
    /// A sphere.
    Spherical,
    /// A torus.
    Toroidal,
    /// B-spline, Bezier, revolution, extrusion or offset surfaces.
    Spline,
    /// Any tag the kernel reports that is not recognized.
    Unknown,
}

impl SurfaceKind {
    /// Maps a kernel surface-type tag to a kind. Matching ignores ASCII case.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "plane" | "planar" => Self::Planar,
            "cylinder" | "cylindrical" => Self::Cylindrical,
            "cone" | "conical" => Self::Conical,
            "sphere" | "spherical" => Self::Spherical,
            "torus" | "toroidal" => Self::Toroidal,
            "bspline" | "b-spline" | "bezier" | "spline" | "nurbs" | "revolution"
            | "extrusion" | "offset" => Self::Spline,
            _ => Self::Unknown,
        }
    }

    /// Whether faces of this kind bend. Unknown kinds count as flat.
    #[must_use]
    pub fn is_curved(self) -> bool {
        match self {
            Self::Planar | Self::Unknown => false,
            Self::Cylindrical | Self::Conical | Self::Spherical | Self::Toroidal | Self::Spline => {
                true
            }
        }
    }
}

/// Triangulated approximation of a single BREP face.
#[derive(Debug, Clone, Default)]
pub struct FaceTessellation {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals, parallel to `vertices` when the kernel provides them.
    pub normals: Vec<Vector3>,
}

/// Read-only view of one face of a BREP shape.
pub trait NativeFace {
    /// Surface type of the face.
    fn surface_kind(&self) -> SurfaceKind;

    /// Tessellates the face with the given linear and angular tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot tessellate the face.
    fn tessellate(
        &self,
        tolerance: f64,
        angular_tolerance: f64,
    ) -> Result<FaceTessellation, NativeError>;
}

/// Read-only view of a BREP shape as an ordered face list.
pub trait NativeShape {
    /// Face type of this shape.
    type Face: NativeFace;

    /// Faces in kernel order. Positions in this slice are the native face
    /// indices used throughout the crate.
    fn faces(&self) -> &[Self::Face];
}

impl<F: NativeFace> NativeShape for Vec<F> {
    type Face = F;

    fn faces(&self) -> &[F] {
        self
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_map_to_kinds() {
        assert_eq!(SurfaceKind::from_tag("PLANE"), SurfaceKind::Planar);
        assert_eq!(SurfaceKind::from_tag(" cylinder "), SurfaceKind::Cylindrical);
        assert_eq!(SurfaceKind::from_tag("BSPLINE"), SurfaceKind::Spline);
        assert_eq!(SurfaceKind::from_tag("torus"), SurfaceKind::Toroidal);
        assert_eq!(SurfaceKind::from_tag("hyperboloid"), SurfaceKind::Unknown);
    }

    #[test]
    fn curvedness() {
        assert!(!SurfaceKind::Planar.is_curved());
        assert!(!SurfaceKind::Unknown.is_curved());
        assert!(SurfaceKind::Cylindrical.is_curved());
        assert!(SurfaceKind::Spherical.is_curved());
        assert!(SurfaceKind::Spline.is_curved());
    }
}
