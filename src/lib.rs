//! Mesh face segmentation for CAD solids.
//!
//! Partitions a triangulated solid into groups matching its real faces
//! (flat panels, cylindrical fillets, ...). Groups come from curvature
//! classification and region growing, or from a BREP shape's native faces
//! when one is available. Face descriptors re-identify a group after the
//! mesh is regenerated.
//!
//! ```
//! use meshfacet::creation::MakeBoxMesh;
//! use meshfacet::math::Point3;
//! use meshfacet::segmentation::SegmentMesh;
//!
//! let mesh = MakeBoxMesh::new(Point3::origin(), Point3::new(0.6, 0.4, 0.8)).execute()?;
//! let segmentation = SegmentMesh::new(&mesh).execute()?;
//! assert_eq!(segmentation.len(), 6);
//!
//! let clicked = segmentation.group_of_triangle(3);
//! assert_eq!(clicked, Some(1));
//! # Ok::<(), meshfacet::MeshFacetError>(())
//! ```

pub mod creation;
pub mod descriptor;
pub mod error;
pub mod math;
pub mod mesh;
pub mod native;
pub mod segmentation;

pub use error::{MeshFacetError, Result};
