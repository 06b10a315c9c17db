use thiserror::Error;

/// Top-level error type for the meshfacet segmentation engine.
#[derive(Debug, Error)]
pub enum MeshFacetError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Native(#[from] NativeError),
}

/// Errors raised when the upstream mesh buffers break their contract.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("position buffer length {0} is not a multiple of 3")]
    PositionLength(usize),

    #[error("index buffer length {0} is not a multiple of 3")]
    IndexLength(usize),

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Errors related to invalid configuration values.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("parameter {parameter} = {value} is invalid: {reason}")]
    Invalid {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Errors reported by a BREP kernel while answering face queries.
#[derive(Debug, Error)]
pub enum NativeError {
    #[error("face {face_index} could not be tessellated: {reason}")]
    Tessellation { face_index: usize, reason: String },
}

/// Convenience type alias for results using [`MeshFacetError`].
pub type Result<T> = std::result::Result<T, MeshFacetError>;
