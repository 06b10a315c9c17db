mod extract;
mod triangle;

pub use extract::ExtractTriangles;
pub use triangle::Triangle;

use std::hash::{DefaultHasher, Hash, Hasher};

/// Identity of a triangle mesh, used to key caches built from it.
///
/// Either a caller-maintained generation counter ([`MeshId::new`]) or a
/// content hash of the buffers ([`MeshId::from_content`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

impl MeshId {
    /// Wraps a caller-provided identity, e.g. a generation counter.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Hashes the raw buffers. Equal buffers give equal ids.
    #[must_use]
    pub fn from_content(positions: &[f64], indices: Option<&[u32]>) -> Self {
        let mut hasher = DefaultHasher::new();
        positions.len().hash(&mut hasher);
        for value in positions {
            value.to_bits().hash(&mut hasher);
        }
        match indices {
            Some(indices) => {
                true.hash(&mut hasher);
                indices.hash(&mut hasher);
            }
            None => false.hash(&mut hasher),
        }
        Self(hasher.finish())
    }
}

/// Raw triangle mesh as produced by the rendering or tessellation layer.
#[derive(Debug, Clone)]
pub struct MeshBuffers {
    /// Flat vertex positions, three components per vertex.
    pub positions: Vec<f64>,
    /// Optional triangle indices, three per triangle. When absent, every
    /// three consecutive vertices form a triangle.
    pub indices: Option<Vec<u32>>,
    /// Identity of this mesh.
    pub id: MeshId,
}

impl MeshBuffers {
    /// Creates mesh buffers, deriving the identity from their content.
    #[must_use]
    pub fn new(positions: Vec<f64>, indices: Option<Vec<u32>>) -> Self {
        let id = MeshId::from_content(&positions, indices.as_deref());
        Self {
            positions,
            indices,
            id,
        }
    }

    /// Overrides the identity, e.g. with a generation counter.
    #[must_use]
    pub fn with_id(mut self, id: MeshId) -> Self {
        self.id = id;
        self
    }

    /// Number of complete vertices in the position buffer.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Returns `true` if there is no position data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_id_is_stable() {
        let a = MeshBuffers::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], None);
        let b = MeshBuffers::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], None);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn content_id_changes_with_geometry() {
        let a = MeshBuffers::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], None);
        let b = MeshBuffers::new(vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, 0.0], None);
        let c = MeshBuffers::new(a.positions.clone(), Some(vec![0, 1, 2]));
        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn explicit_id_overrides_content() {
        let mesh = MeshBuffers::new(vec![], None).with_id(MeshId::new(7));
        assert_eq!(mesh.id, MeshId(7));
        assert!(mesh.is_empty());
    }
}
