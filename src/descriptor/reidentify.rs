use std::collections::BTreeMap;

use tracing::debug;

use crate::segmentation::Segmentation;

use super::FaceDescriptor;

/// Outcome of resolving stored descriptors against a new segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reidentified<K> {
    /// Keys whose descriptor matched, with their new face numbers.
    pub resolved: BTreeMap<K, usize>,
    /// Keys with no group passing the normal cutoff.
    pub unresolved: Vec<K>,
}

/// Re-resolves a keyed set of descriptors, e.g. panel role assignments,
/// after the mesh was regenerated.
pub struct Reidentify<'a, K> {
    stored: &'a BTreeMap<K, FaceDescriptor>,
}

impl<'a, K: Ord + Clone> Reidentify<'a, K> {
    /// Creates a new `Reidentify` operation.
    #[must_use]
    pub fn new(stored: &'a BTreeMap<K, FaceDescriptor>) -> Self {
        Self { stored }
    }

    /// Matches every stored descriptor against `segmentation`.
    #[must_use]
    pub fn execute(&self, segmentation: &Segmentation) -> Reidentified<K> {
        let mut resolved = BTreeMap::new();
        let mut unresolved = Vec::new();
        for (key, descriptor) in self.stored {
            match segmentation.find(descriptor) {
                Some(found) => {
                    resolved.insert(key.clone(), found.group_index);
                }
                None => unresolved.push(key.clone()),
            }
        }
        debug!(
            resolved = resolved.len(),
            unresolved = unresolved.len(),
            "re-identified stored faces"
        );
        Reidentified {
            resolved,
            unresolved,
        }
    }
}
