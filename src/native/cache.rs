use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::error::{ParamsError, Result};
use crate::math::{Aabb, GridKey};
use crate::mesh::MeshId;
use crate::segmentation::params::check_non_negative;

use super::{NativeFace, NativeShape, SurfaceKind};

/// Parameters for correlating mesh triangles with BREP faces.
///
/// Distances are in model units. The defaults suit a model about one unit
/// across; use [`CorrelationParams::scaled_to`] for models in other units,
/// e.g. cabinets in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationParams {
    /// Grid spacing used to quantize vertices into comparable keys.
    pub quantum: f64,
    /// Margin added on every side of a face's bounding box.
    pub bbox_margin: f64,
    /// Linear tolerance passed to the kernel tessellator.
    pub tessellation_tolerance: f64,
    /// Angular tolerance (radians) passed to the kernel tessellator.
    pub angular_tolerance: f64,
    /// Minimum shared vertex keys (of 3) for a direct match.
    pub min_vertex_matches: usize,
    /// Largest centroid-to-box distance accepted by the nearest-box fallback.
    pub fallback_max_distance: f64,
    /// Share of triangles that must correlate before native faces take over.
    pub min_matched_fraction: f64,
}

impl Default for CorrelationParams {
    fn default() -> Self {
        Self {
            quantum: 1e-3,
            bbox_margin: 1e-3,
            tessellation_tolerance: 1e-2,
            angular_tolerance: 0.5,
            min_vertex_matches: 2,
            fallback_max_distance: 1e-2,
            min_matched_fraction: 0.5,
        }
    }
}

impl CorrelationParams {
    /// Default parameters with every distance scaled to a model whose
    /// bounding diagonal is `diagonal`.
    #[must_use]
    pub fn scaled_to(diagonal: f64) -> Self {
        let defaults = Self::default();
        Self {
            quantum: defaults.quantum * diagonal,
            bbox_margin: defaults.bbox_margin * diagonal,
            tessellation_tolerance: defaults.tessellation_tolerance * diagonal,
            fallback_max_distance: defaults.fallback_max_distance * diagonal,
            ..defaults
        }
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if a distance is negative or not finite, `quantum` is
    /// zero, `min_vertex_matches` exceeds 3, or `min_matched_fraction` lies
    /// outside `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<()> {
        check_non_negative("quantum", self.quantum)?;
        check_non_negative("bbox_margin", self.bbox_margin)?;
        check_non_negative("tessellation_tolerance", self.tessellation_tolerance)?;
        check_non_negative("angular_tolerance", self.angular_tolerance)?;
        check_non_negative("fallback_max_distance", self.fallback_max_distance)?;
        check_non_negative("min_matched_fraction", self.min_matched_fraction)?;
        if self.quantum <= 0.0 {
            return Err(ParamsError::Invalid {
                parameter: "quantum",
                value: self.quantum,
                reason: "must be positive",
            }
            .into());
        }
        if self.min_vertex_matches > 3 {
            return Err(ParamsError::Invalid {
                parameter: "min_vertex_matches",
                value: self.min_vertex_matches as f64,
                reason: "a triangle has only 3 vertices",
            }
            .into());
        }
        if self.min_matched_fraction > 1.0 {
            return Err(ParamsError::Invalid {
                parameter: "min_matched_fraction",
                value: self.min_matched_fraction,
                reason: "must not exceed 1",
            }
            .into());
        }
        Ok(())
    }
}

/// Lookup data for one BREP face.
#[derive(Debug, Clone)]
pub struct NativeFaceCacheEntry {
    /// Position of the face in the shape's face list.
    pub face_index: usize,
    /// Surface type reported by the kernel.
    pub kind: SurfaceKind,
    /// Quantized keys of every tessellation vertex.
    pub vertex_keys: HashSet<GridKey>,
    /// Tessellation bounds grown by the margin. Empty if tessellation failed.
    pub bounds: Aabb,
    /// Derived from `kind`.
    pub is_curved: bool,
}

/// Per-face lookup tables for one mesh, built once and never mutated.
#[derive(Debug)]
pub struct NativeFaceCache {
    mesh_id: MeshId,
    params: CorrelationParams,
    entries: Vec<NativeFaceCacheEntry>,
}

impl NativeFaceCache {
    /// Tessellates every face of `shape` and builds its entry.
    ///
    /// A face the kernel fails to tessellate gets an empty entry that
    /// matches no triangle.
    pub fn build<S: NativeShape + ?Sized>(
        mesh_id: MeshId,
        shape: &S,
        params: CorrelationParams,
    ) -> Self {
        let entries: Vec<NativeFaceCacheEntry> = shape
            .faces()
            .iter()
            .enumerate()
            .map(|(face_index, face)| build_entry(face_index, face, &params))
            .collect();

        debug!(
            mesh = mesh_id.0,
            faces = entries.len(),
            "built native face cache"
        );
        Self {
            mesh_id,
            params,
            entries,
        }
    }

    /// Identity of the mesh this cache was built for.
    #[must_use]
    pub fn mesh_id(&self) -> MeshId {
        self.mesh_id
    }

    /// Parameters the cache was built with.
    #[must_use]
    pub fn params(&self) -> &CorrelationParams {
        &self.params
    }

    /// Entries in native face order.
    #[must_use]
    pub fn entries(&self) -> &[NativeFaceCacheEntry] {
        &self.entries
    }

    /// Returns `true` if this cache answers for `mesh_id` under `params`.
    #[must_use]
    pub fn is_valid_for(&self, mesh_id: MeshId, params: &CorrelationParams) -> bool {
        self.mesh_id == mesh_id && self.params == *params
    }
}

fn build_entry<F: NativeFace>(
    face_index: usize,
    face: &F,
    params: &CorrelationParams,
) -> NativeFaceCacheEntry {
    let kind = face.surface_kind();
    let (vertex_keys, bounds) =
        match face.tessellate(params.tessellation_tolerance, params.angular_tolerance) {
            Ok(tess) => {
                let keys = tess
                    .vertices
                    .iter()
                    .map(|v| GridKey::quantize(v, params.quantum))
                    .collect();
                let bounds = Aabb::from_points(&tess.vertices).expanded(params.bbox_margin);
                (keys, bounds)
            }
            Err(err) => {
                warn!(face_index, error = %err, "native face tessellation failed");
                (HashSet::new(), Aabb::empty())
            }
        };

    NativeFaceCacheEntry {
        face_index,
        kind,
        vertex_keys,
        bounds,
        is_curved: kind.is_curved(),
    }
}

/// Process-wide slot holding the native face cache of the current mesh.
///
/// Rebuild-then-swap: a stale cache is replaced by building a fresh one
/// outside the lock and installing it under a short write lock, so readers
/// only ever see a complete cache for the mesh they asked about.
#[derive(Debug, Default)]
pub struct SharedFaceCache {
    slot: RwLock<Option<Arc<NativeFaceCache>>>,
}

impl SharedFaceCache {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cache for `mesh_id`, rebuilding it from `shape` if the
    /// slot is empty or holds another mesh's cache.
    pub fn get_or_build<S: NativeShape + ?Sized>(
        &self,
        mesh_id: MeshId,
        shape: &S,
        params: CorrelationParams,
    ) -> Arc<NativeFaceCache> {
        if let Some(cache) = self.slot.read().as_ref() {
            if cache.is_valid_for(mesh_id, &params) {
                trace!(mesh = mesh_id.0, "native face cache hit");
                return Arc::clone(cache);
            }
        }

        trace!(mesh = mesh_id.0, "native face cache miss");
        let fresh = Arc::new(NativeFaceCache::build(mesh_id, shape, params));

        let mut slot = self.slot.write();
        if let Some(current) = slot.as_ref() {
            if current.is_valid_for(mesh_id, &params) {
                return Arc::clone(current);
            }
        }
        *slot = Some(Arc::clone(&fresh));
        fresh
    }

    /// The currently installed cache, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<NativeFaceCache>> {
        self.slot.read().clone()
    }

    /// Drops the installed cache.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}
