mod adjacency;
mod boundary;
mod curvature;
mod group;
pub mod params;
mod region;

pub use adjacency::{AdjacencyGraph, BuildAdjacency};
pub use boundary::{BoundaryEdge, GroupBoundary};
pub use curvature::ClassifyCurvature;
pub use group::FaceGroup;
pub use params::{AdjacencyTolerance, SegmentationParams};
pub use region::GrowRegions;

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::descriptor::{DescriptorMatch, FaceDescriptor, MatchDescriptor};
use crate::error::Result;
use crate::math::Aabb;
use crate::mesh::{ExtractTriangles, MeshBuffers, MeshId, Triangle};
use crate::native::{CorrelateNativeFaces, NativeFaceCache};

/// Where the groups of a [`Segmentation`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSource {
    /// Curvature classification and region growing only.
    Heuristic,
    /// BREP face identity, with heuristic groups for correlation misses.
    Native,
}

/// Result of segmenting one mesh.
///
/// Group positions are the stable face numbers callers key role
/// assignments, labels and fillet boundaries on.
#[derive(Debug, Clone)]
pub struct Segmentation {
    mesh_id: MeshId,
    triangles: Vec<Triangle>,
    groups: Vec<FaceGroup>,
    group_of: Vec<usize>,
    source: GroupSource,
    bounds: Aabb,
    total_area: f64,
    vertex_tolerance: f64,
}

impl Segmentation {
    fn new(
        mesh_id: MeshId,
        triangles: Vec<Triangle>,
        groups: Vec<FaceGroup>,
        source: GroupSource,
        vertex_tolerance: f64,
    ) -> Self {
        let mut group_of = vec![usize::MAX; triangles.len()];
        for (g, group) in groups.iter().enumerate() {
            for &m in &group.members {
                group_of[m] = g;
            }
        }
        let bounds = Aabb::from_points(triangles.iter().flat_map(|t| t.vertices.iter()));
        let total_area = triangles.iter().map(|t| t.area).sum();
        Self {
            mesh_id,
            triangles,
            groups,
            group_of,
            source,
            bounds,
            total_area,
            vertex_tolerance,
        }
    }

    /// Identity of the segmented mesh.
    #[must_use]
    pub fn mesh_id(&self) -> MeshId {
        self.mesh_id
    }

    /// Groups in face-number order.
    #[must_use]
    pub fn groups(&self) -> &[FaceGroup] {
        &self.groups
    }

    /// The group with face number `index`.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&FaceGroup> {
        self.groups.get(index)
    }

    /// Triangles as extracted and classified.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Face number of the group holding `triangle`, e.g. for a click.
    #[must_use]
    pub fn group_of_triangle(&self, triangle: usize) -> Option<usize> {
        self.group_of.get(triangle).copied().filter(|g| *g != usize::MAX)
    }

    /// Where the groups came from.
    #[must_use]
    pub fn source(&self) -> GroupSource {
        self.source
    }

    /// Bounds of all triangle vertices.
    #[must_use]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Sum of all triangle areas.
    #[must_use]
    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if segmentation produced no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Fingerprint of group `index` for re-identification after remeshing.
    #[must_use]
    pub fn descriptor(&self, index: usize) -> Option<FaceDescriptor> {
        self.group(index)
            .map(|g| FaceDescriptor::from_group(g, &self.bounds, self.total_area))
    }

    /// Finds the group best matching a stored descriptor.
    #[must_use]
    pub fn find(&self, descriptor: &FaceDescriptor) -> Option<DescriptorMatch> {
        MatchDescriptor::new(descriptor).execute(&self.groups, &self.bounds, self.total_area)
    }

    /// Edges separating group `index` from its neighbors.
    #[must_use]
    pub fn boundary_edges(&self, index: usize) -> Vec<BoundaryEdge> {
        GroupBoundary::new(self, index).execute()
    }

    pub(crate) fn vertex_tolerance(&self) -> f64 {
        self.vertex_tolerance
    }
}

/// Segments a mesh into face groups.
///
/// Runs triangle extraction, adjacency, curvature classification and region
/// growing. With a native face cache attached, triangles are first matched
/// to BREP faces; if enough of them match, native identity decides the
/// groups and only the misses go through region growing.
pub struct SegmentMesh<'a> {
    mesh: &'a MeshBuffers,
    params: SegmentationParams,
    native: Option<&'a NativeFaceCache>,
}

impl<'a> SegmentMesh<'a> {
    /// Creates a new `SegmentMesh` operation with default parameters.
    #[must_use]
    pub fn new(mesh: &'a MeshBuffers) -> Self {
        Self {
            mesh,
            params: SegmentationParams::default(),
            native: None,
        }
    }

    /// Sets custom heuristic thresholds.
    #[must_use]
    pub fn with_params(mut self, params: SegmentationParams) -> Self {
        self.params = params;
        self
    }

    /// Correlates against a BREP face cache built for this mesh.
    ///
    /// A cache built for another mesh identity is ignored.
    #[must_use]
    pub fn with_native(mut self, cache: &'a NativeFaceCache) -> Self {
        self.native = Some(cache);
        self
    }

    /// Executes the segmentation.
    ///
    /// # Errors
    ///
    /// Returns an error if the segmentation or correlation parameters are
    /// invalid or the mesh buffers break their contract. Missing position
    /// data is not an error and yields an empty segmentation.
    pub fn execute(&self) -> Result<Segmentation> {
        self.params.validate()?;
        if let Some(cache) = self.native {
            cache.params().validate()?;
        }
        let mut triangles = ExtractTriangles::new(self.mesh).execute()?;

        let diagonal =
            Aabb::from_points(triangles.iter().flat_map(|t| t.vertices.iter())).diagonal();
        let tolerance = self.params.adjacency_tolerance.resolve(diagonal);
        let graph = BuildAdjacency::new(&triangles, tolerance).execute();
        ClassifyCurvature::new(&graph, self.params).execute(&mut triangles);

        let cache = self.native.filter(|cache| {
            let fresh = cache.mesh_id() == self.mesh.id;
            if !fresh {
                warn!(
                    mesh = self.mesh.id.0,
                    cache = cache.mesh_id().0,
                    "ignoring native face cache built for another mesh"
                );
            }
            fresh
        });

        if let Some(cache) = cache {
            let correlation = CorrelateNativeFaces::new(cache).execute(&triangles);
            if !triangles.is_empty()
                && correlation.matched_fraction() >= cache.params().min_matched_fraction
            {
                let groups = native_groups(
                    &mut triangles,
                    &graph,
                    self.params,
                    cache,
                    &correlation.assignments,
                );
                debug!(groups = groups.len(), "segmented with native faces");
                return Ok(Segmentation::new(
                    self.mesh.id,
                    triangles,
                    groups,
                    GroupSource::Native,
                    tolerance,
                ));
            }
            debug!(
                fraction = correlation.matched_fraction(),
                "native correlation below threshold, using heuristic groups"
            );
        }

        let groups = GrowRegions::new(&graph, self.params).execute(&triangles);
        Ok(Segmentation::new(
            self.mesh.id,
            triangles,
            groups,
            GroupSource::Heuristic,
            tolerance,
        ))
    }
}

/// Groups correlated triangles by native face, in face order, then grows
/// heuristic groups over the misses.
///
/// A degenerate miss joins the native face of its lowest-indexed correlated
/// neighbor. A native face that no triangle correlates with gets no group.
fn native_groups(
    triangles: &mut [Triangle],
    graph: &AdjacencyGraph,
    params: SegmentationParams,
    cache: &NativeFaceCache,
    assignments: &[Option<usize>],
) -> Vec<FaceGroup> {
    let mut assignments = assignments.to_vec();
    for index in 0..triangles.len() {
        if assignments[index].is_some() || !triangles[index].is_degenerate() {
            continue;
        }
        let host = graph
            .neighbors(index)
            .iter()
            .filter(|&&nb| !triangles[nb].is_degenerate())
            .find_map(|&nb| assignments[nb]);
        assignments[index] = host;
    }

    let mut by_face: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (tri, assignment) in triangles.iter_mut().zip(&assignments) {
        if let Some(face) = *assignment {
            tri.native_face = Some(face);
            tri.is_curved = cache.entries()[face].is_curved;
            by_face.entry(face).or_default().push(tri.index);
        }
    }
    if by_face.len() < cache.entries().len() {
        debug!(
            faces = cache.entries().len(),
            correlated = by_face.len(),
            "native faces without triangles get no group"
        );
    }

    let mut groups: Vec<FaceGroup> = by_face
        .into_iter()
        .map(|(face, members)| {
            FaceGroup::from_members(triangles, members, cache.entries()[face].is_curved, Some(face))
        })
        .collect();

    let misses: Vec<bool> = assignments.iter().map(Option::is_none).collect();
    if misses.iter().any(|m| *m) {
        groups.extend(
            GrowRegions::new(graph, params)
                .restricted_to(&misses)
                .execute(triangles),
        );
    }
    groups
}
