//! Spatial index for fast boundary lookups.

use rstar::{RTree, RTreeObject, AABB};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::boundary::{load_boundaries, Boundary};
use crate::models::{GeoPoint, TaggedFeature};

/// Wrapper for R-tree indexing of boundaries
#[derive(Clone)]
pub struct IndexedBoundary {
    pub boundary: Arc<Boundary>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedBoundary {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedBoundary {
    pub fn new(boundary: Boundary) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = boundary.bbox()?;
        Some(Self {
            boundary: Arc::new(boundary),
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// In-memory boundary polygons and point features.
///
/// Answers the same questions as the Overpass API for offline use and tests.
pub struct BoundaryIndex {
    tree: RTree<IndexedBoundary>,
    pub(super) features: Vec<TaggedFeature>,
}

impl BoundaryIndex {
    /// Build spatial index from boundaries and the features they may contain
    pub fn build(boundaries: Vec<Boundary>, features: Vec<TaggedFeature>) -> Self {
        info!("Building spatial index for {} boundaries...", boundaries.len());

        let indexed: Vec<IndexedBoundary> = boundaries
            .into_iter()
            .filter_map(IndexedBoundary::new)
            .collect();
        let tree = RTree::bulk_load(indexed);

        info!(
            "Spatial index built with {} entries and {} features",
            tree.size(),
            features.len()
        );

        Self { tree, features }
    }

    /// Build the index from a JSON boundary file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let (boundaries, features) = load_boundaries(path)?;
        Ok(Self::build(boundaries, features))
    }

    /// Find all boundaries containing a point
    pub fn lookup(&self, point: &GeoPoint) -> Vec<Arc<Boundary>> {
        let query_envelope = AABB::from_point([point.lon, point.lat]);

        // Envelope intersection first, then exact containment
        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ib| ib.boundary.contains(point))
            .map(|ib| Arc::clone(&ib.boundary))
            .collect()
    }

    /// Iterate over all indexed boundaries
    pub fn boundaries(&self) -> impl Iterator<Item = &Arc<Boundary>> {
        self.tree.iter().map(|ib| &ib.boundary)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
