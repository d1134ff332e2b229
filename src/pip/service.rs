//! Relation source answered from the in-memory boundary index.

use hashbrown::HashSet;
use tracing::debug;

use super::BoundaryIndex;
use crate::geomath::BoundingBox;
use crate::models::{FeatureKind, FeatureMask, GeoPoint, RelationId, TaggedFeature};
use crate::source::RelationSource;

/// Feature selected by `mask`; peaks need an elevation tag
fn selected(feature: &TaggedFeature, mask: FeatureMask) -> bool {
    mask.includes(feature.kind)
        && (feature.kind != FeatureKind::Peak || feature.tags.contains_key("ele"))
}

/// Sorted, duplicate-free IDs
fn unique_sorted(ids: impl Iterator<Item = RelationId>) -> Vec<RelationId> {
    let mut ids: Vec<RelationId> = ids.collect::<HashSet<_>>().into_iter().collect();
    ids.sort_by_key(|id| id.0);
    ids
}

impl RelationSource for BoundaryIndex {
    fn relation_ids_by_name(&self, name: &str) -> Vec<RelationId> {
        unique_sorted(
            self.boundaries()
                .filter(|b| b.is_administrative() && b.name() == Some(name))
                .map(|b| b.id),
        )
    }

    fn relation_ids_by_point(&self, point: GeoPoint) -> Vec<RelationId> {
        let ids = unique_sorted(
            self.lookup(&point)
                .into_iter()
                .filter(|b| b.is_point_candidate())
                .map(|b| b.id),
        );
        debug!(
            "PIP lookup at ({}, {}): found {} relations",
            point.lat,
            point.lon,
            ids.len()
        );
        ids
    }

    fn relation_ids_in_box(&self, bbox: &BoundingBox, features: FeatureMask) -> Vec<RelationId> {
        if features.is_empty() {
            return Vec::new();
        }

        unique_sorted(
            self.features
                .iter()
                .filter(|f| selected(f, features) && bbox.contains(&f.position))
                .flat_map(|f| self.lookup(&f.position))
                .filter(|b| b.is_region())
                .map(|b| b.id),
        )
    }

    fn features_in_relation(&self, id: RelationId, features: FeatureMask) -> Vec<TaggedFeature> {
        if features.is_empty() {
            return Vec::new();
        }
        let Some(boundary) = self.boundaries().find(|b| b.id == id) else {
            return Vec::new();
        };

        self.features
            .iter()
            .filter(|f| selected(f, features) && boundary.contains(&f.position))
            .cloned()
            .collect()
    }
}
