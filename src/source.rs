//! Capabilities the search core needs from its two upstream services.

use crate::geomath::BoundingBox;
use crate::models::{FeatureMask, GeoPoint, MatchMode, RelationDetail, RelationId, TaggedFeature};

/// Spatial-relation index: which administrative relations match a name, contain a
/// point, or outline features inside a box.
///
/// Implementations return an empty list when the upstream answer is missing or
/// unreadable; that is a normal "no result".
pub trait RelationSource: Send + Sync {
    /// Administrative relations whose native name equals `name`
    fn relation_ids_by_name(&self, name: &str) -> Vec<RelationId>;

    /// Administrative (or city/town/state) relations containing `point`
    fn relation_ids_by_point(&self, point: GeoPoint) -> Vec<RelationId>;

    /// Region relations outlining features of `features` located inside `bbox`
    fn relation_ids_in_box(&self, bbox: &BoundingBox, features: FeatureMask) -> Vec<RelationId>;

    /// Features of `features` located inside relation `id`
    fn features_in_relation(&self, id: RelationId, features: FeatureMask) -> Vec<TaggedFeature>;
}

/// Relation detail lookup service.
pub trait RelationEnricher: Send + Sync {
    /// Details for every ID, in upstream order
    fn lookup_details(&self, ids: &[RelationId]) -> Vec<RelationDetail>;

    /// Details restricted to city-like address types, disambiguated by `mode`
    fn lookup_city_details(&self, ids: &[RelationId], mode: MatchMode) -> Vec<RelationDetail>;
}
