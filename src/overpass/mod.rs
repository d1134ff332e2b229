//! Overpass API relation source.
//!
//! Builds Overpass QL queries, posts them through a [`Transport`] and extracts
//! relation IDs and tagged features from the JSON answers.

pub mod query;

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::geomath::BoundingBox;
use crate::json::{parse_document, str_at, value_at};
use crate::models::{FeatureMask, GeoPoint, RelationId, TaggedFeature};
use crate::source::RelationSource;
use crate::transport::Transport;

/// Elements of an Overpass answer; empty unless the body is a JSON object
fn elements(body: &str) -> Vec<Value> {
    let Some(document) = parse_document(body, "Overpass") else {
        return Vec::new();
    };
    if !document.is_object() {
        return Vec::new();
    }
    value_at(&document, &["elements"])
        .as_array()
        .cloned()
        .unwrap_or_default()
}

/// IDs of all elements of type "relation"
pub fn extract_relation_ids(body: &str) -> Vec<RelationId> {
    elements(body)
        .iter()
        .filter(|e| str_at(e, &["type"]) == "relation")
        .filter_map(|e| value_at(e, &["id"]).as_i64())
        .map(RelationId)
        .collect()
}

/// Tagged features; ways and relations are positioned at their `center`
pub fn extract_features(body: &str) -> Vec<TaggedFeature> {
    elements(body).iter().filter_map(parse_feature).collect()
}

fn parse_feature(element: &Value) -> Option<TaggedFeature> {
    let id = value_at(element, &["id"]).as_i64()?;

    let position = match (
        value_at(element, &["lat"]).as_f64(),
        value_at(element, &["lon"]).as_f64(),
    ) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
        _ => GeoPoint::new(
            value_at(element, &["center", "lat"]).as_f64()?,
            value_at(element, &["center", "lon"]).as_f64()?,
        ),
    };

    let tags: HashMap<String, String> = value_at(element, &["tags"])
        .as_object()
        .map(|tags| {
            tags.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Some(TaggedFeature::new(id, position, tags))
}

/// Relation source backed by the Overpass API
pub struct OverpassSource<T> {
    client: T,
}

impl<T: Transport> OverpassSource<T> {
    pub fn new(client: T) -> Self {
        Self { client }
    }

    fn relation_ids(&self, request: &str) -> Vec<RelationId> {
        let ids = extract_relation_ids(&self.client.post(request));
        debug!("Overpass returned {} relation ids", ids.len());
        ids
    }
}

impl<T: Transport> RelationSource for OverpassSource<T> {
    fn relation_ids_by_name(&self, name: &str) -> Vec<RelationId> {
        self.relation_ids(&query::relations_by_name(name))
    }

    fn relation_ids_by_point(&self, point: GeoPoint) -> Vec<RelationId> {
        self.relation_ids(&query::relations_by_point(point))
    }

    fn relation_ids_in_box(&self, bbox: &BoundingBox, features: FeatureMask) -> Vec<RelationId> {
        if features.is_empty() {
            return Vec::new();
        }
        self.relation_ids(&query::regions_in_box(bbox, features))
    }

    fn features_in_relation(&self, id: RelationId, features: FeatureMask) -> Vec<TaggedFeature> {
        if features.is_empty() {
            return Vec::new();
        }
        let found = extract_features(&self.client.post(&query::features_in_relation(id, features)));
        debug!("Overpass returned {} features for relation {}", found.len(), id);
        found
    }
}
