//! Place records returned to callers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{RelationDetail, RelationId};

/// Geographic point (lat/lon) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Kind of a tagged feature, derived from its OSM tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Peak,
    Lake,
    Beach,
    Attraction,
    Other,
}

impl FeatureKind {
    /// Classify a feature by its tags
    pub fn from_tags(tags: &HashMap<String, String>) -> Self {
        let tag = |key: &str| tags.get(key).map(String::as_str);

        match (tag("natural"), tag("water"), tag("tourism")) {
            (Some("peak"), _, _) => FeatureKind::Peak,
            (Some("water"), Some("lake"), _) => FeatureKind::Lake,
            (Some("beach"), _, _) => FeatureKind::Beach,
            (_, _, Some("attraction" | "museum" | "viewpoint")) => FeatureKind::Attraction,
            _ => FeatureKind::Other,
        }
    }
}

/// A point of interest inside a place (peak, lake, attraction, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedFeature {
    /// OSM object ID of the feature
    pub id: i64,

    pub kind: FeatureKind,

    /// Node position, or the center of a way/relation
    pub position: GeoPoint,

    /// Raw OSM tags: {"name": "...", "name:en": "...", "ele": "..."}
    pub tags: HashMap<String, String>,
}

impl TaggedFeature {
    pub fn new(id: i64, position: GeoPoint, tags: HashMap<String, String>) -> Self {
        Self {
            id,
            kind: FeatureKind::from_tags(&tags),
            position,
            tags,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }

    /// Elevation in meters parsed from the `ele` tag ("2962", "2962 m", "2962.5")
    pub fn elevation(&self) -> Option<f64> {
        let ele = self.tags.get("ele")?.trim();
        let numeric_end = ele
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
            .unwrap_or(ele.len());
        ele[..numeric_end].parse().ok()
    }
}

/// Place returned by city and region searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// OSM relation ID
    pub id: RelationId,

    /// Name in the native language
    pub name: String,

    /// Country name in the native language
    pub country: String,

    /// Center point of the relation
    pub center: GeoPoint,

    /// Points of interest, only filled when details are requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<TaggedFeature>,
}

impl Place {
    pub fn with_features(mut self, features: Vec<TaggedFeature>) -> Self {
        self.features = features;
        self
    }
}

impl From<RelationDetail> for Place {
    fn from(detail: RelationDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name,
            country: detail.country,
            center: detail.center,
            features: Vec::new(),
        }
    }
}
