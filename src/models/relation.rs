//! Administrative relation types returned by the relation index and lookup service.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::GeoPoint;

/// OSM relation ID of an administrative boundary.
///
/// Globally unique; the same ID can be discovered from several tiles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RelationId(pub i64);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address classification assigned by the lookup service ("addresstype").
///
/// Only the types relevant to city disambiguation get their own variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AddressType {
    City,
    Town,
    State,
    Other(String),
}

impl AddressType {
    /// Probe order used when looking for cities: a city beats a town beats a state.
    pub const CITY_PRIORITY: [AddressType; 3] =
        [AddressType::City, AddressType::Town, AddressType::State];

    pub fn parse(value: &str) -> Self {
        match value {
            "city" => AddressType::City,
            "town" => AddressType::Town,
            "state" => AddressType::State,
            other => AddressType::Other(other.to_string()),
        }
    }

    /// Key of the `address` sub-object holding the name for this type
    pub fn field_name(&self) -> &str {
        match self {
            AddressType::City => "city",
            AddressType::Town => "town",
            AddressType::State => "state",
            AddressType::Other(name) => name,
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Matching strategy for city lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Only the most relevant address type per response (a city over its state);
    /// every record of that winning type is kept
    Best,
    /// Every relevant address type, skipping near-duplicate centroids
    Any,
}

/// Details of a single administrative relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDetail {
    /// OSM relation ID
    pub id: RelationId,

    /// Name in the native language, taken from `address.<addresstype>`
    pub name: String,

    /// Country name in the native language
    pub country: String,

    /// Centroid reported by the lookup service; NaN when upstream text is malformed
    pub center: GeoPoint,
}

impl RelationDetail {
    /// Two relations closer than one degree on both axes describe the same physical place.
    pub fn is_close_to(&self, other: &RelationDetail) -> bool {
        self.center.is_finite()
            && other.center.is_finite()
            && (self.center.lat - other.center.lat).abs() < 1.0
            && (self.center.lon - other.center.lon).abs() < 1.0
    }
}
