//! Core data models for the geocoding system.

pub mod place;
pub mod preferences;
pub mod relation;

pub use place::{FeatureKind, GeoPoint, Place, TaggedFeature};
pub use preferences::{FeatureMask, RegionPreferences, MIN_PEAK_HEIGHT};
pub use relation::{AddressType, MatchMode, RelationDetail, RelationId};
