//! Locus - geocoding of place names and coordinates into administrative entities
//!
//! Combines an Overpass spatial-relation index with Nominatim relation lookups and
//! reconciles their answers into place records. This library holds the search core
//! shared by the `server` and `lookup` binaries.

pub mod config;
pub mod error;
pub mod geomath;
pub mod json;
pub mod models;
pub mod nominatim;
pub mod overpass;
pub mod pip;
pub mod search;
pub mod service;
pub mod source;
pub mod transport;

pub use error::{Error, Result};
pub use geomath::BoundingBox;
pub use models::{
    FeatureKind, FeatureMask, GeoPoint, MatchMode, Place, RegionPreferences, RelationDetail,
    RelationId, TaggedFeature,
};
pub use search::{GeoSearchEngine, RegionSearch, RegionSearchSession, SearchEngine};

/// User agent sent with every outbound request.
pub const USER_AGENT: &str = concat!("locus/", env!("CARGO_PKG_VERSION"));
