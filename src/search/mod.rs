//! Search orchestration: city lookups and incremental region searches.
//!
//! A [`SearchEngine`] combines a relation source with a relation enricher. Region
//! searches run over many tiles through one [`RegionSearch`] session, which never
//! returns the same relation twice.

mod engine;
mod session;

pub use engine::GeoSearchEngine;
pub use session::RegionSearchSession;

use tracing::info;

use crate::geomath::{create_bounding_boxes, BoundingBox};
use crate::models::{GeoPoint, Place, RegionPreferences};

/// Geocoding capability exposed to the service layer
pub trait SearchEngine: Send + Sync {
    /// Cities, towns or states whose name equals `name`
    fn find_cities_by_name(&self, name: &str, include_details: bool) -> Vec<Place>;

    /// Cities, towns or states containing `point`
    fn find_cities_by_position(&self, point: GeoPoint, include_details: bool) -> Vec<Place>;

    /// Begin a region search with an empty set of processed relations
    fn start_region_search(&self) -> Box<dyn RegionSearch + '_>;
}

/// One incremental region search over a sequence of boxes
pub trait RegionSearch {
    /// Regions in `bbox` matching `prefs` that no earlier call on this session returned
    fn advance(&mut self, bbox: &BoundingBox, prefs: &RegionPreferences) -> Vec<Place>;
}

/// Search regions around `center`, one tile at a time on a single session.
pub fn search_regions(
    engine: &dyn SearchEngine,
    center: GeoPoint,
    range_meters: u32,
    prefs: &RegionPreferences,
    max_width: f64,
    max_height: f64,
) -> Vec<Place> {
    let tiles = create_bounding_boxes(center, range_meters, max_width, max_height);
    info!(
        "Searching regions within {} m of ({}, {}) over {} tiles",
        range_meters,
        center.lat,
        center.lon,
        tiles.len()
    );

    let mut session = engine.start_region_search();
    tiles
        .iter()
        .flat_map(|tile| session.advance(tile, prefs))
        .collect()
}
