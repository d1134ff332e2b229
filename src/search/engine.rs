//! Search engine combining a relation source with a relation enricher.

use tracing::{debug, info};

use super::{RegionSearch, RegionSearchSession, SearchEngine};
use crate::models::{FeatureMask, GeoPoint, MatchMode, Place, RelationId};
use crate::source::{RelationEnricher, RelationSource};

/// Search engine over any relation source and enricher
pub struct GeoSearchEngine<S, E> {
    source: S,
    enricher: E,
}

impl<S: RelationSource, E: RelationEnricher> GeoSearchEngine<S, E> {
    pub fn new(source: S, enricher: E) -> Self {
        Self { source, enricher }
    }

    /// City details for `ids`, with attractions attached when requested
    fn cities(&self, ids: Vec<RelationId>, include_details: bool) -> Vec<Place> {
        if ids.is_empty() {
            return Vec::new();
        }

        self.enricher
            .lookup_city_details(&ids, MatchMode::Any)
            .into_iter()
            .map(|detail| {
                let id = detail.id;
                let place = Place::from(detail);
                if include_details {
                    place.with_features(
                        self.source
                            .features_in_relation(id, FeatureMask::ATTRACTIONS),
                    )
                } else {
                    place
                }
            })
            .collect()
    }
}

impl<S: RelationSource, E: RelationEnricher> SearchEngine for GeoSearchEngine<S, E> {
    fn find_cities_by_name(&self, name: &str, include_details: bool) -> Vec<Place> {
        let ids = self.source.relation_ids_by_name(name);
        debug!("Name '{}' matched {} relations", name, ids.len());

        let places = self.cities(ids, include_details);
        info!("Found {} cities named '{}'", places.len(), name);
        places
    }

    fn find_cities_by_position(&self, point: GeoPoint, include_details: bool) -> Vec<Place> {
        let ids = self.source.relation_ids_by_point(point);
        debug!(
            "Position ({}, {}) is inside {} relations",
            point.lat,
            point.lon,
            ids.len()
        );

        let places = self.cities(ids, include_details);
        info!(
            "Found {} cities at ({}, {})",
            places.len(),
            point.lat,
            point.lon
        );
        places
    }

    fn start_region_search(&self) -> Box<dyn RegionSearch + '_> {
        Box::new(RegionSearchSession::new(&self.source, &self.enricher))
    }
}
