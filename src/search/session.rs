//! Stateful region search over successive tiles.

use hashbrown::HashSet;
use tracing::debug;

use super::RegionSearch;
use crate::geomath::BoundingBox;
use crate::models::{FeatureKind, Place, RegionPreferences, RelationId, TaggedFeature};
use crate::source::{RelationEnricher, RelationSource};

/// Features matching the caller's categories and property filters
pub(crate) fn qualifying_features(
    features: Vec<TaggedFeature>,
    prefs: &RegionPreferences,
) -> Vec<TaggedFeature> {
    let min_peak_height = prefs.min_peak_height();

    features
        .into_iter()
        .filter(|f| prefs.features.includes(f.kind))
        .filter(|f| match (f.kind, min_peak_height) {
            (FeatureKind::Peak, Some(min)) => f.elevation().is_some_and(|ele| ele >= min),
            _ => true,
        })
        .collect()
}

/// Region search session; remembers every relation it has seen.
pub struct RegionSearchSession<'a> {
    source: &'a dyn RelationSource,
    enricher: &'a dyn RelationEnricher,
    processed: HashSet<RelationId>,
}

impl<'a> RegionSearchSession<'a> {
    pub fn new(source: &'a dyn RelationSource, enricher: &'a dyn RelationEnricher) -> Self {
        Self {
            source,
            enricher,
            processed: HashSet::new(),
        }
    }

    /// Number of distinct relations seen so far
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

impl RegionSearch for RegionSearchSession<'_> {
    fn advance(&mut self, bbox: &BoundingBox, prefs: &RegionPreferences) -> Vec<Place> {
        let found = self.source.relation_ids_in_box(bbox, prefs.features);

        // insert() is false for IDs seen on an earlier tile or twice in this answer
        let new_ids: Vec<RelationId> = found
            .into_iter()
            .filter(|id| self.processed.insert(*id))
            .collect();

        debug!(
            "Tile {}: {} new relations, {} processed in total",
            bbox.to_overpass(),
            new_ids.len(),
            self.processed.len()
        );

        if new_ids.is_empty() {
            return Vec::new();
        }

        self.enricher
            .lookup_details(&new_ids)
            .into_iter()
            .filter_map(|detail| {
                let features = qualifying_features(
                    self.source.features_in_relation(detail.id, prefs.features),
                    prefs,
                );
                if features.is_empty() {
                    debug!("Dropping region {} without qualifying features", detail.id);
                    return None;
                }
                Some(Place::from(detail).with_features(features))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geomath::BoundingBox;
    use crate::models::{
        FeatureMask, GeoPoint, MatchMode, RelationDetail, MIN_PEAK_HEIGHT,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers box queries from a fixed table of (box, ids)
    struct TileSource {
        tiles: Vec<(BoundingBox, Vec<i64>)>,
        features: HashMap<i64, Vec<TaggedFeature>>,
    }

    impl RelationSource for TileSource {
        fn relation_ids_by_name(&self, _name: &str) -> Vec<RelationId> {
            Vec::new()
        }

        fn relation_ids_by_point(&self, _point: GeoPoint) -> Vec<RelationId> {
            Vec::new()
        }

        fn relation_ids_in_box(&self, bbox: &BoundingBox, _features: FeatureMask) -> Vec<RelationId> {
            self.tiles
                .iter()
                .find(|(tile, _)| tile == bbox)
                .map(|(_, ids)| ids.iter().copied().map(RelationId).collect())
                .unwrap_or_default()
        }

        fn features_in_relation(&self, id: RelationId, _features: FeatureMask) -> Vec<TaggedFeature> {
            self.features.get(&id.0).cloned().unwrap_or_default()
        }
    }

    /// Names every relation "Region <id>" and records each lookup
    #[derive(Default)]
    struct RecordingEnricher {
        lookups: Mutex<Vec<Vec<RelationId>>>,
    }

    impl RelationEnricher for RecordingEnricher {
        fn lookup_details(&self, ids: &[RelationId]) -> Vec<RelationDetail> {
            self.lookups.lock().unwrap().push(ids.to_vec());
            ids.iter()
                .map(|id| RelationDetail {
                    id: *id,
                    name: format!("Region {}", id),
                    country: "Schweiz".to_string(),
                    center: GeoPoint::new(46.0, 7.5),
                })
                .collect()
        }

        fn lookup_city_details(&self, _ids: &[RelationId], _mode: MatchMode) -> Vec<RelationDetail> {
            Vec::new()
        }
    }

    fn peak(id: i64, ele: &str) -> TaggedFeature {
        let tags = [("natural", "peak"), ("ele", ele)]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TaggedFeature::new(id, GeoPoint::new(46.0, 7.6), tags)
    }

    fn tiles() -> (BoundingBox, BoundingBox, BoundingBox) {
        (
            BoundingBox::new(45.0, 7.0, 46.0, 8.0),
            BoundingBox::new(45.0, 8.0, 46.0, 9.0),
            BoundingBox::new(46.0, 7.0, 47.0, 8.0),
        )
    }

    fn create_source() -> TileSource {
        let (a, b, c) = tiles();
        let features = [1, 2, 3, 4, 5]
            .into_iter()
            .map(|id| (id, vec![peak(id * 10, "3000")]))
            .collect();
        TileSource {
            tiles: vec![(a, vec![1, 2, 3]), (b, vec![3, 4]), (c, vec![2, 4, 5, 5])],
            features,
        }
    }

    fn peaks_over(min: &str) -> RegionPreferences {
        RegionPreferences::new(FeatureMask::PEAKS).with_property(MIN_PEAK_HEIGHT, min)
    }

    fn ids(places: &[Place]) -> Vec<i64> {
        places.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn test_overlapping_tiles_never_repeat_regions() {
        let source = create_source();
        let enricher = RecordingEnricher::default();
        let mut session = RegionSearchSession::new(&source, &enricher);
        let prefs = peaks_over("1000");
        let (a, b, c) = tiles();

        assert_eq!(ids(&session.advance(&a, &prefs)), vec![1, 2, 3]);
        assert_eq!(ids(&session.advance(&b, &prefs)), vec![4]);
        assert_eq!(ids(&session.advance(&c, &prefs)), vec![5]);
        assert!(session.advance(&a, &prefs).is_empty());
        assert_eq!(session.processed_count(), 5);

        // Details are only looked up for unseen relations
        let lookups = enricher.lookups.lock().unwrap();
        assert_eq!(lookups.len(), 3);
        assert_eq!(lookups[2], vec![RelationId(5)]);
    }

    #[test]
    fn test_sessions_are_independent() {
        let source = create_source();
        let enricher = RecordingEnricher::default();
        let prefs = peaks_over("1000");
        let (a, _, _) = tiles();

        let mut first = RegionSearchSession::new(&source, &enricher);
        let mut second = RegionSearchSession::new(&source, &enricher);
        assert_eq!(first.advance(&a, &prefs).len(), 3);
        assert_eq!(second.advance(&a, &prefs).len(), 3);
    }

    #[test]
    fn test_regions_without_qualifying_peaks_are_dropped_but_remembered() {
        let source = create_source();
        let enricher = RecordingEnricher::default();
        let mut session = RegionSearchSession::new(&source, &enricher);
        let (a, _, c) = tiles();

        // Every peak is 3000 m
        assert!(session.advance(&a, &peaks_over("4000")).is_empty());
        assert_eq!(ids(&session.advance(&c, &peaks_over("1000"))), vec![4, 5]);
    }

    #[test]
    fn test_attached_features_are_filtered() {
        let source = create_source();
        let enricher = RecordingEnricher::default();
        let mut session = RegionSearchSession::new(&source, &enricher);
        let (a, _, _) = tiles();

        let places = session.advance(&a, &peaks_over("2000"));
        assert_eq!(places[0].name, "Region 1");
        assert_eq!(places[0].features.len(), 1);
        assert_eq!(places[0].features[0].id, 10);
    }

    #[test]
    fn test_qualifying_features() {
        let mut lake_tags = HashMap::new();
        lake_tags.insert("natural".to_string(), "water".to_string());
        lake_tags.insert("water".to_string(), "lake".to_string());
        let lake = TaggedFeature::new(7, GeoPoint::new(46.4, 6.5), lake_tags);

        let features = vec![peak(1, "4478"), peak(2, "900 m"), peak(3, "unknown"), lake];

        let kept = qualifying_features(features.clone(), &peaks_over("1000"));
        assert_eq!(kept.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1]);

        let prefs = RegionPreferences::new(FeatureMask::PEAKS | FeatureMask::LAKES)
            .with_property(MIN_PEAK_HEIGHT, "800");
        let kept = qualifying_features(features.clone(), &prefs);
        assert_eq!(kept.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 2, 7]);

        // Unparsable threshold admits no peaks
        let kept = qualifying_features(features, &peaks_over("high"));
        assert!(kept.is_empty());
    }
}
