//! Request validation and dispatch to the search engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::geomath::{is_valid_latitude, is_valid_longitude};
use crate::models::{FeatureMask, GeoPoint, Place, RegionPreferences, MIN_PEAK_HEIGHT};
use crate::nominatim::NominatimEnricher;
use crate::overpass::OverpassSource;
use crate::pip::BoundaryIndex;
use crate::search::{search_regions, GeoSearchEngine, SearchEngine};
use crate::transport::WebClient;

/// Largest accepted search radius
pub const MAX_DISTANCE_KM: u32 = 1000;

/// Find cities either at a position or by name; position wins when both are set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CitiesRequest {
    #[serde(default)]
    pub position: Option<GeoPoint>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub include_details: bool,
}

/// Find regions with given features around a position.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegionsRequest {
    #[serde(default)]
    pub position: Option<GeoPoint>,
    /// Half width (and height) of the searched box
    #[serde(default)]
    pub distance_km: u32,
    #[serde(default)]
    pub prefs: Option<RegionPreferences>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Either position or name must be set in CitiesRequest")]
    MissingCitiesQuery,

    #[error("Position must be set in RegionsRequest")]
    MissingPosition,

    #[error("Preferences must be set in RegionsRequest")]
    MissingPreferences,

    #[error("Wrong latitude in {0}")]
    InvalidLatitude(&'static str),

    #[error("Wrong longitude in {0}")]
    InvalidLongitude(&'static str),

    #[error("distance_km is out-of-range")]
    DistanceOutOfRange,

    #[error("At least one feature must be specified")]
    NoFeatures,

    #[error("minPeakHeight is required for Peaks feature")]
    MissingMinPeakHeight,
}

fn validate_position(point: &GeoPoint, request: &'static str) -> Result<(), ValidationError> {
    if !is_valid_latitude(point.lat) {
        return Err(ValidationError::InvalidLatitude(request));
    }
    if !is_valid_longitude(point.lon) {
        return Err(ValidationError::InvalidLongitude(request));
    }
    Ok(())
}

pub fn validate_cities_request(request: &CitiesRequest) -> Result<(), ValidationError> {
    match (&request.position, &request.name) {
        (None, None) => Err(ValidationError::MissingCitiesQuery),
        (Some(position), _) => validate_position(position, "CitiesRequest"),
        (None, Some(_)) => Ok(()),
    }
}

pub fn validate_regions_request(request: &RegionsRequest) -> Result<(), ValidationError> {
    let position = request.position.ok_or(ValidationError::MissingPosition)?;
    let prefs = request
        .prefs
        .as_ref()
        .ok_or(ValidationError::MissingPreferences)?;

    validate_position(&position, "RegionsRequest")?;

    if request.distance_km > MAX_DISTANCE_KM {
        return Err(ValidationError::DistanceOutOfRange);
    }
    if prefs.features.is_empty() {
        return Err(ValidationError::NoFeatures);
    }
    if prefs.features.contains(FeatureMask::PEAKS) && !prefs.properties.contains_key(MIN_PEAK_HEIGHT) {
        return Err(ValidationError::MissingMinPeakHeight);
    }

    Ok(())
}

/// Validated entry point shared by the HTTP server and the CLI
#[derive(Clone)]
pub struct GeoService {
    engine: Arc<dyn SearchEngine>,
    max_box_width: f64,
    max_box_height: f64,
}

impl GeoService {
    pub fn new(engine: Arc<dyn SearchEngine>, max_box_width: f64, max_box_height: f64) -> Self {
        Self {
            engine,
            max_box_width,
            max_box_height,
        }
    }

    /// Build the engine described by the configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let nominatim = WebClient::new(&config.endpoints.nominatim, &config.http)?;
        let enricher = NominatimEnricher::new(nominatim).with_language(config.search.language.clone());

        let engine: Arc<dyn SearchEngine> = match &config.endpoints.boundaries {
            Some(path) => {
                info!("Answering relation queries from {}", path.display());
                Arc::new(GeoSearchEngine::new(BoundaryIndex::load_from_file(path)?, enricher))
            }
            None => {
                let overpass = WebClient::new(&config.endpoints.overpass, &config.http)?;
                info!("Answering relation queries from {}", overpass.url());
                Arc::new(GeoSearchEngine::new(OverpassSource::new(overpass), enricher))
            }
        };

        Ok(Self::new(
            engine,
            config.search.max_box_width,
            config.search.max_box_height,
        ))
    }

    pub fn engine(&self) -> &dyn SearchEngine {
        self.engine.as_ref()
    }

    pub fn get_cities(&self, request: &CitiesRequest) -> Result<Vec<Place>, ValidationError> {
        validate_cities_request(request).inspect_err(|e| error!("Bad cities request: {}", e))?;

        let cities = match (&request.position, &request.name) {
            (Some(position), _) => self
                .engine
                .find_cities_by_position(*position, request.include_details),
            (None, Some(name)) => self.engine.find_cities_by_name(name, request.include_details),
            (None, None) => Vec::new(),
        };
        Ok(cities)
    }

    pub fn get_regions(&self, request: &RegionsRequest) -> Result<Vec<Place>, ValidationError> {
        validate_regions_request(request).inspect_err(|e| error!("Bad regions request: {}", e))?;

        let (Some(position), Some(prefs)) = (request.position, &request.prefs) else {
            return Ok(Vec::new());
        };

        Ok(search_regions(
            self.engine.as_ref(),
            position,
            request.distance_km.saturating_mul(1000),
            prefs,
            self.max_box_width,
            self.max_box_height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geomath::BoundingBox;
    use crate::models::RelationId;
    use crate::search::RegionSearch;
    use std::sync::Mutex;

    fn place(id: i64, name: &str) -> Place {
        Place {
            id: RelationId(id),
            name: name.to_string(),
            country: "Deutschland".to_string(),
            center: GeoPoint::new(48.1, 11.6),
            features: Vec::new(),
        }
    }

    /// Records calls and returns one place per call
    #[derive(Default)]
    struct FakeEngine {
        calls: Mutex<Vec<String>>,
    }

    struct FakeSession<'a> {
        engine: &'a FakeEngine,
        tiles: usize,
    }

    impl RegionSearch for FakeSession<'_> {
        fn advance(&mut self, bbox: &BoundingBox, _prefs: &RegionPreferences) -> Vec<Place> {
            self.tiles += 1;
            self.engine
                .calls
                .lock()
                .unwrap()
                .push(format!("advance {}", bbox.to_overpass()));
            vec![place(self.tiles as i64, "Region")]
        }
    }

    impl SearchEngine for FakeEngine {
        fn find_cities_by_name(&self, name: &str, include_details: bool) -> Vec<Place> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("name {} {}", name, include_details));
            vec![place(62428, name)]
        }

        fn find_cities_by_position(&self, point: GeoPoint, include_details: bool) -> Vec<Place> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("position {},{} {}", point.lat, point.lon, include_details));
            vec![place(62428, "München")]
        }

        fn start_region_search(&self) -> Box<dyn RegionSearch + '_> {
            Box::new(FakeSession {
                engine: self,
                tiles: 0,
            })
        }
    }

    fn peaks() -> RegionPreferences {
        RegionPreferences::new(FeatureMask::PEAKS).with_property(MIN_PEAK_HEIGHT, "1500")
    }

    fn regions_request(lat: f64, lon: f64, distance_km: u32, prefs: Option<RegionPreferences>) -> RegionsRequest {
        RegionsRequest {
            position: Some(GeoPoint::new(lat, lon)),
            distance_km,
            prefs,
        }
    }

    #[test]
    fn test_cities_validation() {
        assert_eq!(
            validate_cities_request(&CitiesRequest::default()),
            Err(ValidationError::MissingCitiesQuery)
        );

        let bad_lat = CitiesRequest {
            position: Some(GeoPoint::new(91.0, 0.0)),
            ..Default::default()
        };
        assert_eq!(
            validate_cities_request(&bad_lat).unwrap_err().to_string(),
            "Wrong latitude in CitiesRequest"
        );

        let bad_lon = CitiesRequest {
            position: Some(GeoPoint::new(0.0, -180.5)),
            name: Some("Berlin".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_cities_request(&bad_lon),
            Err(ValidationError::InvalidLongitude("CitiesRequest"))
        );

        let by_name = CitiesRequest {
            name: Some("Berlin".to_string()),
            ..Default::default()
        };
        assert!(validate_cities_request(&by_name).is_ok());
    }

    #[test]
    fn test_regions_validation() {
        let missing_position = RegionsRequest {
            prefs: Some(peaks()),
            ..Default::default()
        };
        assert_eq!(
            validate_regions_request(&missing_position),
            Err(ValidationError::MissingPosition)
        );
        assert_eq!(
            validate_regions_request(&regions_request(47.0, 11.0, 10, None)),
            Err(ValidationError::MissingPreferences)
        );
        assert_eq!(
            validate_regions_request(&regions_request(-90.5, 11.0, 10, Some(peaks()))),
            Err(ValidationError::InvalidLatitude("RegionsRequest"))
        );
        assert_eq!(
            validate_regions_request(&regions_request(47.0, 11.0, 1001, Some(peaks())))
                .unwrap_err()
                .to_string(),
            "distance_km is out-of-range"
        );
        assert_eq!(
            validate_regions_request(&regions_request(
                47.0,
                11.0,
                10,
                Some(RegionPreferences::new(FeatureMask::UNSPECIFIED))
            )),
            Err(ValidationError::NoFeatures)
        );
        assert_eq!(
            validate_regions_request(&regions_request(
                47.0,
                11.0,
                10,
                Some(RegionPreferences::new(FeatureMask::PEAKS | FeatureMask::LAKES))
            )),
            Err(ValidationError::MissingMinPeakHeight)
        );

        assert!(validate_regions_request(&regions_request(47.0, 11.0, 1000, Some(peaks()))).is_ok());
        assert!(validate_regions_request(&regions_request(
            47.0,
            11.0,
            0,
            Some(RegionPreferences::new(FeatureMask::LAKES))
        ))
        .is_ok());
    }

    #[test]
    fn test_position_takes_precedence_over_name() {
        let engine = Arc::new(FakeEngine::default());
        let service = GeoService::new(engine.clone(), 1.0, 1.0);

        let request = CitiesRequest {
            position: Some(GeoPoint::new(48.137, 11.575)),
            name: Some("Berlin".to_string()),
            include_details: true,
        };
        let cities = service.get_cities(&request).unwrap();
        assert_eq!(cities[0].name, "München");
        assert_eq!(
            *engine.calls.lock().unwrap(),
            vec!["position 48.137,11.575 true".to_string()]
        );
    }

    #[test]
    fn test_invalid_request_never_reaches_engine() {
        let engine = Arc::new(FakeEngine::default());
        let service = GeoService::new(engine.clone(), 1.0, 1.0);

        assert!(service.get_cities(&CitiesRequest::default()).is_err());
        assert!(service
            .get_regions(&regions_request(47.0, 11.0, 2000, Some(peaks())))
            .is_err());
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_regions_are_tiled_on_one_session() {
        let engine = Arc::new(FakeEngine::default());
        let service = GeoService::new(engine.clone(), 0.25, 0.25);

        let regions = service
            .get_regions(&regions_request(47.0, 11.0, 50, Some(peaks())))
            .unwrap();

        // ~0.9 x 1.3 degrees split into quarter-degree tiles
        let calls = engine.calls.lock().unwrap();
        assert!(calls.len() > 1);
        assert_eq!(regions.len(), calls.len());
        assert!(calls.iter().all(|c| c.starts_with("advance ")));

        // The fake numbers places by tile within one session
        let ids: Vec<i64> = regions.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, (1..=calls.len() as i64).collect::<Vec<_>>());
    }

    fn config_with_boundaries(path: &std::path::Path) -> Config {
        toml::from_str(&format!(
            r#"
            [endpoints]
            overpass = "https://overpass-api.de/api/interpreter"
            nominatim = "https://nominatim.openstreetmap.org/lookup"
            boundaries = "{}"
            "#,
            path.display()
        ))
        .unwrap()
    }

    #[test]
    fn test_from_config_with_boundary_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"boundaries": [{{"id": 51701, "tags": {{"boundary": "administrative", "name": "Schweiz"}},
                "polygons": [[[5.9, 45.8], [10.5, 45.8], [10.5, 47.8], [5.9, 47.8], [5.9, 45.8]]]}}]}}"#
        )
        .unwrap();

        let service = GeoService::from_config(&config_with_boundaries(file.path())).unwrap();
        assert!(service
            .get_regions(&regions_request(46.8, 8.2, 10, Some(RegionPreferences::new(FeatureMask::LAKES))))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_from_config_missing_boundary_file() {
        let config = config_with_boundaries(std::path::Path::new("/nonexistent/boundaries.json"));
        let err = GeoService::from_config(&config).err().unwrap();
        assert!(matches!(err, crate::Error::Other(_)), "{}", err);
    }

    #[test]
    fn test_requests_deserialize_with_defaults() {
        let request: RegionsRequest = serde_json::from_str(
            r#"{"position": {"lat": 46.5, "lon": 7.9}, "distance_km": 20,
                "prefs": {"features": 3, "properties": {"minPeakHeight": "3000"}}}"#,
        )
        .unwrap();
        assert!(validate_regions_request(&request).is_ok());
        assert!(request.prefs.unwrap().features.contains(FeatureMask::LAKES));

        let request: CitiesRequest = serde_json::from_str(r#"{"name": "Zürich"}"#).unwrap();
        assert!(!request.include_details);
        assert_eq!(request.position, None);
    }
}
