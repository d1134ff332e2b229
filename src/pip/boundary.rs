//! Administrative boundary polygons for the in-memory index.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geo::{BoundingRect, Contains, LineString, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use tracing::info;

use crate::models::{GeoPoint, RelationId, TaggedFeature};

/// A single administrative relation with its outline
#[derive(Debug, Clone)]
pub struct Boundary {
    pub id: RelationId,
    /// OSM tags: {"name": "...", "boundary": "administrative", "admin_level": "8"}
    pub tags: HashMap<String, String>,
    pub geometry: MultiPolygon<f64>,
}

impl Boundary {
    pub fn new(id: RelationId, tags: HashMap<String, String>, geometry: MultiPolygon<f64>) -> Self {
        Self { id, tags, geometry }
    }

    /// Get the bounding box of this boundary as (min_lon, min_lat, max_lon, max_lat)
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.tag("name")
    }

    pub fn admin_level(&self) -> Option<u8> {
        self.tag("admin_level")?.parse().ok()
    }

    pub fn is_administrative(&self) -> bool {
        self.tag("boundary") == Some("administrative")
    }

    /// Relations returned for a point: administrative boundaries or city/town/state places
    pub fn is_point_candidate(&self) -> bool {
        self.is_administrative() || matches!(self.tag("place"), Some("city" | "town" | "state"))
    }

    /// Relations returned by region searches (admin levels 6 to 8)
    pub fn is_region(&self) -> bool {
        self.is_administrative() && matches!(self.admin_level(), Some(6..=8))
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.geometry.contains(&Point::new(point.lon, point.lat))
    }
}

#[derive(Debug, Deserialize)]
struct BoundaryRecord {
    id: i64,
    #[serde(default)]
    tags: HashMap<String, String>,
    /// Outer rings as [lon, lat] pairs
    polygons: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Deserialize)]
struct FeatureRecord {
    id: i64,
    lat: f64,
    lon: f64,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct BoundaryFile {
    boundaries: Vec<BoundaryRecord>,
    #[serde(default)]
    features: Vec<FeatureRecord>,
}

impl From<BoundaryRecord> for Boundary {
    fn from(record: BoundaryRecord) -> Self {
        let polygons = record
            .polygons
            .into_iter()
            .map(|ring| {
                let exterior: LineString<f64> = ring.into_iter().map(|[x, y]| (x, y)).collect();
                Polygon::new(exterior, vec![])
            })
            .collect();
        Boundary::new(RelationId(record.id), record.tags, MultiPolygon::new(polygons))
    }
}

/// Load boundaries and features from a JSON fixture file:
///
/// ```json
/// { "boundaries": [{ "id": 1, "tags": {...}, "polygons": [[[lon, lat], ...]] }],
///   "features":   [{ "id": 5, "lat": 45.9, "lon": 7.6, "tags": {...} }] }
/// ```
pub fn load_boundaries<P: AsRef<Path>>(path: P) -> Result<(Vec<Boundary>, Vec<TaggedFeature>)> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read boundary file {}", path.display()))?;
    let file: BoundaryFile =
        serde_json::from_str(&content).context("Failed to parse boundary file")?;

    let boundaries: Vec<Boundary> = file.boundaries.into_iter().map(Boundary::from).collect();
    let features: Vec<TaggedFeature> = file
        .features
        .into_iter()
        .map(|f| TaggedFeature::new(f.id, GeoPoint::new(f.lat, f.lon), f.tags))
        .collect();

    info!(
        "Loaded {} boundaries and {} features from {}",
        boundaries.len(),
        features.len(),
        path.display()
    );

    Ok((boundaries, features))
}
