//! Overpass QL query templates.

use crate::geomath::BoundingBox;
use crate::models::{FeatureKind, FeatureMask, GeoPoint, RelationId};

/// Admin levels treated as regions (county, municipality, city)
const REGION_ADMIN_LEVELS: &str = "^(6|7|8)$";

/// Element type and tag filter selecting one feature kind
fn selector(kind: FeatureKind) -> Option<(&'static str, &'static str)> {
    match kind {
        FeatureKind::Peak => Some(("node", r#"["natural"="peak"]["ele"]"#)),
        FeatureKind::Lake => Some(("nwr", r#"["natural"="water"]["water"="lake"]"#)),
        FeatureKind::Beach => Some(("nwr", r#"["natural"="beach"]"#)),
        FeatureKind::Attraction => Some((
            "node",
            r#"["tourism"~"^(attraction|museum|viewpoint)$"]"#,
        )),
        FeatureKind::Other => None,
    }
}

/// One statement per selected feature kind, each restricted by `scope` (e.g. "(area.region)")
fn feature_statements(features: FeatureMask, scope: &str) -> String {
    features
        .kinds()
        .into_iter()
        .filter_map(selector)
        .map(|(element, filter)| format!("{}{}{};", element, scope, filter))
        .collect()
}

/// Escape a value for use inside a double-quoted Overpass string
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Administrative relations whose name equals `name`
pub fn relations_by_name(name: &str) -> String {
    format!(
        concat!(
            "[out:json];",
            "rel[\"name\"=\"{}\"][\"boundary\"=\"administrative\"];",
            "out ids;",
        ),
        escape(name)
    )
}

/// Relations outlining the areas that contain `point`
pub fn relations_by_point(point: GeoPoint) -> String {
    format!(
        concat!(
            "[out:json];",
            // Areas containing the point
            "is_in({},{})->.areas;",
            "(",
            "rel(pivot.areas)[\"boundary\"=\"administrative\"];",
            "rel(pivot.areas)[\"place\"~\"^(city|town|state)$\"];",
            ");",
            "out ids;",
        ),
        point.lat, point.lon
    )
}

/// Region relations containing features of `features` inside `bbox`
pub fn regions_in_box(bbox: &BoundingBox, features: FeatureMask) -> String {
    format!(
        concat!(
            "[out:json][bbox:{}];",
            "({})->.features;",
            // Ways have no position of their own; use their nodes
            "(.features;.features>;)->.members;",
            "node.members->.pts;",
            ".pts is_in->.areas;",
            "rel(pivot.areas)[\"boundary\"=\"administrative\"][\"admin_level\"~\"{}\"];",
            "out ids;",
        ),
        bbox.to_overpass(),
        feature_statements(features, ""),
        REGION_ADMIN_LEVELS
    )
}

/// Features of `features` inside relation `id`, with centers for ways
pub fn features_in_relation(id: RelationId, features: FeatureMask) -> String {
    format!(
        concat!(
            "[out:json];",
            "rel({});",
            "map_to_area->.region;",
            "({});",
            "out center tags;",
        ),
        id,
        feature_statements(features, "(area.region)")
    )
}
