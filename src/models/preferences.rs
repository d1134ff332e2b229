//! Caller preferences for region searches.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::BitOr;

use super::FeatureKind;

/// Property key holding the minimum peak height in meters.
pub const MIN_PEAK_HEIGHT: &str = "minPeakHeight";

/// Bitmask of the feature categories a caller is interested in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMask(pub u32);

impl FeatureMask {
    pub const UNSPECIFIED: FeatureMask = FeatureMask(0);
    pub const PEAKS: FeatureMask = FeatureMask(1);
    pub const LAKES: FeatureMask = FeatureMask(1 << 1);
    pub const BEACHES: FeatureMask = FeatureMask(1 << 2);
    pub const ATTRACTIONS: FeatureMask = FeatureMask(1 << 3);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: FeatureMask) -> bool {
        !other.is_empty() && self.0 & other.0 == other.0
    }

    /// Feature kinds selected by this mask, in bit order
    pub fn kinds(self) -> Vec<FeatureKind> {
        [
            (FeatureMask::PEAKS, FeatureKind::Peak),
            (FeatureMask::LAKES, FeatureKind::Lake),
            (FeatureMask::BEACHES, FeatureKind::Beach),
            (FeatureMask::ATTRACTIONS, FeatureKind::Attraction),
        ]
        .into_iter()
        .filter(|(bit, _)| self.contains(*bit))
        .map(|(_, kind)| kind)
        .collect()
    }

    pub fn includes(self, kind: FeatureKind) -> bool {
        self.kinds().contains(&kind)
    }
}

impl BitOr for FeatureMask {
    type Output = FeatureMask;

    fn bitor(self, rhs: FeatureMask) -> FeatureMask {
        FeatureMask(self.0 | rhs.0)
    }
}

/// Region search preferences. Immutable per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionPreferences {
    /// Which feature categories to look for
    pub features: FeatureMask,

    /// Extra filter properties, e.g. {"minPeakHeight": "1000"}
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl RegionPreferences {
    pub fn new(features: FeatureMask) -> Self {
        Self {
            features,
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<String>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Minimum peak height; an unparsable value admits no peaks.
    pub fn min_peak_height(&self) -> Option<f64> {
        self.properties
            .get(MIN_PEAK_HEIGHT)
            .map(|v| v.trim().parse().unwrap_or(f64::INFINITY))
    }
}
