//! Nominatim lookup enricher.
//!
//! See https://nominatim.org/release-docs/latest/api/Lookup/
//!
//! A lookup of `osm_ids=R146656` answers with records like:
//!
//! ```json
//! [{
//!   "osm_type": "relation", "osm_id": 146656,
//!   "lat": "53.4794892", "lon": "-2.2451148",
//!   "addresstype": "city", "name": "Manchester",
//!   "address": { "city": "Manchester", "state": "England", "country": "United Kingdom" }
//! }]
//! ```
//!
//! The value of "addresstype" is the key under "address" holding the native name.

use serde_json::Value;
use tracing::{debug, warn};

use crate::json::{i64_at, parse_document, parse_f64_or_nan, str_at};
use crate::models::{AddressType, GeoPoint, MatchMode, RelationDetail, RelationId};
use crate::source::RelationEnricher;
use crate::transport::Transport;

/// Maximum number of OSM IDs accepted by a single lookup request
pub const LOOKUP_CHUNK_SIZE: usize = 50;

/// Query string for the lookup endpoint: `format=json&osm_ids=R1,R2[&accept-language=xx]`
pub fn format_lookup_request(ids: &[RelationId], language: Option<&str>) -> String {
    let osm_ids = ids
        .iter()
        .map(|id| format!("R{}", id))
        .collect::<Vec<_>>()
        .join(",");

    match language {
        Some(lang) => format!("format=json&osm_ids={}&accept-language={}", osm_ids, lang),
        None => format!("format=json&osm_ids={}", osm_ids),
    }
}

/// Address type reported for a record
fn address_type_of(item: &Value) -> AddressType {
    let reported = match str_at(item, &["addresstype"]) {
        "" => str_at(item, &["address_type"]),
        value => value,
    };
    AddressType::parse(reported)
}

/// Build a detail record, reading the name under `address.<address_type>`
fn parse_detail(item: &Value, address_type: &AddressType) -> RelationDetail {
    RelationDetail {
        id: RelationId(i64_at(item, &["osm_id"])),
        name: str_at(item, &["address", address_type.field_name()]).to_string(),
        country: str_at(item, &["address", "country"]).to_string(),
        center: GeoPoint::new(
            parse_f64_or_nan(str_at(item, &["lat"])),
            parse_f64_or_nan(str_at(item, &["lon"])),
        ),
    }
}

/// Relation enricher backed by the Nominatim lookup API
pub struct NominatimEnricher<T> {
    client: T,
    language: Option<String>,
}

impl<T: Transport> NominatimEnricher<T> {
    pub fn new(client: T) -> Self {
        Self {
            client,
            language: None,
        }
    }

    /// Request names in `language` (sent as `accept-language`)
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.is_empty());
        self
    }

    /// Look up `ids` in chunks, handing each parsed response array to `handler`.
    ///
    /// Chunks whose request fails or whose answer is not an array contribute nothing.
    fn for_each_chunk_response<F>(&self, ids: &[RelationId], mut handler: F)
    where
        F: FnMut(&[Value]),
    {
        for chunk in ids.chunks(LOOKUP_CHUNK_SIZE) {
            let request = format_lookup_request(chunk, self.language.as_deref());
            let response = self.client.get(&request);

            let Some(document) = parse_document(&response, "Nominatim") else {
                continue;
            };
            match document.as_array() {
                Some(items) => handler(items),
                None => warn!("Nominatim lookup answered with a non-array document"),
            }
        }
    }
}

impl<T: Transport> RelationEnricher for NominatimEnricher<T> {
    fn lookup_details(&self, ids: &[RelationId]) -> Vec<RelationDetail> {
        let mut details = Vec::with_capacity(ids.len());
        self.for_each_chunk_response(ids, |items| {
            details.extend(
                items
                    .iter()
                    .map(|item| parse_detail(item, &address_type_of(item))),
            );
        });
        details
    }

    fn lookup_city_details(&self, ids: &[RelationId], mode: MatchMode) -> Vec<RelationDetail> {
        let mut cities: Vec<RelationDetail> = Vec::new();

        // Order matters for Best: 41.1172364,1.2546057 is Tarragona "city" but also
        // Catalonia "state", and the city is wanted. 11.5730391,104.857807 is the
        // Phnom Penh "state" with no city at all, so lower types are still checked.
        self.for_each_chunk_response(ids, |items| {
            for address_type in &AddressType::CITY_PRIORITY {
                let mut type_found = false;

                for item in items.iter().filter(|i| address_type_of(i) == *address_type) {
                    type_found = true;
                    let candidate = parse_detail(item, address_type);

                    if mode == MatchMode::Any && cities.iter().any(|c| c.is_close_to(&candidate)) {
                        debug!(
                            "Skipping {} {} ({}), already represented",
                            address_type, candidate.id, candidate.name
                        );
                        continue;
                    }

                    debug!(
                        "addresstype {}, osm_id {}, lat {}, lon {}",
                        address_type, candidate.id, candidate.center.lat, candidate.center.lon
                    );
                    cities.push(candidate);
                }

                if mode == MatchMode::Best && type_found {
                    break;
                }
            }
        });

        cities
    }
}
