use serde::Deserialize;

use crate::foundation::geo::GeoPoint;
use crate::geodata::http::HttpClient;
use crate::geodata::provider::{Geocoded, Geocoder, ProviderError};

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Forward geocoder over the Nominatim search API.
pub struct NominatimGeocoder<C: HttpClient> {
    http: C,
    endpoint: String,
}

impl<C: HttpClient> NominatimGeocoder<C> {
    pub fn new(http: C) -> Self {
        Self::with_endpoint(http, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(http: C, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

impl<C: HttpClient> Geocoder for NominatimGeocoder<C> {
    fn geocode(&self, query: &str) -> Result<Option<Geocoded>, ProviderError> {
        let body = self.http.get(
            &self.endpoint,
            &[("q", query), ("format", "json"), ("limit", "1")],
        )?;
        let hits: Vec<SearchHit> = serde_json::from_slice(&body)
            .map_err(|e| ProviderError::malformed(format!("nominatim response: {e}")))?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let lat: f64 = hit
            .lat
            .parse()
            .map_err(|_| ProviderError::malformed(format!("latitude '{}'", hit.lat)))?;
        let lon: f64 = hit
            .lon
            .parse()
            .map_err(|_| ProviderError::malformed(format!("longitude '{}'", hit.lon)))?;

        Ok(Some(Geocoded {
            point: GeoPoint { lat, lon },
            display_name: hit.display_name,
        }))
    }
}
