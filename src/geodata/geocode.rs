use tracing::{info, warn};

use crate::cache::{CacheKey, CacheStore};
use crate::foundation::error::{FetchStage, PosterError, PosterResult};
use crate::foundation::geo::GeoPoint;
use crate::geodata::fetch::RatePolicy;
use crate::geodata::provider::Geocoder;

/// Resolve a city/country pair to coordinates, cache-first.
///
/// A provider that answers with nothing is fatal ([`PosterError::LocationNotFound`]);
/// there is no fallback location. Cache write failures are logged and
/// swallowed.
pub fn resolve_coordinates(
    cache: &CacheStore,
    geocoder: &dyn Geocoder,
    pacing: &RatePolicy,
    city: &str,
    country: &str,
) -> PosterResult<GeoPoint> {
    let key = CacheKey::coordinates(city, country);
    if let Some(point) = cache.get::<GeoPoint>(&key) {
        info!(%city, %country, "using cached coordinates");
        return Ok(point);
    }

    // Respect the geocoding service's usage policy.
    std::thread::sleep(pacing.geocode_delay);

    let query = format!("{city}, {country}");
    let hit = geocoder
        .geocode(&query)
        .map_err(|e| PosterError::provider(FetchStage::Geocode, e.to_string()))?
        .ok_or_else(|| PosterError::location_not_found(query.clone()))?;

    info!(found = %hit.display_name, lat = hit.point.lat, lon = hit.point.lon, "geocoded");

    if let Err(e) = cache.set(&key, &hit.point) {
        warn!(error = %e, "coordinate cache write skipped");
    }
    Ok(hit.point)
}
