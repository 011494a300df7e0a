use crate::foundation::geo::{BBox, GeoPoint};
use crate::geodata::model::{FeatureLayer, StreetGraph};

/// Upstream provider failure, converted at the orchestrator boundary into
/// per-stage degradation or a fatal error depending on the stage.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Ordered OSM key/value pairs selecting one feature layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagQuery {
    pairs: Vec<(&'static str, &'static str)>,
}

impl TagQuery {
    /// Water regions: lakes, rivers, riverbanks.
    pub fn water() -> Self {
        Self {
            pairs: vec![("natural", "water"), ("waterway", "riverbank")],
        }
    }

    /// Parks and green space.
    pub fn parks() -> Self {
        Self {
            pairs: vec![("leisure", "park"), ("landuse", "grass")],
        }
    }

    pub fn pairs(&self) -> &[(&'static str, &'static str)] {
        &self.pairs
    }
}

/// Source of street-network graphs.
pub trait StreetGraphProvider {
    fn street_graph(&self, bbox: &BBox) -> Result<StreetGraph, ProviderError>;
}

/// Source of polygon feature layers.
pub trait FeatureProvider {
    fn features(&self, bbox: &BBox, tags: &TagQuery) -> Result<FeatureLayer, ProviderError>;
}

/// A geocoding result: the resolved point plus the display name the
/// provider attached to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Geocoded {
    pub point: GeoPoint,
    pub display_name: String,
}

/// Forward geocoder. "Nothing found" is the expected `Ok(None)` case, not
/// an error; `Err` is reserved for transport or malformed-response failures.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> Result<Option<Geocoded>, ProviderError>;
}
