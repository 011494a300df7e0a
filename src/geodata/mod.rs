pub mod fetch;
pub mod geocode;
pub mod http;
pub mod model;
pub mod nominatim;
pub mod overpass;
pub mod provider;

pub use fetch::{FetchObserver, FetchOrchestrator, NoopObserver, RatePolicy};
pub use model::{FeatureLayer, MapData, RoadSegment, StreetGraph, TagValue};
pub use provider::{FeatureProvider, Geocoded, Geocoder, ProviderError, StreetGraphProvider, TagQuery};
