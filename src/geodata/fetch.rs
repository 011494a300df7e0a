use std::time::Duration;

use tracing::{info, warn};

use crate::cache::{CacheKey, CacheStore};
use crate::foundation::error::FetchStage;
use crate::foundation::geo::BBox;
use crate::geodata::model::{FeatureLayer, MapData, StreetGraph};
use crate::geodata::provider::{FeatureProvider, StreetGraphProvider, TagQuery};

/// Minimum-interval pacing toward upstream providers.
///
/// A fixed post-call delay per stage, not a token bucket or backoff: it is
/// not adaptive to observed failure and provides no backpressure. Owned
/// here so call sites never encode the policy.
#[derive(Clone, Copy, Debug)]
pub struct RatePolicy {
    /// Delay before each geocoding call.
    pub geocode_delay: Duration,
    /// Delay after a street-graph fetch.
    pub graph_delay: Duration,
    /// Delay after each feature-layer fetch.
    pub feature_delay: Duration,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            geocode_delay: Duration::from_secs(1),
            graph_delay: Duration::from_millis(500),
            feature_delay: Duration::from_millis(300),
        }
    }
}

impl RatePolicy {
    /// No pacing; for tests and pre-warmed caches.
    pub fn none() -> Self {
        Self {
            geocode_delay: Duration::ZERO,
            graph_delay: Duration::ZERO,
            feature_delay: Duration::ZERO,
        }
    }
}

/// Progress reporting contract: the fetch pipeline announces each of its
/// three discrete steps before running it. Reporting only; control flow is
/// unaffected by the observer.
pub trait FetchObserver {
    fn on_step(&mut self, step: FetchStage);
}

/// Observer that reports nowhere.
pub struct NoopObserver;

impl FetchObserver for NoopObserver {
    fn on_step(&mut self, _step: FetchStage) {}
}

/// Fixed three-stage fetch pipeline (graph, water, parks) over one provider,
/// consulting the cache before the network and writing results back.
///
/// Water and parks failures degrade to an absent layer; the street-graph
/// stage degrades the same way here, and its absence is rejected at compose
/// time where a poster actually needs it.
pub struct FetchOrchestrator<P> {
    cache: CacheStore,
    provider: P,
    pacing: RatePolicy,
}

impl<P> FetchOrchestrator<P>
where
    P: StreetGraphProvider + FeatureProvider,
{
    pub fn new(cache: CacheStore, provider: P, pacing: RatePolicy) -> Self {
        Self {
            cache,
            provider,
            pacing,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn pacing(&self) -> &RatePolicy {
        &self.pacing
    }

    /// Run the full pipeline for `bbox`.
    pub fn fetch(&self, bbox: &BBox, observer: &mut dyn FetchObserver) -> MapData {
        observer.on_step(FetchStage::Network);
        let graph = self.graph_stage(bbox);

        observer.on_step(FetchStage::Water);
        let water = self.feature_stage(bbox, FetchStage::Water, "water", &TagQuery::water());

        observer.on_step(FetchStage::Parks);
        let parks = self.feature_stage(bbox, FetchStage::Parks, "parks", &TagQuery::parks());

        MapData { graph, water, parks }
    }

    fn graph_stage(&self, bbox: &BBox) -> Option<StreetGraph> {
        let key = CacheKey::street_graph(bbox);
        if let Some(graph) = self.cache.get::<StreetGraph>(&key) {
            info!("using cached street network");
            return Some(graph);
        }

        match self.provider.street_graph(bbox) {
            Ok(graph) => {
                std::thread::sleep(self.pacing.graph_delay);
                if let Err(e) = self.cache.set(&key, &graph) {
                    warn!(error = %e, "street-graph cache write skipped");
                }
                Some(graph)
            }
            Err(e) => {
                warn!(error = %e, "street-graph fetch failed");
                None
            }
        }
    }

    fn feature_stage(
        &self,
        bbox: &BBox,
        stage: FetchStage,
        name: &str,
        tags: &TagQuery,
    ) -> Option<FeatureLayer> {
        let key = CacheKey::feature_layer(name, bbox, tags);
        if let Some(layer) = self.cache.get::<FeatureLayer>(&key) {
            info!(layer = name, "using cached feature layer");
            return Some(layer);
        }

        match self.provider.features(bbox, tags) {
            Ok(layer) => {
                std::thread::sleep(self.pacing.feature_delay);
                if let Err(e) = self.cache.set(&key, &layer) {
                    warn!(error = %e, layer = name, "feature cache write skipped");
                }
                Some(layer)
            }
            Err(e) => {
                warn!(error = %e, stage = %stage, "feature fetch failed; rendering without it");
                None
            }
        }
    }
}
