//! WFS feature loading through the response cache.

use std::sync::{Arc, PoisonError, RwLock};

use ogc_common::{body_text, FeatureCollection, LayerSource, OgcError, OgcResult, ServiceType};
use ogc_protocol::{decode_feature_collection, GetFeatureParams};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheMode, ResponseCache};
use crate::config::ClientConfig;
use crate::events::{LayerEvent, EVENT_CHANNEL_CAPACITY};

/// Loads vector features for WFS sources.
pub struct FeatureClient {
    cache: Arc<ResponseCache>,
    wfs_version: String,
    events: broadcast::Sender<LayerEvent>,
    /// Property names of the first feature of the last successful load
    first_properties: RwLock<Option<Vec<String>>>,
}

impl FeatureClient {
    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self::from_config(cache, &ClientConfig::default())
    }

    pub fn from_config(cache: Arc<ResponseCache>, config: &ClientConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            cache,
            wfs_version: config.wfs_version.clone(),
            events,
            first_properties: RwLock::new(None),
        }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn wfs_version(&self) -> &str {
        &self.wfs_version
    }

    /// Receive lifecycle events for every load issued through this client.
    pub fn subscribe(&self) -> broadcast::Receiver<LayerEvent> {
        self.events.subscribe()
    }

    /// Load the features of `source`, served from the cache when present.
    pub async fn load_features(
        &self,
        source: &LayerSource,
        extra: &[(String, String)],
    ) -> OgcResult<FeatureCollection> {
        self.load_features_with(source, extra, CacheMode::Default)
            .await
    }

    /// Load with an explicit cache mode.
    ///
    /// Emits `Loading`, then `Loaded` or `Failed`.
    #[instrument(skip(self, source, extra), fields(layer = %source.query_layer_name, url = %source.url))]
    pub async fn load_features_with(
        &self,
        source: &LayerSource,
        extra: &[(String, String)],
        mode: CacheMode,
    ) -> OgcResult<FeatureCollection> {
        let layer = source.query_layer_name.clone();
        self.emit(LayerEvent::Loading {
            layer: layer.clone(),
        });

        let result = self.fetch_features(source, extra, mode).await;
        match &result {
            Ok(features) => {
                info!(count = features.len(), "Features loaded");
                self.remember(features);
                self.emit(LayerEvent::Loaded {
                    layer,
                    count: features.len(),
                });
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Feature load failed");
                self.emit(LayerEvent::Failed {
                    layer,
                    error: e.clone(),
                });
            }
        }
        result
    }

    /// Property names of the first feature of the last successful load.
    ///
    /// Other features may carry different properties.
    pub fn get_property_names(&self) -> OgcResult<Vec<String>> {
        self.first_properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(OgcError::EmptyCollection)
    }

    pub(crate) fn emit(&self, event: LayerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    async fn fetch_features(
        &self,
        source: &LayerSource,
        extra: &[(String, String)],
        mode: CacheMode,
    ) -> OgcResult<FeatureCollection> {
        if source.service_type != ServiceType::Wfs {
            return Err(OgcError::UnsupportedService(source.service_type));
        }

        let params = GetFeatureParams::new(&self.wfs_version, &source.query_layer_name)
            .with_extra(extra)
            .to_query();
        let body = self.cache.fetch_with(&source.url, &params, mode).await?;
        debug!(bytes = body.len(), "Decoding feature collection");

        decode_feature_collection(body_text(&body)?)
    }

    fn remember(&self, features: &FeatureCollection) {
        let names = features
            .first()
            .map(|f| f.properties.keys().cloned().collect());
        *self
            .first_properties
            .write()
            .unwrap_or_else(PoisonError::into_inner) = names;
    }
}
