//! One application session: a cache generation and the clients sharing it.

use std::sync::Arc;

use ogc_common::{LayerSource, OgcResult, Transport};
use tracing::info;

use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::feature_info::FeatureInfoClient;
use crate::features::FeatureClient;
use crate::layer::FilterableLayer;
use crate::legends::LegendCatalog;
use crate::transport::ReqwestTransport;

/// Wires the shared cache into every client.
///
/// Dropping the session drops its cache.
pub struct Session {
    config: ClientConfig,
    cache: Arc<ResponseCache>,
    features: Arc<FeatureClient>,
    feature_info: FeatureInfoClient,
}

impl Session {
    /// Create a session over the given transport.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> OgcResult<Self> {
        config.validate()?;

        let cache = Arc::new(
            ResponseCache::new(config.cache_namespace.clone(), Arc::clone(&transport))
                .with_freshness(config.freshness())
                .with_coalescing(config.coalesce_requests),
        );
        let features = Arc::new(FeatureClient::from_config(Arc::clone(&cache), &config));
        let feature_info = FeatureInfoClient::new(transport);

        info!(
            namespace = %config.cache_namespace,
            wfs_version = %config.wfs_version,
            coalesce = config.coalesce_requests,
            "OGC session started"
        );

        Ok(Self {
            config,
            cache,
            features,
            feature_info,
        })
    }

    /// Create a session over HTTP.
    pub fn connect(config: ClientConfig) -> OgcResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::new(config, Arc::new(transport))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn features(&self) -> &Arc<FeatureClient> {
        &self.features
    }

    pub fn feature_info(&self) -> &FeatureInfoClient {
        &self.feature_info
    }

    /// A new, empty legend catalog backed by the session cache.
    pub fn legend_catalog(&self) -> Arc<LegendCatalog> {
        Arc::new(LegendCatalog::new(Arc::clone(&self.cache)))
    }

    /// A layer for `source`, loading through the session's feature client.
    pub fn layer(&self, source: LayerSource) -> FilterableLayer {
        FilterableLayer::new(source, Arc::clone(&self.features))
    }
}
