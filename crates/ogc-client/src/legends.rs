//! Legend descriptors loaded through the response cache.

use std::sync::{Arc, PoisonError, RwLock};

use ogc_common::{body_text, Legend, LegendSet, OgcError, OgcResult};
use ogc_protocol::decode_legend_descriptor;
use tracing::{debug, info, instrument};

use crate::cache::ResponseCache;

/// Classification rules per property for one layer.
///
/// Empty until [`LegendCatalog::load_legends`] succeeds; each load replaces
/// the whole set at once.
pub struct LegendCatalog {
    cache: Arc<ResponseCache>,
    legends: RwLock<Arc<LegendSet>>,
}

impl LegendCatalog {
    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self {
            cache,
            legends: RwLock::new(Arc::new(LegendSet::default())),
        }
    }

    /// Fetch and store the legend descriptor at `url`.
    ///
    /// Range legends must list their thresholds in ascending order; a
    /// descriptor violating that is rejected as a whole.
    #[instrument(skip(self))]
    pub async fn load_legends(&self, url: &str) -> OgcResult<Vec<Legend>> {
        let body = self.cache.fetch_through_cache(url, &[]).await?;
        let descriptor = decode_legend_descriptor(body_text(&body)?)?;

        for legend in &descriptor.legends {
            legend.validate().map_err(OgcError::InvalidLegend)?;
        }

        let legends = descriptor.legends.clone();
        let set = LegendSet::from(descriptor);
        info!(
            legends = set.len(),
            properties = ?set.properties().collect::<Vec<_>>(),
            "Legends loaded"
        );
        *self.legends.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(set);
        Ok(legends)
    }

    /// Legend for `property`, if one was loaded.
    pub fn get_legend(&self, property: &str) -> Option<Legend> {
        let legend = self.snapshot().get(property).cloned();
        if legend.is_none() {
            debug!(property, "No legend for property");
        }
        legend
    }

    /// The currently loaded legend set.
    pub fn snapshot(&self) -> Arc<LegendSet> {
        Arc::clone(&self.legends.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_loaded(&self) -> bool {
        !self.snapshot().is_empty()
    }
}
