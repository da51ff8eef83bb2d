//! A loaded feature set that can be restyled without refetching.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ogc_common::{
    Feature, FeatureCollection, LayerSource, Legend, LegendBuilder, OgcError, OgcResult, StyleSet,
};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use crate::cache::CacheMode;
use crate::events::LayerEvent;
use crate::features::FeatureClient;
use crate::legends::LegendCatalog;

#[derive(Default)]
struct LayerState {
    features: FeatureCollection,
    /// Extra parameters of the last successful load; `None` before one.
    last_params: Option<Vec<(String, String)>>,
    active_property: Option<String>,
    styles: StyleSet,
}

/// Holds the last loaded features of one source and the active
/// classification property.
pub struct FilterableLayer {
    source: LayerSource,
    client: Arc<FeatureClient>,
    legends: Option<Arc<LegendCatalog>>,
    default_legends: bool,
    state: Mutex<LayerState>,
}

impl FilterableLayer {
    pub fn new(source: LayerSource, client: Arc<FeatureClient>) -> Self {
        Self {
            source,
            client,
            legends: None,
            default_legends: false,
            state: Mutex::new(LayerState::default()),
        }
    }

    /// Classify with legends from `catalog`.
    pub fn with_legends(mut self, catalog: Arc<LegendCatalog>) -> Self {
        self.legends = Some(catalog);
        self
    }

    /// Build a legend from the loaded values when the catalog has none for
    /// the active property.
    pub fn with_default_legends(mut self) -> Self {
        self.default_legends = true;
        self
    }

    pub fn source(&self) -> &LayerSource {
        &self.source
    }

    /// Lifecycle and restyle events for this layer's client.
    pub fn subscribe(&self) -> broadcast::Receiver<LayerEvent> {
        self.client.subscribe()
    }

    /// Load features and restyle with the current property.
    ///
    /// On failure the previously loaded features are kept.
    pub async fn load(&self, params: &[(String, String)]) -> OgcResult<usize> {
        self.load_with(params, CacheMode::Default).await
    }

    /// Repeat the last successful load, bypassing stored responses.
    #[instrument(skip(self), fields(layer = %self.source.query_layer_name))]
    pub async fn reload(&self) -> OgcResult<usize> {
        let params = self.state().last_params.clone().ok_or(OgcError::NotLoaded)?;
        self.load_with(&params, CacheMode::Reload).await
    }

    /// Set the classification property and restyle. No network access.
    pub fn set_active_property(&self, property: Option<&str>) -> StyleSet {
        let mut state = self.state();
        state.active_property = property.map(str::to_string);
        debug!(property = ?state.active_property, "Active property changed");
        self.restyle(&mut state)
    }

    /// Restyle with the current property.
    pub fn redraw(&self) -> StyleSet {
        let mut state = self.state();
        self.restyle(&mut state)
    }

    pub fn active_property(&self) -> Option<String> {
        self.state().active_property.clone()
    }

    /// Styles from the last restyle.
    pub fn styles(&self) -> StyleSet {
        self.state().styles.clone()
    }

    pub fn features(&self) -> FeatureCollection {
        self.state().features.clone()
    }

    pub fn feature_count(&self) -> usize {
        self.state().features.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.state().last_params.is_some()
    }

    async fn load_with(&self, params: &[(String, String)], mode: CacheMode) -> OgcResult<usize> {
        let features = self
            .client
            .load_features_with(&self.source, params, mode)
            .await?;
        let count = features.len();

        let mut state = self.state();
        state.features = features;
        state.last_params = Some(params.to_vec());
        self.restyle(&mut state);
        Ok(count)
    }

    fn restyle(&self, state: &mut LayerState) -> StyleSet {
        let legend = state
            .active_property
            .as_deref()
            .and_then(|property| self.legend_for(property, &state.features));

        let styles = StyleSet::derive(
            &state.features,
            state.active_property.as_deref(),
            legend.as_ref(),
            self.source.title.as_deref(),
        );
        debug!(
            styled = styles.len(),
            total = state.features.len(),
            "Layer restyled"
        );

        state.styles = styles.clone();
        self.client.emit(LayerEvent::Restyled {
            layer: self.source.query_layer_name.clone(),
            styles: styles.clone(),
        });
        styles
    }

    fn legend_for(&self, property: &str, features: &[Feature]) -> Option<Legend> {
        let loaded = self
            .legends
            .as_ref()
            .and_then(|catalog| catalog.get_legend(property));
        if loaded.is_some() || !self.default_legends {
            return loaded;
        }

        match LegendBuilder::new(property).from_features(features) {
            Ok(legend) => legend,
            Err(e) => {
                warn!(property, error = %e, "No default legend");
                None
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, LayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
