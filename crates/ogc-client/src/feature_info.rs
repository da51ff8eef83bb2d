//! WMS GetFeatureInfo point queries.
//!
//! Point queries go straight to the transport: results depend on the
//! clicked location and are never cached.

use std::sync::Arc;

use ogc_common::{InfoRow, LayerSource, OgcError, OgcResult, ServiceType, Transport};
use ogc_protocol::{
    exception_records, feature_info_rows, is_exception_report, parse_document, FeatureInfoQuery,
    GetFeatureInfoParams,
};
use tracing::{debug, instrument};

use crate::cache::canonical_url;

/// Issues GetFeatureInfo requests and flattens the answers into rows.
pub struct FeatureInfoClient {
    transport: Arc<dyn Transport>,
}

impl FeatureInfoClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Query `source` at a point.
    ///
    /// The source's property allow-list restricts both the request and the
    /// returned vector rows; its title replaces the layer name in labels.
    #[instrument(skip(self, source), fields(layer = %source.query_layer_name))]
    pub async fn query(&self, source: &LayerSource, lat: f64, lon: f64) -> OgcResult<Vec<InfoRow>> {
        if source.service_type != ServiceType::Wms {
            return Err(OgcError::UnsupportedService(source.service_type));
        }

        let allow_list = source.property_allow_list.clone().unwrap_or_default();
        let params = GetFeatureInfoParams::at_point(&source.query_layer_name, lat, lon)
            .with_property_names(&allow_list);
        let url = canonical_url(&source.url, &params.to_query())?;

        let response = self.transport.get(&url).await?;
        if !response.is_success() {
            return Err(OgcError::Transport(format!(
                "GetFeatureInfo returned HTTP {}",
                response.status
            )));
        }

        let doc = parse_document(response.text()?)?;
        if is_exception_report(&doc) {
            return Err(OgcError::ServiceException(exception_records(&doc)));
        }

        let mut query =
            FeatureInfoQuery::new(&source.query_layer_name).with_allow_list(allow_list);
        if let Some(title) = &source.title {
            query = query.with_display_name(title);
        }

        let rows = feature_info_rows(&doc, &query);
        debug!(rows = rows.len(), "Feature info decoded");
        Ok(rows)
    }
}
