//! WMS GetFeatureInfo handling
//!
//! Builds point queries against WMS layers and flattens the XML response
//! into rows. Two response shapes are understood:
//!
//! ```xml
//! <GetFeatureInfoResponse>
//!   <Layer name="elevation">
//!     <Attribute name="value_0" value="1523.5"/>          <!-- raster -->
//!   </Layer>
//!   <Layer name="wells">
//!     <Feature id="wells.12">                             <!-- vector -->
//!       <Attribute name="fid" value="12"/>
//!       <Attribute name="depth" value="80"/>
//!     </Feature>
//!   </Layer>
//! </GetFeatureInfoResponse>
//! ```

use ogc_common::{InfoRow, OgcResult, PropertyAllowList};
use tracing::debug;

use crate::xml::{parse_document, XmlElement};

/// Root element of a GetFeatureInfo XML response.
pub const FEATURE_INFO_ROOT: &str = "GetFeatureInfoResponse";

/// Feature id attributes that are never shown.
pub const SYSTEM_EXCLUDES: [&str; 2] = ["fid", "ogc_fid"];

/// The only response format decoded here.
pub const INFO_FORMAT: &str = "text/xml";

/// Half-width of the degenerate bounding box around a clicked point.
pub const POINT_BBOX_DELTA: f64 = 0.00001;

/// Point query parameters for a WMS 1.3.0 GetFeatureInfo request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetFeatureInfoParams {
    /// Layer(s) queried, comma separated when several
    pub layers: String,
    /// Clicked latitude (EPSG:4326)
    pub lat: f64,
    /// Clicked longitude (EPSG:4326)
    pub lon: f64,
    /// Optional `propertyName` restriction
    pub property_name: Option<String>,
}

impl GetFeatureInfoParams {
    pub fn at_point(layers: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            layers: layers.into(),
            lat,
            lon,
            property_name: None,
        }
    }

    pub fn with_property_names(mut self, allow_list: &PropertyAllowList) -> Self {
        if !allow_list.is_empty() {
            self.property_name = Some(allow_list.to_param());
        }
        self
    }

    /// Query string pairs, in request order.
    ///
    /// The bounding box is a tiny square anchored at the point and the
    /// queried pixel is its corner (i=0, j=0) on a 100x100 map.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let bbox = [
            self.lat,
            self.lon,
            self.lat + POINT_BBOX_DELTA,
            self.lon + POINT_BBOX_DELTA,
        ]
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");

        let mut params = vec![
            ("request", "GetFeatureInfo".to_string()),
            ("service", "WMS".to_string()),
            ("srs", "EPSG:4326".to_string()),
            ("version", "1.3.0".to_string()),
            ("bbox", bbox),
            ("height", "100".to_string()),
            ("width", "100".to_string()),
            ("i", "0".to_string()),
            ("j", "0".to_string()),
            ("layers", self.layers.clone()),
            ("query_layers", self.layers.clone()),
            ("info_format", INFO_FORMAT.to_string()),
        ];
        if let Some(property_name) = &self.property_name {
            params.push(("propertyName", property_name.clone()));
        }
        params
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

/// How a GetFeatureInfo response is flattened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureInfoQuery {
    /// Layer name the query was issued for
    pub active_layer_name: String,
    /// Label to show instead of `active_layer_name`
    pub display_name: Option<String>,
    /// Properties to keep for vector results (empty keeps all)
    pub allow_list: PropertyAllowList,
}

impl FeatureInfoQuery {
    pub fn new(active_layer_name: impl Into<String>) -> Self {
        Self {
            active_layer_name: active_layer_name.into(),
            ..Self::default()
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_allow_list(mut self, allow_list: PropertyAllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    fn source_label(&self, layer_name: &str) -> String {
        match &self.display_name {
            Some(display) if layer_name == self.active_layer_name => display.clone(),
            _ => layer_name.to_string(),
        }
    }

    fn keeps(&self, attribute: &str) -> bool {
        !SYSTEM_EXCLUDES.contains(&attribute) && self.allow_list.allows(attribute)
    }
}

/// Flatten a GetFeatureInfo XML response into rows.
///
/// Rows come out in document order: layer by layer, then attribute by
/// attribute. Attributes without a value are dropped. A document with a
/// different root element yields no rows.
pub fn decode_feature_info(xml: &str, query: &FeatureInfoQuery) -> OgcResult<Vec<InfoRow>> {
    let doc = parse_document(xml)?;
    Ok(feature_info_rows(&doc, query))
}

/// Flatten an already parsed GetFeatureInfo document.
pub fn feature_info_rows(doc: &XmlElement, query: &FeatureInfoQuery) -> Vec<InfoRow> {
    if !doc.is(FEATURE_INFO_ROOT) {
        debug!(root = %doc.name, "Not a GetFeatureInfo response");
        return Vec::new();
    }

    let mut rows = Vec::new();
    for layer in &doc.children {
        let label = query.source_label(layer.attribute("name").unwrap_or_default());
        for item in &layer.children {
            if item.is("Attribute") {
                if let Some(value) = non_empty_value(item) {
                    rows.push(InfoRow::raster(label.clone(), value));
                }
            } else if item.is("Feature") {
                collect_feature_rows(item, &label, query, &mut rows);
            }
        }
    }

    debug!(rows = rows.len(), layer = %query.active_layer_name, "Decoded feature info");
    rows
}

fn collect_feature_rows(
    feature: &XmlElement,
    label: &str,
    query: &FeatureInfoQuery,
    rows: &mut Vec<InfoRow>,
) {
    for attribute in feature.children.iter().filter(|c| c.is("Attribute")) {
        let name = attribute.attribute("name").unwrap_or_default();
        if !query.keeps(name) {
            continue;
        }
        if let Some(value) = non_empty_value(attribute) {
            rows.push(InfoRow::attribute(label, name, value));
        }
    }
}

fn non_empty_value(attribute: &XmlElement) -> Option<&str> {
    attribute.attribute("value").filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params() {
        let params = GetFeatureInfoParams::at_point("wells", 1.5, 36.25)
            .with_property_names(&PropertyAllowList::parse("status, depth"));
        let query = params.to_query();
        let get = |k: &str| {
            query
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(query[0], ("request".to_string(), "GetFeatureInfo".to_string()));
        let expected_bbox = format!(
            "1.5,36.25,{},{}",
            1.5 + POINT_BBOX_DELTA,
            36.25 + POINT_BBOX_DELTA
        );
        assert_eq!(get("bbox"), Some(expected_bbox.as_str()));
        assert_eq!(get("query_layers"), Some("wells"));
        assert_eq!(get("info_format"), Some("text/xml"));
        assert_eq!(get("propertyName"), Some("status,depth"));
        assert_eq!(get("i"), Some("0"));
    }

    #[test]
    fn test_no_property_name_without_allow_list() {
        let query = GetFeatureInfoParams::at_point("wells", 0.0, 0.0)
            .with_property_names(&PropertyAllowList::default())
            .to_query();
        assert!(query.iter().all(|(k, _)| k != "propertyName"));
        assert_eq!(query.len(), 12);
    }

    #[test]
    fn test_raster_single_value() {
        let xml = r#"<GetFeatureInfoResponse><Layer name="dem"><Attribute name="value_0" value="12.5"/></Layer></GetFeatureInfoResponse>"#;
        let rows = decode_feature_info(xml, &FeatureInfoQuery::new("dem")).unwrap();
        assert_eq!(rows, vec![InfoRow::raster("dem", "12.5")]);
    }

    #[test]
    fn test_display_name_substitution() {
        let xml = r#"<GetFeatureInfoResponse>
            <Layer name="dem"><Attribute value="3"/></Layer>
            <Layer name="other"><Attribute value="4"/></Layer>
        </GetFeatureInfoResponse>"#;
        let query = FeatureInfoQuery::new("dem").with_display_name("Elevation");
        let rows = decode_feature_info(xml, &query).unwrap();
        assert_eq!(rows[0].source_label, "Elevation");
        assert_eq!(rows[1].source_label, "other");
    }

    #[test]
    fn test_root_mismatch_is_empty() {
        let rows = decode_feature_info("<html><body/></html>", &FeatureInfoQuery::new("x")).unwrap();
        assert!(rows.is_empty());
    }
}
