//! WFS GetFeature requests with GeoJSON output.

use ogc_common::{Feature, FeatureCollection, OgcError, OgcResult};
use serde_json::Value;

use crate::payload::{classify_json, Payload};

/// Output format requested from the server.
pub const GEOJSON_OUTPUT_FORMAT: &str = "GeoJSON";

/// Query parameters for a GetFeature request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetFeatureParams {
    /// WFS protocol version
    pub version: String,
    /// Feature type (layer) name
    pub typename: String,
    /// Caller supplied parameters appended after the standard ones
    pub extra: Vec<(String, String)>,
}

impl GetFeatureParams {
    pub fn new(version: impl Into<String>, typename: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            typename: typename.into(),
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, extra: &[(String, String)]) -> Self {
        self.extra.extend_from_slice(extra);
        self
    }

    /// Query string pairs, in request order.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("service".to_string(), "WFS".to_string()),
            ("version".to_string(), self.version.clone()),
            ("request".to_string(), "GetFeature".to_string()),
            ("typename".to_string(), self.typename.clone()),
            ("outputformat".to_string(), GEOJSON_OUTPUT_FORMAT.to_string()),
        ];
        params.extend(self.extra.iter().cloned());
        params
    }
}

/// Classify a GetFeature body into features, an exception report, or a
/// parse failure.
pub fn classify_feature_collection(text: &str) -> OgcResult<Payload<FeatureCollection>> {
    match classify_json(text) {
        Payload::Data(value) => extract_features(value).map(Payload::Data),
        Payload::ServiceError(records) => Ok(Payload::ServiceError(records)),
        Payload::ParseFailure(message) => Ok(Payload::ParseFailure(message)),
    }
}

/// Decode a GetFeature body into its features.
pub fn decode_feature_collection(text: &str) -> OgcResult<FeatureCollection> {
    classify_feature_collection(text)?.into_result()
}

fn extract_features(mut value: Value) -> OgcResult<FeatureCollection> {
    let features = value
        .get_mut("features")
        .map(Value::take)
        .ok_or_else(|| OgcError::malformed("response has no 'features' field"))?;
    if !features.is_array() {
        return Err(OgcError::malformed("'features' is not an array"));
    }
    serde_json::from_value::<Vec<Feature>>(features)
        .map_err(|e| OgcError::malformed(format!("invalid feature: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_order() {
        let extra = vec![("maxfeatures".to_string(), "10".to_string())];
        let query = GetFeatureParams::new("1.1.0", "wells").with_extra(&extra).to_query();
        let keys: Vec<&str> = query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["service", "version", "request", "typename", "outputformat", "maxfeatures"]
        );
        assert_eq!(query[3].1, "wells");
        assert_eq!(query[4].1, "GeoJSON");
    }

    #[test]
    fn test_decode_features() {
        let features = decode_feature_collection(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "id": "wells.1", "geometry": null, "properties": {"depth": 40}},
                {"type": "Feature", "geometry": null, "properties": {"depth": 55}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id.as_deref(), Some("wells.1"));
    }

    #[test]
    fn test_missing_features_is_malformed() {
        let err = decode_feature_collection(r#"{"type": "FeatureCollection"}"#).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
        let err = decode_feature_collection(r#"{"features": {"a": 1}}"#).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = decode_feature_collection("{\"features\": [").unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
