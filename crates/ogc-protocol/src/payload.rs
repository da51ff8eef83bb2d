//! Classification of response bodies that share one transport for data and
//! errors.
//!
//! OGC servers return JSON on success but may answer the same request with
//! a ServiceExceptionReport, usually with HTTP 200. A body is classified as:
//!
//! 1. an exception report, when it starts with `<ServiceExceptionReport`
//!    (fast path, no JSON attempt);
//! 2. data, when it parses as JSON;
//! 3. an exception report, when it is an XML document rooted at
//!    `ServiceExceptionReport` (e.g. behind an XML declaration);
//! 4. a parse failure otherwise.

use ogc_common::{ExceptionRecord, LegendDescriptor, OgcError, OgcResult};
use serde_json::Value;
use tracing::debug;

use crate::exceptions::{exception_records, is_exception_report, starts_with_exception_report};
use crate::xml::parse_document;

/// A response body, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// The expected success shape
    Data(T),
    /// The server reported exceptions (possibly none readable)
    ServiceError(Vec<ExceptionRecord>),
    /// Neither data nor an exception report
    ParseFailure(String),
}

impl<T> Payload<T> {
    pub fn into_result(self) -> OgcResult<T> {
        match self {
            Payload::Data(data) => Ok(data),
            Payload::ServiceError(records) => Err(OgcError::ServiceException(records)),
            Payload::ParseFailure(message) => Err(OgcError::Parse(message)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Payload<U> {
        match self {
            Payload::Data(data) => Payload::Data(f(data)),
            Payload::ServiceError(records) => Payload::ServiceError(records),
            Payload::ParseFailure(message) => Payload::ParseFailure(message),
        }
    }
}

/// Classify a JSON-or-exception body.
pub fn classify_json(text: &str) -> Payload<Value> {
    if starts_with_exception_report(text) {
        return exception_payload(text);
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => Payload::Data(value),
        Err(json_err) => match parse_document(text) {
            Ok(doc) if is_exception_report(&doc) => {
                Payload::ServiceError(exception_records(&doc))
            }
            _ => Payload::ParseFailure(format!("JSON error: {}", json_err)),
        },
    }
}

fn exception_payload<T>(text: &str) -> Payload<T> {
    match parse_document(text) {
        Ok(doc) => {
            let records = exception_records(&doc);
            debug!(exceptions = records.len(), "Service exception report received");
            Payload::ServiceError(records)
        }
        Err(e) => Payload::ParseFailure(e.to_string()),
    }
}

/// Decode a legend descriptor `{legends: [...]}`.
pub fn decode_legend_descriptor(text: &str) -> OgcResult<LegendDescriptor> {
    let value = classify_json(text).into_result()?;
    if value.get("legends").is_none() {
        return Err(OgcError::malformed("legend descriptor has no 'legends' field"));
    }
    serde_json::from_value(value)
        .map_err(|e| OgcError::malformed(format!("invalid legend descriptor: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_is_data() {
        assert_eq!(classify_json(r#"{"a": 1}"#), Payload::Data(json!({"a": 1})));
    }

    #[test]
    fn test_prefixed_exception_report() {
        let payload = classify_json(
            r#"<ServiceExceptionReport><ServiceException code="X">boom</ServiceException></ServiceExceptionReport>"#,
        );
        assert_eq!(
            payload,
            Payload::ServiceError(vec![ExceptionRecord::new("boom", Some("X".to_string()))])
        );
    }

    #[test]
    fn test_exception_report_behind_declaration() {
        let payload = classify_json(
            r#"<?xml version="1.0"?><ServiceExceptionReport><ServiceException>late</ServiceException></ServiceExceptionReport>"#,
        );
        assert!(matches!(payload, Payload::ServiceError(ref r) if r.len() == 1));
    }

    #[test]
    fn test_other_xml_is_parse_failure() {
        let payload = classify_json("<html><body>Proxy error</body></html>");
        assert!(matches!(payload, Payload::ParseFailure(_)));
        assert_eq!(payload.into_result().unwrap_err().kind(), "parse");
    }

    #[test]
    fn test_broken_exception_report_is_parse_failure() {
        let payload = classify_json("<ServiceExceptionReport><ServiceException>");
        assert!(matches!(payload, Payload::ParseFailure(_)));
    }

    #[test]
    fn test_legend_descriptor_requires_legends() {
        let err = decode_legend_descriptor(r#"{"layer": {"id": 1}}"#).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn test_legend_descriptor() {
        let descriptor = decode_legend_descriptor(
            r##"{"layer": {"id": 4, "name": "wells"}, "legends": [
                {"property": "depth", "title": "Depth", "type": "range",
                 "entries": [{"lo": 0, "hi": 50, "color": "#0000ff", "label": "0 - 50"}]}
            ]}"##,
        )
        .unwrap();
        assert_eq!(descriptor.legends.len(), 1);
        assert_eq!(
            descriptor.layer.and_then(|l| l.name).as_deref(),
            Some("wells")
        );
    }
}
