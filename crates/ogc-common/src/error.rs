//! Error types for the OGC feature layer.

use thiserror::Error;

use crate::records::ExceptionRecord;
use crate::ServiceType;

/// Result type alias using OgcError.
pub type OgcResult<T> = Result<T, OgcError>;

/// Primary error type for OGC data access.
///
/// Cloneable so one failure can be handed to every caller that was waiting
/// on the same in-flight request, and carried inside lifecycle events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OgcError {
    // === Transport Errors ===
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No cache entry for {url} after populate attempt{}", status_suffix(.status))]
    CacheMiss { url: String, status: Option<u16> },

    // === Payload Errors ===
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{}", describe_exceptions(.0))]
    ServiceException(Vec<ExceptionRecord>),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    // === Layer Errors ===
    #[error("No features have been loaded")]
    EmptyCollection,

    #[error("Service type {0} cannot serve this request")]
    UnsupportedService(ServiceType),

    #[error("Layer has not been loaded yet")]
    NotLoaded,

    #[error("Invalid legend: {0}")]
    InvalidLegend(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OgcError {
    /// Short, stable label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OgcError::Transport(_) => "transport",
            OgcError::InvalidUrl(_) => "invalid_url",
            OgcError::CacheMiss { .. } => "cache_miss",
            OgcError::Parse(_) => "parse",
            OgcError::ServiceException(_) => "service_exception",
            OgcError::MalformedResponse(_) => "malformed_response",
            OgcError::EmptyCollection => "empty_collection",
            OgcError::UnsupportedService(_) => "unsupported_service",
            OgcError::NotLoaded => "not_loaded",
            OgcError::InvalidLegend(_) => "invalid_legend",
            OgcError::Config(_) => "config",
        }
    }

    /// The decoded exception records, if this is a server-reported exception.
    pub fn exception_records(&self) -> Option<&[ExceptionRecord]> {
        match self {
            OgcError::ServiceException(records) => Some(records),
            _ => None,
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        OgcError::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        OgcError::MalformedResponse(msg.into())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

fn describe_exceptions(records: &[ExceptionRecord]) -> String {
    if records.is_empty() {
        return "Service exception report present but no exceptions could be read".to_string();
    }
    let parts: Vec<String> = records
        .iter()
        .map(|r| match &r.code {
            Some(code) => format!("[{}] {}", code, r.message),
            None => r.message.clone(),
        })
        .collect();
    format!("Service exception: {}", parts.join("; "))
}

impl From<serde_json::Error> for OgcError {
    fn from(err: serde_json::Error) -> Self {
        OgcError::Parse(format!("JSON error: {}", err))
    }
}

impl From<quick_xml::Error> for OgcError {
    fn from(err: quick_xml::Error) -> Self {
        OgcError::Parse(format!("XML error: {}", err))
    }
}

impl From<url::ParseError> for OgcError {
    fn from(err: url::ParseError) -> Self {
        OgcError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_exception_message() {
        let err = OgcError::ServiceException(vec![ExceptionRecord::new(
            "bad layer",
            Some("InvalidParameterValue".to_string()),
        )]);
        assert_eq!(
            err.to_string(),
            "Service exception: [InvalidParameterValue] bad layer"
        );
        assert_eq!(err.exception_records().map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_empty_exception_report_is_distinct() {
        let err = OgcError::ServiceException(Vec::new());
        assert!(err.to_string().contains("no exceptions could be read"));
        assert_eq!(err.kind(), "service_exception");
    }

    #[test]
    fn test_cache_miss_message() {
        let err = OgcError::CacheMiss {
            url: "http://example.com/wfs".to_string(),
            status: Some(404),
        };
        assert_eq!(
            err.to_string(),
            "No cache entry for http://example.com/wfs after populate attempt (HTTP 404)"
        );
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let err: OgcError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "parse");
    }
}
