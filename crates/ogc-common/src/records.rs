//! Tabular records decoded from OGC XML responses.

use serde::{Deserialize, Serialize};

/// One `ServiceException` from an OGC ServiceExceptionReport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    /// Text content of the exception element
    pub message: String,
    /// Optional `code` attribute (e.g. "InvalidParameterValue")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ExceptionRecord {
    pub fn new(message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// One row of a GetFeatureInfo result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRow {
    /// Layer name or display name of the queried layer
    pub source_label: String,
    /// Attribute name; `None` for raster (single value) results
    pub attribute_name: Option<String>,
    /// Attribute value as delivered by the server
    pub value: String,
}

impl InfoRow {
    /// Row for a raster layer value.
    pub fn raster(source_label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            attribute_name: None,
            value: value.into(),
        }
    }

    /// Row for a vector feature attribute.
    pub fn attribute(
        source_label: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            source_label: source_label.into(),
            attribute_name: Some(name.into()),
            value: value.into(),
        }
    }

    pub fn is_raster(&self) -> bool {
        self.attribute_name.is_none()
    }
}
