//! Outbound HTTP seam.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::{OgcError, OgcResult};

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as UTF-8 text; invalid bytes are a parse error.
    pub fn text(&self) -> OgcResult<&str> {
        body_text(&self.body)
    }
}

/// Decode a response body as UTF-8 without replacing invalid bytes.
pub fn body_text(body: &[u8]) -> OgcResult<&str> {
    std::str::from_utf8(body)
        .map_err(|e| OgcError::Parse(format!("response body is not valid UTF-8: {}", e)))
}

/// The single capability the data layer needs from the network.
///
/// Timeouts and connection policy belong to the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET request.
    ///
    /// Non-success statuses are returned as responses, not errors; only
    /// failures to obtain a response are errors.
    async fn get(&self, url: &Url) -> OgcResult<HttpResponse>;
}
