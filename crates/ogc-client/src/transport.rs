//! HTTP transport backed by reqwest.

use async_trait::async_trait;
use ogc_common::{HttpResponse, OgcError, OgcResult, Transport};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;

/// Production [`Transport`] over a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport applying the configured timeouts and user agent.
    pub fn new(config: &ClientConfig) -> OgcResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| OgcError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn transport_error(e: reqwest::Error) -> OgcError {
    if e.is_timeout() {
        OgcError::Transport(format!("request timed out: {}", e))
    } else {
        OgcError::Transport(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self), fields(url = %url))]
    async fn get(&self, url: &Url) -> OgcResult<HttpResponse> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;

        debug!(status, bytes = body.len(), "HTTP response received");
        Ok(HttpResponse::with_status(status, body))
    }
}
