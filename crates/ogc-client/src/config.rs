//! Configuration for the OGC client.

use std::path::Path;
use std::time::Duration;

use ogc_common::{OgcError, OgcResult};
use serde::{Deserialize, Serialize};

use crate::cache::Freshness;

/// Configuration for the OGC client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WFS version sent with GetFeature requests.
    pub wfs_version: String,

    /// Cache generation. Bumping it starts an empty cache.
    pub cache_namespace: String,

    /// Entry lifetime in seconds. Unset keeps entries for the whole session.
    pub cache_ttl_secs: Option<u64>,

    /// Share one network request among concurrent identical fetches.
    pub coalesce_requests: bool,

    /// Total request timeout applied by the HTTP transport.
    pub request_timeout_secs: u64,

    /// Connect timeout applied by the HTTP transport.
    pub connect_timeout_secs: u64,

    /// User-Agent header sent by the HTTP transport.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            wfs_version: "1.1.0".to_string(),
            cache_namespace: "wfs-v1".to_string(),
            cache_ttl_secs: None,
            coalesce_requests: true,
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            user_agent: concat!("ogc-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("OGC_WFS_VERSION") {
            config.wfs_version = val;
        }

        if let Ok(val) = std::env::var("OGC_CACHE_NAMESPACE") {
            config.cache_namespace = val;
        }

        if let Ok(val) = std::env::var("OGC_CACHE_TTL_SECS") {
            if let Ok(secs) = val.parse() {
                config.cache_ttl_secs = Some(secs);
            }
        }

        if let Ok(val) = std::env::var("OGC_COALESCE_REQUESTS") {
            config.coalesce_requests = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("OGC_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("OGC_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.connect_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("OGC_USER_AGENT") {
            config.user_agent = val;
        }

        config
    }

    /// Load configuration from a YAML file. Missing fields keep defaults.
    pub fn from_file(path: impl AsRef<Path>) -> OgcResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| OgcError::Config(format!("{}: {}", path.display(), e)))?;
        serde_yaml::from_str(&content)
            .map_err(|e| OgcError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> OgcResult<()> {
        if self.wfs_version.trim().is_empty() {
            return Err(OgcError::Config("wfs_version must not be empty".to_string()));
        }

        if self.cache_namespace.trim().is_empty() {
            return Err(OgcError::Config(
                "cache_namespace must not be empty".to_string(),
            ));
        }

        if self.cache_ttl_secs == Some(0) {
            return Err(OgcError::Config("cache_ttl_secs must be > 0".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(OgcError::Config(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(OgcError::Config(
                "connect_timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Staleness policy for the response cache.
    pub fn freshness(&self) -> Freshness {
        match self.cache_ttl_secs {
            Some(secs) => Freshness::Ttl(Duration::from_secs(secs)),
            None => Freshness::Forever,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
