//! HTTP client for the camwall web backend

use crate::protocol::{
    update_last_access_path, LastAccessRecord, LastAccessResponse, START_DETECTION_PATH,
};
use async_trait::async_trait;
use camwall_core::{CamwallError, CamwallResult, CctvId};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Remote operations the grid depends on
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Record that `cctv_id` is being opened.
    ///
    /// Resolves to `Ok` only when the backend confirmed the record.
    async fn record_last_access(&self, cctv_id: &CctvId) -> CamwallResult<LastAccessRecord>;

    /// Kick off the server-side detection job
    async fn start_detection(&self) -> CamwallResult<()>;
}

/// Remote endpoint configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Scheme, host and port of the backend
    pub base_url: String,
    /// Per-request timeout
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RemoteConfig {
    /// Validate configuration
    pub fn validate(&self) -> CamwallResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CamwallError::InvalidConfiguration {
                message: format!("base_url must be an http(s) URL, got {:?}", self.base_url),
            });
        }
        if self.timeout.is_zero() {
            return Err(CamwallError::InvalidConfiguration {
                message: "timeout must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Absolute URL for `path`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// [`RemoteApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRemoteApi {
    /// Create a client for `config`
    pub fn new(config: RemoteConfig) -> CamwallResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CamwallError::InvalidConfiguration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, config })
    }

    /// Active configuration
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    async fn post(&self, path: &str) -> CamwallResult<reqwest::Response> {
        let url = self.config.url(path);
        debug!("POST {}", url);
        self.client
            .post(&url)
            .send()
            .await
            .map_err(|e| network_error(path, e))
    }
}

fn network_error(endpoint: &str, err: reqwest::Error) -> CamwallError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    CamwallError::RemoteCall {
        endpoint: endpoint.to_string(),
        reason,
        application_level: false,
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn record_last_access(&self, cctv_id: &CctvId) -> CamwallResult<LastAccessRecord> {
        let path = update_last_access_path(cctv_id);
        let response = self.post(&path).await?;
        let status = response.status();

        // The body decides the outcome; an error page that is not JSON is a transport failure.
        let body: LastAccessResponse =
            response
                .json()
                .await
                .map_err(|e| CamwallError::RemoteCall {
                    endpoint: path.clone(),
                    reason: format!("HTTP {}: unreadable body: {}", status.as_u16(), e),
                    application_level: false,
                })?;

        if !body.success {
            let reason = body
                .message
                .clone()
                .unwrap_or_else(|| format!("HTTP {}: success=false", status.as_u16()));
            warn!("Last access update for {} rejected: {}", cctv_id, reason);
            return Err(CamwallError::RemoteCall {
                endpoint: path,
                reason,
                application_level: true,
            });
        }

        info!(
            "Last access updated for {}: {}",
            cctv_id,
            body.last_access.as_deref().unwrap_or("-")
        );
        Ok(LastAccessRecord {
            cctv_id: cctv_id.clone(),
            recorded_at: body.last_access_time(),
            last_access: body.last_access,
        })
    }

    async fn start_detection(&self) -> CamwallResult<()> {
        let response = self.post(START_DETECTION_PATH).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CamwallError::RemoteCall {
                endpoint: START_DETECTION_PATH.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
                application_level: true,
            });
        }
        info!("Detection job started");
        Ok(())
    }
}
