//! Serving Client
//!
//! The RPC capability the dispatcher depends on: a feature lookup against
//! the remote serving backend. The trait is the seam; production uses the
//! HTTP client below, tests substitute in-memory fakes.

use crate::error::{LoadError, SpecError};
use crate::types::{FeatureRequest, FeatureResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Capability for executing feature lookups against the serving backend.
#[async_trait]
pub trait FeatureClient: Send + Sync {
    /// Execute one feature lookup. The dispatcher applies the shared
    /// deadline around this call; implementations only need their own
    /// connect-level timeouts.
    async fn fetch_features(&self, request: &FeatureRequest) -> Result<FeatureResponse, LoadError>;

    /// Cheap upstream liveness probe, used by the echo endpoint.
    async fn ping(&self) -> Result<(), LoadError>;
}

const SERVING_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for a feature-serving backend exposing the online-features
/// JSON API.
pub struct HttpFeatureClient {
    client: Client,
    base_url: String,
}

impl HttpFeatureClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SpecError> {
        let client = Client::builder()
            .connect_timeout(SERVING_HTTP_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SpecError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// Map transport-level failures onto the single RPC error kind; deadline
// expiry surfaces the same way as any other failed call.
fn map_http_error(error: reqwest::Error) -> LoadError {
    if error.is_timeout() {
        LoadError::Rpc(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        LoadError::Rpc(format!("Connection error: {}", error))
    } else {
        LoadError::Rpc(format!("HTTP error: {}", error))
    }
}

#[async_trait]
impl FeatureClient for HttpFeatureClient {
    async fn fetch_features(&self, request: &FeatureRequest) -> Result<FeatureResponse, LoadError> {
        let url = format!("{}/get-online-features", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LoadError::Rpc(format!(
                "Serving returned status {}: {}",
                status, error_text
            )));
        }

        let features: FeatureResponse = response
            .json()
            .await
            .map_err(|e| LoadError::Rpc(format!("Failed to parse serving response: {}", e)))?;
        Ok(features)
    }

    async fn ping(&self) -> Result<(), LoadError> {
        let url = format!("{}/info", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            return Err(LoadError::Rpc(format!(
                "Serving info endpoint returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
