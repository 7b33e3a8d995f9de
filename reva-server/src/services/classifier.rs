//! Classifier service client
//!
//! Sends a raw CSV payload to the external classification service as a
//! multipart upload and returns the labeled CSV bytes. The endpoint comes
//! from configuration, never from a compile-time constant. The returned
//! payload is not inspected here; schema validation is the codec's job.

use std::time::Duration;
use thiserror::Error;
use tracing::error;

const USER_AGENT: &str = concat!("reva/", env!("CARGO_PKG_VERSION"));

/// Classifier client errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Connection, DNS, timeout, or other transport-level failure.
    #[error("Classifier transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Classifier returned status {0}")]
    Status(u16),

    /// The service accepted the request but produced a zero-length body.
    /// Distinct from transport failure so callers can tell "unreachable"
    /// apart from "reachable but nothing usable".
    #[error("Classifier returned an empty result")]
    EmptyResult,
}

/// HTTP client for the external classification service.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClassifierClient {
    /// Create a client for the given base URL with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<ClassifierClient, ClassifierError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        Ok(ClassifierClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit CSV bytes for labeling; returns the labeled CSV bytes.
    ///
    /// No retries. In-flight requests are abandoned when the returned
    /// future is dropped, which is how caller cancellation propagates.
    pub async fn classify(
        &self,
        csv_bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<Vec<u8>, ClassifierError> {
        let part = reqwest::multipart::Part::bytes(csv_bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/labels/file", self.base_url);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("Classifier request to {} failed: {}", url, status);
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        if body.is_empty() {
            error!("Classifier returned an empty body for '{}'", file_name);
            return Err(ClassifierError::EmptyResult);
        }

        Ok(body.to_vec())
    }
}
