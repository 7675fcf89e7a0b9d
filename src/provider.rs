//! Generation Backend Abstraction
//!
//! Unified interface for submitting generation jobs to an external provider
//! and polling their remote status. The HTTP implementation speaks a small
//! JSON job API; [`mock::ScriptedBackend`] serves tests and offline use.

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::types::{GenerationKind, GenerationRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod mock;

/// Result of the initial submission. Some providers finish small jobs
/// synchronously and return the asset in the submit response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Job accepted; poll `remote_id` for progress.
    Accepted { remote_id: String },
    /// Job finished within the submit call itself.
    Completed {
        remote_id: String,
        result_url: String,
    },
}

/// Remote job status as reported by a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
}

/// One poll response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePoll {
    pub status: RemoteStatus,
    /// Output asset URLs. May be empty even on `Succeeded` while the
    /// provider finalizes permanent storage.
    pub output: Vec<String>,
    pub error: Option<String>,
}

impl RemotePoll {
    pub fn first_output(&self) -> Option<&str> {
        self.output.first().map(String::as_str)
    }
}

/// Generation backend trait.
///
/// A 404-style missing remote job surfaces as [`BackendError::NotFound`],
/// distinct from every poll status, so the poller can stop immediately.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Submit a composed request for generation.
    async fn submit(
        &self,
        kind: GenerationKind,
        request: &GenerationRequest,
    ) -> Result<SubmitOutcome, BackendError>;

    /// Poll the remote status of a previously submitted job.
    async fn poll_status(&self, remote_id: &str) -> Result<RemotePoll, BackendError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// Wire structures for the HTTP job API.
#[derive(Serialize)]
struct SubmitRequestBody<'a> {
    kind: GenerationKind,
    prompt: &'a str,
    model: &'a str,
    aspect_ratio: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reference_images: Vec<&'a str>,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    metadata: std::collections::HashMap<&'a str, &'a str>,
}

#[derive(Deserialize)]
struct SubmitResponseBody {
    job_id: String,
    status: RemoteStatus,
    #[serde(default)]
    result_url: Option<String>,
}

#[derive(Deserialize)]
struct PollResponseBody {
    status: RemoteStatus,
    #[serde(default)]
    output: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

// Helper function to map HTTP transport errors to BackendError
fn map_http_error(error: reqwest::Error) -> BackendError {
    if error.is_status() {
        let status = error.status().unwrap_or_default();
        match status.as_u16() {
            401 | 403 => BackendError::AuthFailed(format!("Authentication failed: {}", error)),
            429 => BackendError::RateLimited(format!("Rate limit exceeded: {}", error)),
            404 => BackendError::NotFound(format!("Job not found: {}", error)),
            400..=499 => BackendError::Rejected(format!("Request rejected: {}", error)),
            _ => {
                BackendError::Transient(format!("Request failed with status {}: {}", status, error))
            }
        }
    } else if error.is_timeout() {
        BackendError::Transient(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        BackendError::Transient(format!("Connection error: {}", error))
    } else {
        BackendError::Transient(format!("HTTP error: {}", error))
    }
}

fn map_error_status(status: reqwest::StatusCode, body: String) -> BackendError {
    match status.as_u16() {
        401 | 403 => BackendError::AuthFailed(format!("Authentication failed: {}", body)),
        429 => BackendError::RateLimited(format!("Rate limit exceeded: {}", body)),
        404 => BackendError::NotFound(format!("Job not found: {}", body)),
        400..=499 => BackendError::Rejected(format!("Request rejected: {}", body)),
        _ => BackendError::Transient(format!("Request failed with status {}: {}", status, body)),
    }
}

/// HTTP generation backend speaking the JSON job API.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::Protocol(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn submit(
        &self,
        kind: GenerationKind,
        request: &GenerationRequest,
    ) -> Result<SubmitOutcome, BackendError> {
        let body = SubmitRequestBody {
            kind,
            prompt: &request.prompt,
            model: &request.model,
            aspect_ratio: request.aspect_ratio.as_str(),
            reference_images: request
                .reference_images
                .iter()
                .map(String::as_str)
                .collect(),
            metadata: request
                .metadata
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
        };

        let url = format!("{}/jobs", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_error_status(status, error_text));
        }

        let submitted: SubmitResponseBody = response
            .json()
            .await
            .map_err(|e| BackendError::Protocol(format!("Failed to parse response: {}", e)))?;

        match (submitted.status, submitted.result_url) {
            (RemoteStatus::Succeeded, Some(result_url)) => Ok(SubmitOutcome::Completed {
                remote_id: submitted.job_id,
                result_url,
            }),
            (RemoteStatus::Failed, _) => Err(BackendError::Rejected(
                "Provider reported failure at submission".to_string(),
            )),
            _ => Ok(SubmitOutcome::Accepted {
                remote_id: submitted.job_id,
            }),
        }
    }

    async fn poll_status(&self, remote_id: &str) -> Result<RemotePoll, BackendError> {
        let url = format!("{}/jobs/{}", self.base_url, remote_id);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_error_status(status, error_text));
        }

        let poll: PollResponseBody = response
            .json()
            .await
            .map_err(|e| BackendError::Protocol(format!("Failed to parse response: {}", e)))?;

        Ok(RemotePoll {
            status: poll.status,
            output: poll.output,
            error: poll.error,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
