//! Error types for the generation-orchestration core.

use crate::types::GenerationKind;
use thiserror::Error;

/// Transport-level errors from a generation backend.
///
/// The dispatcher and poller translate these into job outcomes; they never
/// escape past the session boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The remote job no longer exists. Distinct from every poll status so
    /// the poller can stop immediately instead of burning its budget.
    #[error("Remote job not found: {0}")]
    NotFound(String),

    /// Network blip or timeout; the poller retries on the next tick.
    #[error("Transient transport error: {0}")]
    Transient(String),

    #[error("Malformed provider response: {0}")]
    Protocol(String),
}

impl BackendError {
    /// Whether a poll that failed this way should be retried on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Transient(_))
    }
}

/// Orchestration errors surfaced to callers of the wizard/session layer.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A required selection or template field is missing. Caught before
    /// dispatch; never reaches the network layer.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced brand/style/template could not be resolved.
    #[error("Composition failed: {0}")]
    Composition(String),

    /// A same-kind job is still in flight for this session.
    #[error("A {kind} generation job is already active")]
    ConcurrentDispatch { kind: GenerationKind },

    /// The provider synchronously rejected the request. Recorded on the job;
    /// never retried automatically.
    #[error("Provider rejected request: {0}")]
    Provider(String),

    /// Poll budget exhausted without a terminal status. The job is `Unknown`,
    /// which is distinct from `Failed`: check back later rather than treating
    /// the generation as failed.
    #[error("Poll budget exhausted after {polls} polls")]
    PollTimeout { polls: u32 },

    /// Unknown model/resolution pair in a cost table lookup. Programmer
    /// error: fail fast rather than pricing at zero.
    #[error("No pricing entry for model '{model}' at resolution '{resolution}'")]
    Pricing { model: String, resolution: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for OrchestratorError {
    fn from(err: config::ConfigError) -> Self {
        OrchestratorError::Config(err.to_string())
    }
}
