//! Adloom: creative-asset generation orchestration core.
//!
//! Drives a brand -> product -> generate -> result wizard over an external
//! generation provider. The pipeline composes a prompt from brand context,
//! style modifiers, and template fields, estimates its point cost, dispatches
//! the request, and polls the remote job to a terminal status under a
//! bounded, cancellable budget.
//!
//! Entry point is [`session::Session`], which wires the wizard, dispatcher,
//! and poller over a [`provider::GenerationBackend`] implementation.

pub mod catalog;
pub mod compose;
pub mod config;
pub mod cost;
pub mod dispatch;
pub mod error;
pub mod job;
pub mod logging;
pub mod poller;
pub mod provider;
pub mod session;
pub mod types;
pub mod wizard;

pub use catalog::{Brand, Catalog, InMemoryCatalog, Style, Template};
pub use compose::{compose, ComposeInput, ComposedPrompt};
pub use config::AdloomConfig;
pub use cost::{CostBreakdown, CostEstimator};
pub use dispatch::GenerationDispatcher;
pub use error::{BackendError, OrchestratorError};
pub use job::{ActiveJobs, GenerationJob, JobStatus, SharedJob, UnknownReason};
pub use logging::init_logging;
pub use poller::{JobPoller, PollerHandle, PollerRegistry};
pub use provider::{GenerationBackend, HttpBackend, RemotePoll, RemoteStatus, SubmitOutcome};
pub use session::Session;
pub use types::{AspectRatio, GenerationKind, GenerationRequest, GenerationResult};
pub use wizard::{WizardController, WizardState, WizardStep};
