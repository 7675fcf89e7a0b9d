//! Generation job records and their lifecycle.
//!
//! Jobs are created `Pending` by the dispatcher and advanced only through
//! [`GenerationJob`] transition methods, which enforce that terminal states
//! are never overwritten. Shared ownership between dispatcher, poller, and
//! wizard goes through [`SharedJob`].

use crate::types::{now_millis, GenerationKind};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Remote lifecycle of one generation job.
///
/// `Succeeded` and `Failed` are terminal. `Unknown` is terminal for the
/// session: the remote job may still finish, but this session has stopped
/// watching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Unknown
        )
    }

    /// Whether the job still occupies its kind's active slot.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Processing)
    }
}

/// Why a job ended `Unknown`. Kept on the record for diagnostics; the
/// observable status is `Unknown` either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownReason {
    /// The poll budget ran out without a terminal remote status.
    BudgetExhausted,
    /// The remote reported the job does not exist.
    RemoteNotFound,
}

/// One dispatched generation, shared between dispatcher, poller, and wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    pub id: String,
    pub kind: GenerationKind,
    pub status: JobStatus,
    /// Remote identifier once submission is acknowledged.
    #[serde(default)]
    pub remote_id: Option<String>,
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub unknown_reason: Option<UnknownReason>,
    /// Set when this job was spawned from another job's output, e.g. a
    /// lip-sync video derived from a generated image.
    #[serde(default)]
    pub derived_from_job_id: Option<String>,
    /// The prompt that was submitted, kept for audit and re-use.
    pub prompt: String,
    pub model: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl GenerationJob {
    pub fn new(id: String, kind: GenerationKind, prompt: String, model: String) -> Self {
        let now = now_millis();
        Self {
            id,
            kind,
            status: JobStatus::Pending,
            remote_id: None,
            result_url: None,
            error: None,
            unknown_reason: None,
            derived_from_job_id: None,
            prompt,
            model,
            created_at_ms: now,
            updated_at_ms: now,
        }
    }

    /// Move to `Processing`. No-op once terminal.
    pub fn mark_processing(&mut self) {
        self.transition(JobStatus::Processing, None, None, None);
    }

    pub fn mark_succeeded(&mut self, result_url: String) {
        self.transition(JobStatus::Succeeded, Some(result_url), None, None);
    }

    pub fn mark_failed(&mut self, error: String) {
        self.transition(JobStatus::Failed, None, Some(error), None);
    }

    pub fn mark_unknown(&mut self, reason: UnknownReason) {
        self.transition(JobStatus::Unknown, None, None, Some(reason));
    }

    fn transition(
        &mut self,
        status: JobStatus,
        result_url: Option<String>,
        error: Option<String>,
        unknown_reason: Option<UnknownReason>,
    ) {
        if self.status.is_terminal() {
            warn!(
                job_id = %self.id,
                from = ?self.status,
                to = ?status,
                "ignoring status transition on terminal job"
            );
            return;
        }
        // Pending -> Pending / Processing -> Processing are harmless repeats.
        debug!(job_id = %self.id, from = ?self.status, to = ?status, "job status transition");
        self.status = status;
        if result_url.is_some() {
            self.result_url = result_url;
        }
        if error.is_some() {
            self.error = error;
        }
        if unknown_reason.is_some() {
            self.unknown_reason = unknown_reason;
        }
        self.updated_at_ms = now_millis();
    }
}

/// Shared, lock-guarded handle to a job record.
pub type SharedJob = Arc<RwLock<GenerationJob>>;

pub fn shared(job: GenerationJob) -> SharedJob {
    Arc::new(RwLock::new(job))
}

/// Per-kind registry of in-flight jobs.
///
/// Enforces the one-active-job-per-kind rule: a slot is occupied while its
/// job is `Pending` or `Processing`, and frees itself once the job reaches a
/// terminal status.
#[derive(Debug, Default, Clone)]
pub struct ActiveJobs {
    slots: Arc<RwLock<HashMap<GenerationKind, SharedJob>>>,
}

impl ActiveJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `kind`. Fails if an active same-kind job holds it.
    pub fn try_register(&self, kind: GenerationKind, job: SharedJob) -> Result<(), SharedJob> {
        let mut slots = self.slots.write();
        if let Some(existing) = slots.get(&kind) {
            if existing.read().status.is_active() {
                return Err(Arc::clone(existing));
            }
        }
        slots.insert(kind, job);
        Ok(())
    }

    pub fn get(&self, kind: GenerationKind) -> Option<SharedJob> {
        self.slots.read().get(&kind).cloned()
    }

    /// Whether an active (pending/processing) job occupies the slot.
    pub fn is_busy(&self, kind: GenerationKind) -> bool {
        self.slots
            .read()
            .get(&kind)
            .map(|job| job.read().status.is_active())
            .unwrap_or(false)
    }

    pub fn clear(&self, kind: GenerationKind) -> Option<SharedJob> {
        self.slots.write().remove(&kind)
    }

    pub fn clear_all(&self) -> Vec<SharedJob> {
        self.slots.write().drain().map(|(_, job)| job).collect()
    }
}
