//! Bounded, cancellable polling of dispatched jobs.
//!
//! One tokio task per watched job, ticking at the configured interval until
//! the remote reports a terminal status or the per-kind poll budget runs
//! out. Budget exhaustion marks the job `Unknown`, never `Failed`: the
//! remote job may still finish, this session has just stopped watching.
//!
//! Cancellation goes through a `watch` channel and never mutates the job's
//! last-known status. The registry keeps one live watcher per job id, so a
//! second `start` for the same job is a no-op.

use crate::config::PollingConfig;
use crate::error::BackendError;
use crate::job::{JobStatus, SharedJob, UnknownReason};
use crate::provider::{GenerationBackend, RemoteStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Tracks which jobs currently have a live watcher.
#[derive(Debug, Default, Clone)]
pub struct PollerRegistry {
    watchers: Arc<Mutex<HashMap<String, watch::Sender<bool>>>>,
}

impl PollerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_insert(&self, job_id: &str) -> Option<(watch::Sender<bool>, watch::Receiver<bool>)> {
        let mut watchers = self.watchers.lock();
        if watchers.contains_key(job_id) {
            return None;
        }
        let (tx, rx) = watch::channel(false);
        watchers.insert(job_id.to_string(), tx.clone());
        Some((tx, rx))
    }

    fn remove(&self, job_id: &str) {
        self.watchers.lock().remove(job_id);
    }

    pub fn is_watching(&self, job_id: &str) -> bool {
        self.watchers.lock().contains_key(job_id)
    }

    /// Stop the watcher for one job, if any. The job keeps its last status.
    pub fn cancel(&self, job_id: &str) {
        if let Some(tx) = self.watchers.lock().remove(job_id) {
            let _ = tx.send(true);
        }
    }

    /// Stop every live watcher (session reset).
    pub fn cancel_all(&self) {
        for (_, tx) in self.watchers.lock().drain() {
            let _ = tx.send(true);
        }
    }
}

/// Handle to one polling task.
pub struct PollerHandle {
    job: SharedJob,
    join: JoinHandle<()>,
    cancel: watch::Sender<bool>,
}

impl PollerHandle {
    pub fn job(&self) -> &SharedJob {
        &self.job
    }

    /// Stop polling without touching the job's status.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Wait for the polling task to finish and return the job's final
    /// status (terminal, or last-known if the task was cancelled).
    pub async fn wait(self) -> JobStatus {
        // A panicked watcher task leaves the job at its last-known status.
        let _ = self.join.await;
        let status = self.job.read().status;
        status
    }
}

pub struct JobPoller {
    backend: Arc<dyn GenerationBackend>,
    config: PollingConfig,
    registry: PollerRegistry,
}

impl JobPoller {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: PollingConfig) -> Self {
        Self {
            backend,
            config,
            registry: PollerRegistry::new(),
        }
    }

    pub fn registry(&self) -> &PollerRegistry {
        &self.registry
    }

    /// Start watching a dispatched job.
    ///
    /// Returns `None` when there is nothing to watch: the job is already
    /// terminal, has no remote id, or a watcher for it is already running.
    pub fn start(&self, job: SharedJob) -> Option<PollerHandle> {
        let (job_id, remote_id, kind) = {
            let guard = job.read();
            if guard.status.is_terminal() {
                debug!(job_id = %guard.id, status = ?guard.status, "job already terminal, not polling");
                return None;
            }
            let remote_id = match &guard.remote_id {
                Some(id) => id.clone(),
                None => {
                    warn!(job_id = %guard.id, "job has no remote id, not polling");
                    return None;
                }
            };
            (guard.id.clone(), remote_id, guard.kind)
        };

        let (cancel_tx, mut cancel_rx) = self.registry.try_insert(&job_id)?;

        let backend = Arc::clone(&self.backend);
        let registry = self.registry.clone();
        let budget = self.config.budget_for(kind);
        let interval = self.config.interval();
        let task_job = Arc::clone(&job);
        let task_job_id = job_id.clone();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick fires immediately; skip it so poll #1
            // lands one interval after dispatch.
            ticker.tick().await;

            let mut polls: u32 = 0;
            let mut cancelled = false;

            while polls < budget {
                tokio::select! {
                    changed = cancel_rx.changed() => {
                        // Either an explicit cancel or the registry dropped.
                        if changed.is_err() || *cancel_rx.borrow() {
                            cancelled = true;
                            break;
                        }
                    }
                    _ = ticker.tick() => {}
                }
                if cancelled {
                    break;
                }
                polls += 1;

                match backend.poll_status(&remote_id).await {
                    Ok(poll) => {
                        debug!(job_id = %task_job_id, poll = polls, status = ?poll.status, "poll result");
                        match poll.status {
                            RemoteStatus::Succeeded => {
                                if let Some(url) = poll.first_output() {
                                    task_job.write().mark_succeeded(url.to_string());
                                    info!(job_id = %task_job_id, polls, "generation succeeded");
                                    break;
                                }
                                // Succeeded without output: the provider is
                                // still finalizing permanent storage.
                                debug!(job_id = %task_job_id, "succeeded without output, continuing");
                            }
                            RemoteStatus::Failed => {
                                let message = poll
                                    .error
                                    .unwrap_or_else(|| "Generation failed".to_string());
                                task_job.write().mark_failed(message);
                                break;
                            }
                            RemoteStatus::Pending | RemoteStatus::Processing => {
                                task_job.write().mark_processing();
                            }
                        }
                    }
                    Err(BackendError::NotFound(message)) => {
                        warn!(job_id = %task_job_id, %message, "remote job not found");
                        task_job.write().mark_unknown(UnknownReason::RemoteNotFound);
                        break;
                    }
                    Err(err) if err.is_transient() || matches!(err, BackendError::RateLimited(_)) => {
                        // Consumes the tick; retried on the next one.
                        warn!(job_id = %task_job_id, error = %err, "transient poll error");
                    }
                    Err(err) => {
                        warn!(job_id = %task_job_id, error = %err, "poll failed");
                        task_job.write().mark_failed(err.to_string());
                        break;
                    }
                }
            }

            if !cancelled && !task_job.read().status.is_terminal() {
                info!(job_id = %task_job_id, polls, "poll budget exhausted");
                task_job.write().mark_unknown(UnknownReason::BudgetExhausted);
            }

            registry.remove(&task_job_id);
        });

        Some(PollerHandle {
            job,
            join,
            cancel: cancel_tx,
        })
    }
}
