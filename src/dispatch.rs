//! Dispatches composed requests to a generation backend and owns the job
//! record through submission.
//!
//! The job is created `Pending` and the per-kind slot claimed before any
//! network activity, so a concurrent same-kind dispatch is rejected even
//! while the first submit call is still in flight. Synchronous provider
//! rejection is an outcome, not an error: the returned handle carries a
//! `Failed` job and the slot frees itself.

use crate::error::OrchestratorError;
use crate::job::{shared, ActiveJobs, GenerationJob, SharedJob};
use crate::provider::{GenerationBackend, SubmitOutcome};
use crate::types::{new_job_id, GenerationKind, GenerationRequest};
use std::sync::Arc;
use tracing::{info, warn};

pub struct GenerationDispatcher {
    backend: Arc<dyn GenerationBackend>,
    active: ActiveJobs,
}

impl GenerationDispatcher {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            active: ActiveJobs::new(),
        }
    }

    pub fn active_jobs(&self) -> &ActiveJobs {
        &self.active
    }

    /// Submit a request and return the shared job handle.
    ///
    /// Fails with `ConcurrentDispatch` while a same-kind job is active and
    /// with `Validation` on an empty prompt or model; both are caught before
    /// the network layer.
    pub async fn dispatch(
        &self,
        kind: GenerationKind,
        request: GenerationRequest,
    ) -> Result<SharedJob, OrchestratorError> {
        self.dispatch_inner(kind, request, None).await
    }

    /// Like [`dispatch`](Self::dispatch), for a job derived from another
    /// job's output (e.g. lip-sync video from a generated image).
    pub async fn dispatch_derived(
        &self,
        kind: GenerationKind,
        request: GenerationRequest,
        source_job_id: String,
    ) -> Result<SharedJob, OrchestratorError> {
        self.dispatch_inner(kind, request, Some(source_job_id)).await
    }

    async fn dispatch_inner(
        &self,
        kind: GenerationKind,
        request: GenerationRequest,
        derived_from: Option<String>,
    ) -> Result<SharedJob, OrchestratorError> {
        if request.prompt.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "prompt must not be empty".to_string(),
            ));
        }
        if request.model.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "model must not be empty".to_string(),
            ));
        }

        let mut job = GenerationJob::new(
            new_job_id(kind),
            kind,
            request.prompt.clone(),
            request.model.clone(),
        );
        job.derived_from_job_id = derived_from;
        let job_id = job.id.clone();
        let handle = shared(job);

        // Claim the per-kind slot before touching the network.
        if self
            .active
            .try_register(kind, Arc::clone(&handle))
            .is_err()
        {
            return Err(OrchestratorError::ConcurrentDispatch { kind });
        }

        info!(job_id = %job_id, %kind, backend = self.backend.name(), "dispatching generation");

        match self.backend.submit(kind, &request).await {
            Ok(SubmitOutcome::Accepted { remote_id }) => {
                let mut job = handle.write();
                job.remote_id = Some(remote_id);
                job.mark_processing();
            }
            Ok(SubmitOutcome::Completed {
                remote_id,
                result_url,
            }) => {
                let mut job = handle.write();
                job.remote_id = Some(remote_id);
                job.mark_succeeded(result_url);
                info!(job_id = %job_id, "generation completed at submission");
            }
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "submission failed");
                handle.write().mark_failed(err.to_string());
            }
        }

        Ok(handle)
    }
}
