//! Scripted in-memory backend.
//!
//! Plays back a fixed sequence of submit and poll responses, counting calls,
//! so dispatcher and poller behavior can be exercised without a network.

use crate::error::BackendError;
use crate::provider::{GenerationBackend, RemotePoll, RemoteStatus, SubmitOutcome};
use crate::types::{GenerationKind, GenerationRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

/// Backend that replays scripted responses.
///
/// When the poll script runs dry the backend keeps answering `Processing`,
/// which is what a stuck remote job looks like to the poller.
#[derive(Default)]
pub struct ScriptedBackend {
    submit_script: Mutex<VecDeque<Result<SubmitOutcome, BackendError>>>,
    poll_script: Mutex<VecDeque<Result<RemotePoll, BackendError>>>,
    submit_calls: AtomicU32,
    poll_calls: AtomicU32,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an accepted submission with the given remote id.
    pub fn submit_accepted(self, remote_id: &str) -> Self {
        self.submit_script
            .lock()
            .push_back(Ok(SubmitOutcome::Accepted {
                remote_id: remote_id.to_string(),
            }));
        self
    }

    /// Queue a submission that completes synchronously.
    pub fn submit_completed(self, remote_id: &str, result_url: &str) -> Self {
        self.submit_script
            .lock()
            .push_back(Ok(SubmitOutcome::Completed {
                remote_id: remote_id.to_string(),
                result_url: result_url.to_string(),
            }));
        self
    }

    /// Queue a submission failure.
    pub fn submit_error(self, error: BackendError) -> Self {
        self.submit_script.lock().push_back(Err(error));
        self
    }

    /// Queue one poll response.
    pub fn then_poll(self, poll: RemotePoll) -> Self {
        self.poll_script.lock().push_back(Ok(poll));
        self
    }

    /// Queue `n` consecutive `Processing` polls.
    pub fn then_processing(self, n: usize) -> Self {
        {
            let mut script = self.poll_script.lock();
            for _ in 0..n {
                script.push_back(Ok(RemotePoll {
                    status: RemoteStatus::Processing,
                    output: Vec::new(),
                    error: None,
                }));
            }
        }
        self
    }

    /// Queue a successful terminal poll carrying one output URL.
    pub fn then_succeeded(self, url: &str) -> Self {
        self.then_poll(RemotePoll {
            status: RemoteStatus::Succeeded,
            output: vec![url.to_string()],
            error: None,
        })
    }

    /// Queue a failed terminal poll.
    pub fn then_failed(self, error: &str) -> Self {
        self.then_poll(RemotePoll {
            status: RemoteStatus::Failed,
            output: Vec::new(),
            error: Some(error.to_string()),
        })
    }

    /// Queue a poll-level error.
    pub fn then_poll_error(self, error: BackendError) -> Self {
        self.poll_script.lock().push_back(Err(error));
        self
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn submit(
        &self,
        _kind: GenerationKind,
        _request: &GenerationRequest,
    ) -> Result<SubmitOutcome, BackendError> {
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst);
        match self.submit_script.lock().pop_front() {
            Some(outcome) => outcome,
            None => Ok(SubmitOutcome::Accepted {
                remote_id: format!("scripted-{}", n),
            }),
        }
    }

    async fn poll_status(&self, _remote_id: &str) -> Result<RemotePoll, BackendError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        match self.poll_script.lock().pop_front() {
            Some(poll) => poll,
            None => Ok(RemotePoll {
                status: RemoteStatus::Processing,
                output: Vec::new(),
                error: None,
            }),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
