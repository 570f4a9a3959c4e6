//! The job dispatcher: one worker thread per in-flight job.

use super::request::WorkRequest;
use super::result::{JobId, WorkError, WorkResult};
use super::work;
use crate::cache::DataCache;
use crate::fetch::{FetchError, FetchErrorKind};
use crate::provider::LineDataProvider;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, info, warn};

/// Lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Accepted, worker thread not yet running.
    Pending,
    /// Worker thread executing the operation.
    Running,
    /// Finished and delivered (or delivery already under way).
    Completed,
    /// Cancelled by the caller; delivery suppressed.
    Cancelled,
}

impl JobState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::Running,
            2 => Self::Completed,
            _ => Self::Cancelled,
        }
    }

    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

struct JobInner {
    id: JobId,
    state: AtomicU8,
    cancelled: AtomicBool,
}

impl JobInner {
    fn new(id: JobId) -> Self {
        Self {
            id,
            state: AtomicU8::new(JobState::Pending as u8),
            cancelled: AtomicBool::new(false),
        }
    }

    fn set_state(&self, state: JobState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::SeqCst))
    }
}

/// Handle to a dispatched job.
///
/// Cloneable; all clones observe the same job. The handle only reports;
/// cancellation goes through [`JobDispatcher::cancel`] so the dispatcher's
/// bookkeeping stays consistent.
#[derive(Clone)]
pub struct JobHandle {
    inner: Arc<JobInner>,
}

impl JobHandle {
    /// The job's unique identity.
    pub fn id(&self) -> JobId {
        self.inner.id
    }

    /// The job's current lifecycle state.
    pub fn state(&self) -> JobState {
        self.inner.state()
    }

    /// Whether the job has completed or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }
}

impl std::fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}

/// Runs operations on background worker threads and routes typed results
/// back to caller-supplied continuations.
///
/// The cache and provider are injected so callers (and tests) control the
/// world each execution unit sees.
pub struct JobDispatcher {
    cache: Arc<DataCache>,
    provider: Arc<dyn LineDataProvider>,
    next_job_id: AtomicU64,
    jobs: Arc<Mutex<HashMap<u64, Arc<JobInner>>>>,
    /// Submission-boundary gate: at most one fetch job in flight.
    fetch_in_flight: Arc<AtomicBool>,
}

impl JobDispatcher {
    pub fn new(cache: Arc<DataCache>, provider: Arc<dyn LineDataProvider>) -> Self {
        Self {
            cache,
            provider,
            next_job_id: AtomicU64::new(0),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            fetch_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Dispatches a request onto a fresh worker thread.
    ///
    /// Returns immediately; the continuation runs on the worker thread when
    /// the operation finishes. Fetch requests are validated here first: an
    /// empty isotopologue selection fails synchronously without starting a
    /// job, and a second fetch while one is in flight is rejected with
    /// [`WorkError::FetchInFlight`]. A worker thread that cannot be started
    /// is reported as [`FetchErrorKind::FailedToOpenThread`].
    pub fn dispatch<F>(&self, request: WorkRequest, on_complete: F) -> Result<JobHandle, WorkError>
    where
        F: FnOnce(WorkResult) + Send + 'static,
    {
        let is_fetch = matches!(request, WorkRequest::Fetch(_));
        if let WorkRequest::Fetch(ref req) = request {
            if req.iso_id_list.is_empty() {
                return Err(FetchError::new(
                    FetchErrorKind::BadIsoList,
                    "fetch failure: select at least one isotopologue",
                )
                .into());
            }
            if self.fetch_in_flight.swap(true, Ordering::SeqCst) {
                return Err(WorkError::FetchInFlight);
            }
        }

        let id = JobId(self.next_job_id.fetch_add(1, Ordering::SeqCst));
        let inner = Arc::new(JobInner::new(id));
        self.jobs.lock().unwrap().insert(id.as_u64(), inner.clone());

        let cache = Arc::clone(&self.cache);
        let provider = Arc::clone(&self.provider);
        let jobs = Arc::clone(&self.jobs);
        let fetch_gate = Arc::clone(&self.fetch_in_flight);
        let worker_inner = Arc::clone(&inner);
        let operation = request.operation_name();

        debug!(job = %id, operation, "dispatching");
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", operation, id))
            .spawn(move || {
                // Never overwrite a Cancelled state that raced ahead of us.
                let _ = worker_inner.state.compare_exchange(
                    JobState::Pending as u8,
                    JobState::Running as u8,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );

                let outcome = work::run(&cache, provider.as_ref(), request);

                if is_fetch {
                    fetch_gate.store(false, Ordering::SeqCst);
                }

                // Bookkeeping removal and the cancellation check happen under
                // the same lock `cancel` uses, so a cancel either beats this
                // point (flag observed, delivery suppressed) or finds the
                // entry already gone and reports false.
                let cancelled = {
                    let mut jobs = jobs.lock().unwrap();
                    jobs.remove(&worker_inner.id.as_u64());
                    worker_inner.cancelled.load(Ordering::SeqCst)
                };
                if cancelled {
                    debug!(job = %worker_inner.id, "result dropped for cancelled job");
                    return;
                }
                worker_inner.set_state(JobState::Completed);
                if let Err(error) = &outcome {
                    info!(job = %worker_inner.id, %error, "job failed");
                }
                on_complete(WorkResult {
                    job_id: worker_inner.id,
                    outcome,
                });
            });

        if let Err(e) = spawned {
            warn!(job = %id, error = %e, "worker thread could not be started");
            self.jobs.lock().unwrap().remove(&id.as_u64());
            if is_fetch {
                self.fetch_in_flight.store(false, Ordering::SeqCst);
            }
            return Err(FetchError::new(
                FetchErrorKind::FailedToOpenThread,
                format!("failed to start a worker thread: {}", e),
            )
            .into());
        }

        Ok(JobHandle { inner })
    }

    /// Cancels a job.
    ///
    /// Cancellation is advisory: it marks the job as no longer of interest
    /// and drops its bookkeeping entry, which suppresses delivery of the
    /// result. It does NOT preempt a computation that is already running:
    /// the underlying numerical routines are not interruptible, so the
    /// worker thread runs to completion and its result is discarded.
    ///
    /// Returns whether a live job with that identity existed.
    pub fn cancel(&self, id: JobId) -> bool {
        // Flag and remove under one lock acquisition; see the worker's
        // matching critical section.
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.remove(&id.as_u64()) {
            Some(inner) => {
                inner.cancelled.store(true, Ordering::SeqCst);
                inner.set_state(JobState::Cancelled);
                info!(job = %id, "job cancelled");
                true
            }
            None => false,
        }
    }

    /// Number of jobs currently tracked (dispatched, not yet finished or
    /// cancelled).
    pub fn active_jobs(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Table;
    use crate::provider::ProviderError;
    use std::sync::mpsc;
    use tempfile::TempDir;

    struct NullProvider;

    impl LineDataProvider for NullProvider {
        fn fetch_by_ids(
            &self,
            _name: &str,
            _iso_ids: &[u32],
            numin: f64,
            numax: f64,
            _parameter_groups: &[String],
            _parameters: &[String],
        ) -> Result<Table, ProviderError> {
            Err(ProviderError::EmptyResult { numin, numax })
        }

        fn fetch_cross_section(&self, name: &str) -> Result<Vec<u8>, ProviderError> {
            Err(ProviderError::Http(format!("no such file {}", name)))
        }
    }

    fn dispatcher() -> (TempDir, JobDispatcher) {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(DataCache::new(dir.path()).unwrap());
        (dir, JobDispatcher::new(cache, Arc::new(NullProvider)))
    }

    #[test]
    fn test_job_state_round_trip() {
        for state in [
            JobState::Pending,
            JobState::Running,
            JobState::Completed,
            JobState::Cancelled,
        ] {
            assert_eq!(JobState::from_u8(state as u8), state);
        }
    }

    #[test]
    fn test_dispatch_returns_without_blocking() {
        let (_dir, dispatcher) = dispatcher();
        let (tx, rx) = mpsc::channel();
        let handle = dispatcher
            .dispatch(WorkRequest::TableNames, move |result| {
                let _ = tx.send(result);
            })
            .unwrap();
        let result = rx.recv().unwrap();
        assert_eq!(result.job_id, handle.id());
        assert!(result.outcome.is_ok());
    }

    #[test]
    fn test_cancel_unknown_job() {
        let (_dir, dispatcher) = dispatcher();
        assert!(!dispatcher.cancel(JobId(999)));
    }

    #[test]
    fn test_handle_reaches_terminal_state() {
        let (_dir, dispatcher) = dispatcher();
        let (tx, rx) = mpsc::channel();
        let handle = dispatcher
            .dispatch(WorkRequest::TableNames, move |result| {
                let _ = tx.send(result);
            })
            .unwrap();
        rx.recv().unwrap();
        assert_eq!(handle.state(), JobState::Completed);
        assert!(handle.is_finished());
        assert_eq!(dispatcher.active_jobs(), 0);
    }
}
