//! Background job dispatch.
//!
//! The dispatcher runs named operations off the interactive thread and
//! routes typed results back. Submitting a request allocates a process-wide
//! unique job identity and starts one worker thread for the job; the
//! caller-supplied continuation receives the [`WorkResult`] when the unit
//! finishes, unless the job was cancelled first.
//!
//! Results arrive in completion order, not submission order. Cancellation
//! is advisory: a running computation is never preempted, only its delivery
//! and bookkeeping are dropped.

mod dispatcher;
mod request;
mod result;
mod work;

pub use dispatcher::{JobDispatcher, JobHandle, JobState};
pub use request::{BandsRequest, DownloadXscRequest, SelectRequest, WorkRequest};
pub use result::{JobId, TableMetaData, WorkError, WorkPayload, WorkResult};
