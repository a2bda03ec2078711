//! In-process acquisition job queue built on the actor model.
//!
//! The queue owns job execution: callers talk to it through a cloneable
//! handle, and a single actor task serializes all state changes. Terminal
//! jobs are removed from the queue by default; the durable trace of
//! completed work lives in the media library, not here.

pub mod actor;
pub mod commands;
pub mod core;
pub mod handle;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use actor::spawn_job_queue;
pub use commands::{JobOutcome, JobSnapshot, QueueCommand};
pub use handle::JobQueueHandle;

/// Identifier of a queued acquisition job.
///
/// Assigned sequentially by the queue at enqueue time. Identifies the job
/// for lookup and cancellation until its terminal state is reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(u64);

impl JobId {
    /// Creates JobId from a raw queue sequence number.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying sequence number.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current state of a job inside the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Waiting for a worker slot
    Queued,
    /// Being executed by the pipeline
    Active,
    /// Finished successfully (visible only when auto-removal is disabled)
    Completed,
    /// Finished unsuccessfully (visible only when auto-removal is disabled)
    Failed,
}

impl JobState {
    /// Check whether a job in this state is still executing.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Work order handed to the pipeline for one acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    /// Original acquisition source
    pub magnet_link: String,
    /// Filename derived from the magnet display name
    pub filename: String,
    /// Token correlating this job with its media record
    pub token: Uuid,
}

/// Per-job queue policy, fixed by the caller at enqueue time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnqueueOptions {
    /// Automatic retries after a failure (0 = fail once, surface it)
    pub attempts: u32,
    /// Drop the job from the queue once it completes
    pub remove_on_complete: bool,
    /// Drop the job from the queue once it fails
    pub remove_on_fail: bool,
    /// Insert at the head of the wait list so the newest job runs first
    pub lifo: bool,
}

/// Errors produced by queue operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueueError {
    #[error("Job queue is shut down")]
    Shutdown,

    #[error("Job {job_id} not found")]
    JobNotFound { job_id: JobId },
}
