//! Command definitions for the job queue actor model.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;

use super::{EnqueueOptions, JobId, JobPayload, JobState, QueueError};
use crate::pipeline::PipelineError;

/// Commands that can be sent to the job queue actor.
///
/// Each command carries a response channel for the actor to send back
/// results. Message passing keeps all queue state on one task, so no locks
/// are held across the check/cancel/delete sequences that race with job
/// completion.
pub enum QueueCommand {
    /// Enqueue a new acquisition job.
    Enqueue {
        payload: JobPayload,
        options: EnqueueOptions,
        responder: oneshot::Sender<JobId>,
    },
    /// Look up the current state of a job. None means the job never existed
    /// or was already reaped after reaching a terminal state.
    Job {
        job_id: JobId,
        responder: oneshot::Sender<Option<JobSnapshot>>,
    },
    /// Get snapshots of all currently-executing jobs.
    ActiveJobs {
        responder: oneshot::Sender<Vec<JobSnapshot>>,
    },
    /// Cancel a queued or running job.
    Cancel {
        job_id: JobId,
        responder: oneshot::Sender<Result<(), QueueError>>,
    },
    /// Shutdown the queue actor, aborting any running jobs.
    Shutdown { responder: oneshot::Sender<()> },
}

/// Point-in-time view of a job.
///
/// Snapshots are produced on demand; the queue is always the source of
/// truth since jobs complete concurrently with API calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    /// Queue identifier for this job
    pub id: JobId,
    /// Current lifecycle state
    pub state: JobState,
    /// Work order the job was enqueued with
    pub payload: JobPayload,
    /// When the job entered the queue
    pub enqueued_at: DateTime<Utc>,
    /// Automatic retries consumed so far
    pub attempts_made: u32,
}

/// Internal notification from a worker task back to the actor.
#[derive(Debug)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub result: Result<PathBuf, PipelineError>,
}
