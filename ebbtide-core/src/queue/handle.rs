//! Handle for communicating with the job queue actor.

use tokio::sync::{mpsc, oneshot};

use super::commands::{JobSnapshot, QueueCommand};
use super::{EnqueueOptions, JobId, JobPayload, QueueError};

/// Handle for communicating with the job queue actor.
///
/// Provides an ergonomic async API for sending commands to the queue. It
/// can be cloned and shared across tasks safely.
#[derive(Debug, Clone)]
pub struct JobQueueHandle {
    sender: mpsc::Sender<QueueCommand>,
}

impl JobQueueHandle {
    /// Creates a new handle with the given command sender.
    pub fn new(sender: mpsc::Sender<QueueCommand>) -> Self {
        Self { sender }
    }

    /// Enqueues an acquisition job and returns its identifier.
    ///
    /// The job becomes runnable immediately; this call never waits for
    /// execution to finish.
    ///
    /// # Errors
    /// - `QueueError::Shutdown` - The queue actor is no longer running
    pub async fn enqueue(
        &self,
        payload: JobPayload,
        options: EnqueueOptions,
    ) -> Result<JobId, QueueError> {
        let (responder, rx) = oneshot::channel();
        let cmd = QueueCommand::Enqueue {
            payload,
            options,
            responder,
        };

        self.sender.send(cmd).await.map_err(|_| QueueError::Shutdown)?;

        rx.await.map_err(|_| QueueError::Shutdown)
    }

    /// Looks up a job's current snapshot.
    ///
    /// Returns None for jobs that were reaped after reaching a terminal
    /// state, which is the expected common case under auto-removal.
    ///
    /// # Errors
    /// - `QueueError::Shutdown` - The queue actor is no longer running
    pub async fn job(&self, job_id: JobId) -> Result<Option<JobSnapshot>, QueueError> {
        let (responder, rx) = oneshot::channel();
        let cmd = QueueCommand::Job { job_id, responder };

        self.sender.send(cmd).await.map_err(|_| QueueError::Shutdown)?;

        rx.await.map_err(|_| QueueError::Shutdown)
    }

    /// Gets snapshots of all currently-executing jobs.
    ///
    /// # Errors
    /// - `QueueError::Shutdown` - The queue actor is no longer running
    pub async fn active_jobs(&self) -> Result<Vec<JobSnapshot>, QueueError> {
        let (responder, rx) = oneshot::channel();
        let cmd = QueueCommand::ActiveJobs { responder };

        self.sender.send(cmd).await.map_err(|_| QueueError::Shutdown)?;

        rx.await.map_err(|_| QueueError::Shutdown)
    }

    /// Cancels a queued or running job.
    ///
    /// # Errors
    /// - `QueueError::JobNotFound` - Job already finished or never existed
    /// - `QueueError::Shutdown` - The queue actor is no longer running
    pub async fn cancel(&self, job_id: JobId) -> Result<(), QueueError> {
        let (responder, rx) = oneshot::channel();
        let cmd = QueueCommand::Cancel { job_id, responder };

        self.sender.send(cmd).await.map_err(|_| QueueError::Shutdown)?;

        rx.await.map_err(|_| QueueError::Shutdown)?
    }

    /// Shuts down the queue actor, aborting running jobs.
    ///
    /// # Errors
    /// - `QueueError::Shutdown` - The queue actor already stopped
    pub async fn shutdown(&self) -> Result<(), QueueError> {
        let (responder, rx) = oneshot::channel();
        let cmd = QueueCommand::Shutdown { responder };

        self.sender.send(cmd).await.map_err(|_| QueueError::Shutdown)?;

        rx.await.map_err(|_| QueueError::Shutdown)
    }

    /// Checks if the queue actor is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}
