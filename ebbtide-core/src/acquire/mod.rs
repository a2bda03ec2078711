//! Acquisition submission and lifecycle reconciliation.
//!
//! Policy layer over the job queue: derive a submission's identity, enqueue
//! it with fixed queue options, and on deletion reconcile the record
//! against whatever its job is doing right now.

pub mod identity;

use std::time::Duration;

use uuid::Uuid;

pub use identity::MagnetIdentity;

use crate::library::MediaRecord;
use crate::queue::{EnqueueOptions, JobId, JobPayload, JobQueueHandle, QueueError};

/// Errors produced during submission.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("Malformed magnet link: {reason}")]
    MalformedMagnet { reason: String },

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

/// Correlation data handed back to the caller after a submission.
///
/// The caller persists these alongside the record; the dispatcher itself
/// stores nothing.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub job_id: JobId,
    pub filename: String,
    pub token: Uuid,
}

/// Result of a best-effort cancellation before record deletion.
///
/// None of these block deletion; callers log and proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The job was still live and a cancellation was delivered
    Cancelled,
    /// No job to cancel: already reaped by auto-removal, or in a terminal
    /// state. The expected common case.
    AlreadyGone,
    /// The job completed between the active check and the cancel call
    Raced,
    /// The queue rejected the attempt or the bounded wait elapsed
    Failed { reason: String },
}

/// Submission and teardown policy around the job queue.
#[derive(Debug, Clone)]
pub struct AcquisitionService {
    queue: JobQueueHandle,
    cancel_timeout: Duration,
}

impl AcquisitionService {
    /// Creates the service over a queue handle.
    ///
    /// `cancel_timeout` bounds how long a deletion waits on a cancellation
    /// attempt before proceeding regardless of outcome.
    pub fn new(queue: JobQueueHandle, cancel_timeout: Duration) -> Self {
        Self {
            queue,
            cancel_timeout,
        }
    }

    /// Derives identity for a magnet link and enqueues its acquisition.
    ///
    /// Queue policy is fixed: no automatic retry (failures surface instead
    /// of being masked), terminal jobs are removed from the queue store,
    /// and the newest submission is dequeued first.
    ///
    /// # Errors
    /// - `AcquireError::MalformedMagnet` - Display name missing or link invalid
    /// - `AcquireError::Queue` - Queue rejected the enqueue
    pub async fn submit(&self, magnet_link: &str) -> Result<SubmitReceipt, AcquireError> {
        let identity = identity::derive(magnet_link)?;

        let payload = JobPayload {
            magnet_link: magnet_link.to_string(),
            filename: identity.filename.clone(),
            token: identity.token,
        };
        let options = EnqueueOptions {
            attempts: 0,
            remove_on_complete: true,
            remove_on_fail: true,
            lifo: true,
        };

        let job_id = self.queue.enqueue(payload, options).await?;

        tracing::info!(
            job_id = %job_id,
            filename = %identity.filename,
            "acquisition dispatched"
        );

        Ok(SubmitReceipt {
            job_id,
            filename: identity.filename,
            token: identity.token,
        })
    }

    /// Best-effort cancellation of the job producing `record`, invoked
    /// before the record is deleted.
    ///
    /// The job may finish microseconds after the active check; that race is
    /// inherent, so a failed cancellation is reported, never an error. The
    /// cancel call itself is bounded by the configured timeout so a hung
    /// queue cannot stall deletion.
    pub async fn cancel_for_record(&self, record: &MediaRecord) -> CancelOutcome {
        let snapshot = match self.queue.job(record.job_id).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                return CancelOutcome::Failed {
                    reason: error.to_string(),
                };
            }
        };

        let Some(snapshot) = snapshot else {
            return CancelOutcome::AlreadyGone;
        };
        if !snapshot.state.is_active() {
            return CancelOutcome::AlreadyGone;
        }

        match tokio::time::timeout(self.cancel_timeout, self.queue.cancel(record.job_id)).await {
            Ok(Ok(())) => CancelOutcome::Cancelled,
            Ok(Err(QueueError::JobNotFound { .. })) => CancelOutcome::Raced,
            Ok(Err(error)) => CancelOutcome::Failed {
                reason: error.to_string(),
            },
            Err(_) => CancelOutcome::Failed {
                reason: format!(
                    "cancellation did not settle within {:?}",
                    self.cancel_timeout
                ),
            },
        }
    }
}
