//! Queue state machine executed by the actor.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::commands::{JobOutcome, JobSnapshot};
use super::{EnqueueOptions, JobId, JobPayload, JobState, QueueError};
use crate::config::QueueConfig;
use crate::pipeline::AcquisitionPipeline;

/// A job waiting for a worker slot.
struct PendingJob {
    id: JobId,
    payload: JobPayload,
    options: EnqueueOptions,
    enqueued_at: DateTime<Utc>,
    attempts_made: u32,
}

/// A job currently executing on a worker task.
struct RunningJob {
    payload: JobPayload,
    options: EnqueueOptions,
    enqueued_at: DateTime<Utc>,
    attempts_made: u32,
    handle: JoinHandle<()>,
}

/// Acquisition job queue state.
///
/// Owned exclusively by the actor task; every method runs on that task, so
/// the pending list and running set never need interior locking. Worker
/// tasks report back through the outcome channel rather than touching state
/// directly.
pub struct JobQueue<P> {
    workers: usize,
    pipeline: Arc<P>,
    next_id: u64,
    pending: VecDeque<PendingJob>,
    running: HashMap<JobId, RunningJob>,
    finished: HashMap<JobId, JobSnapshot>,
    outcome_tx: mpsc::UnboundedSender<JobOutcome>,
}

impl<P> JobQueue<P>
where
    P: AcquisitionPipeline + Send + Sync + 'static,
{
    /// Creates a new queue executing jobs on `pipeline`.
    pub fn new(
        config: &QueueConfig,
        pipeline: P,
        outcome_tx: mpsc::UnboundedSender<JobOutcome>,
    ) -> Self {
        Self {
            workers: config.workers.max(1),
            pipeline: Arc::new(pipeline),
            next_id: 1,
            pending: VecDeque::new(),
            running: HashMap::new(),
            finished: HashMap::new(),
            outcome_tx,
        }
    }

    /// Accepts a job and starts it immediately if a worker slot is free.
    pub fn enqueue(&mut self, payload: JobPayload, options: EnqueueOptions) -> JobId {
        let id = JobId::new(self.next_id);
        self.next_id += 1;

        let job = PendingJob {
            id,
            payload,
            options,
            enqueued_at: Utc::now(),
            attempts_made: 0,
        };
        self.admit(job);
        self.fill_slots();
        id
    }

    /// Inserts a pending job honoring its dequeue-order preference.
    ///
    /// LIFO jobs go to the head of the wait list, so the most recently
    /// submitted work is dequeued first.
    fn admit(&mut self, job: PendingJob) {
        if job.options.lifo {
            self.pending.push_front(job);
        } else {
            self.pending.push_back(job);
        }
    }

    /// Starts pending jobs until all worker slots are occupied.
    fn fill_slots(&mut self) {
        while self.running.len() < self.workers {
            let Some(job) = self.pending.pop_front() else {
                break;
            };
            self.start(job);
        }
    }

    fn start(&mut self, job: PendingJob) {
        let pipeline = Arc::clone(&self.pipeline);
        let outcome_tx = self.outcome_tx.clone();
        let payload = job.payload.clone();
        let job_id = job.id;

        let handle = tokio::spawn(async move {
            let result = pipeline.run(&payload).await;
            let _ = outcome_tx.send(JobOutcome { job_id, result });
        });

        tracing::debug!(job_id = %job_id, filename = %job.payload.filename, "acquisition job started");
        self.running.insert(
            job_id,
            RunningJob {
                payload: job.payload,
                options: job.options,
                enqueued_at: job.enqueued_at,
                attempts_made: job.attempts_made,
                handle,
            },
        );
    }

    /// Cancels a queued or running job.
    ///
    /// # Errors
    /// - `QueueError::JobNotFound` - Job already reached a terminal state or
    ///   never existed. Callers racing against completion treat this as
    ///   benign.
    pub fn cancel(&mut self, job_id: JobId) -> Result<(), QueueError> {
        if let Some(pos) = self.pending.iter().position(|job| job.id == job_id) {
            self.pending.remove(pos);
            tracing::debug!(job_id = %job_id, "queued job cancelled");
            return Ok(());
        }

        if let Some(run) = self.running.remove(&job_id) {
            run.handle.abort();
            tracing::info!(job_id = %job_id, "running job cancelled");
            self.fill_slots();
            return Ok(());
        }

        Err(QueueError::JobNotFound { job_id })
    }

    /// Looks up the current snapshot for a job.
    pub fn job(&self, job_id: JobId) -> Option<JobSnapshot> {
        if let Some(job) = self.pending.iter().find(|job| job.id == job_id) {
            return Some(snapshot(
                job.id,
                JobState::Queued,
                &job.payload,
                job.enqueued_at,
                job.attempts_made,
            ));
        }

        if let Some(run) = self.running.get(&job_id) {
            return Some(snapshot(
                job_id,
                JobState::Active,
                &run.payload,
                run.enqueued_at,
                run.attempts_made,
            ));
        }

        self.finished.get(&job_id).cloned()
    }

    /// Snapshots of all jobs currently executing.
    pub fn active_jobs(&self) -> Vec<JobSnapshot> {
        self.running
            .iter()
            .map(|(id, run)| {
                snapshot(*id, JobState::Active, &run.payload, run.enqueued_at, run.attempts_made)
            })
            .collect()
    }

    /// Applies a worker task's result to the queue.
    ///
    /// Outcomes for jobs no longer in the running set are dropped: the job
    /// was cancelled after its result was already in flight.
    pub fn handle_outcome(&mut self, outcome: JobOutcome) {
        let Some(run) = self.running.remove(&outcome.job_id) else {
            return;
        };

        match outcome.result {
            Ok(path) => {
                tracing::info!(
                    job_id = %outcome.job_id,
                    path = %path.display(),
                    "acquisition job completed"
                );
                if !run.options.remove_on_complete {
                    let snap = snapshot(
                        outcome.job_id,
                        JobState::Completed,
                        &run.payload,
                        run.enqueued_at,
                        run.attempts_made,
                    );
                    self.finished.insert(outcome.job_id, snap);
                }
            }
            Err(error) => {
                tracing::warn!(job_id = %outcome.job_id, error = %error, "acquisition job failed");
                if run.attempts_made < run.options.attempts {
                    self.admit(PendingJob {
                        id: outcome.job_id,
                        payload: run.payload,
                        options: run.options,
                        enqueued_at: run.enqueued_at,
                        attempts_made: run.attempts_made + 1,
                    });
                } else if !run.options.remove_on_fail {
                    let snap = snapshot(
                        outcome.job_id,
                        JobState::Failed,
                        &run.payload,
                        run.enqueued_at,
                        run.attempts_made,
                    );
                    self.finished.insert(outcome.job_id, snap);
                }
            }
        }

        self.fill_slots();
    }

    /// Aborts every running job. Used on shutdown.
    pub fn abort_all(&mut self) {
        self.pending.clear();
        for (_, run) in self.running.drain() {
            run.handle.abort();
        }
    }
}

fn snapshot(
    id: JobId,
    state: JobState,
    payload: &JobPayload,
    enqueued_at: DateTime<Utc>,
    attempts_made: u32,
) -> JobSnapshot {
    JobSnapshot {
        id,
        state,
        payload: payload.clone(),
        enqueued_at,
        attempts_made,
    }
}
