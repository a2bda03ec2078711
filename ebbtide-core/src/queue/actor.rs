//! Actor implementation for the job queue.

use tokio::sync::mpsc;

use super::commands::QueueCommand;
use super::core::JobQueue;
use super::handle::JobQueueHandle;
use crate::config::QueueConfig;
use crate::pipeline::AcquisitionPipeline;

/// Spawns the job queue actor and returns its handle.
///
/// The actor processes commands sequentially on its own task, so worker
/// bookkeeping never races with lookups or cancellations. Completed worker
/// tasks report back through a second channel multiplexed into the same
/// loop.
pub fn spawn_job_queue<P>(config: &QueueConfig, pipeline: P) -> JobQueueHandle
where
    P: AcquisitionPipeline + Send + Sync + 'static,
{
    let (sender, receiver) = mpsc::channel(config.command_buffer);
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let queue = JobQueue::new(config, pipeline, outcome_tx);

    tokio::spawn(async move {
        run_actor_loop(queue, receiver, outcome_rx).await;
    });

    JobQueueHandle::new(sender)
}

/// Runs the main actor message processing loop.
async fn run_actor_loop<P>(
    mut queue: JobQueue<P>,
    mut receiver: mpsc::Receiver<QueueCommand>,
    mut outcomes: mpsc::UnboundedReceiver<super::commands::JobOutcome>,
) where
    P: AcquisitionPipeline + Send + Sync + 'static,
{
    tracing::debug!("Job queue actor started");

    loop {
        tokio::select! {
            Some(command) = receiver.recv() => {
                if !handle_command(&mut queue, command) {
                    break;
                }
            }
            Some(outcome) = outcomes.recv() => {
                queue.handle_outcome(outcome);
            }
            else => break,
        }
    }

    tracing::debug!("Job queue actor stopped");
}

/// Handles a single command. Returns true to continue processing, false to
/// shut down.
fn handle_command<P>(queue: &mut JobQueue<P>, command: QueueCommand) -> bool
where
    P: AcquisitionPipeline + Send + Sync + 'static,
{
    match command {
        QueueCommand::Enqueue {
            payload,
            options,
            responder,
        } => {
            let job_id = queue.enqueue(payload, options);
            let _ = responder.send(job_id);
        }

        QueueCommand::Job { job_id, responder } => {
            let _ = responder.send(queue.job(job_id));
        }

        QueueCommand::ActiveJobs { responder } => {
            let _ = responder.send(queue.active_jobs());
        }

        QueueCommand::Cancel { job_id, responder } => {
            let _ = responder.send(queue.cancel(job_id));
        }

        QueueCommand::Shutdown { responder } => {
            tracing::debug!("Job queue actor shutting down");
            queue.abort_all();
            let _ = responder.send(());
            return false;
        }
    }

    true
}
