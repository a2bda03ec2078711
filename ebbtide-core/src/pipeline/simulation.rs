//! Simulated pipeline for development and tests.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::{AcquisitionPipeline, PipelineError};
use crate::queue::JobPayload;

/// Pipeline that fakes an acquisition by sleeping, then writing a small
/// placeholder file where the real encoder would land its output.
///
/// Keeps the full submit → progress → stream → delete loop exercisable
/// offline with deterministic timing.
pub struct SimulatedPipeline {
    encoded_root: PathBuf,
    duration: Duration,
    fail: bool,
}

impl SimulatedPipeline {
    /// Creates a succeeding pipeline with the given acquisition duration.
    pub fn new(encoded_root: PathBuf, duration: Duration) -> Self {
        Self {
            encoded_root,
            duration,
            fail: false,
        }
    }

    /// Creates a pipeline whose every acquisition fails after the delay.
    pub fn failing(encoded_root: PathBuf, duration: Duration) -> Self {
        Self {
            encoded_root,
            duration,
            fail: true,
        }
    }
}

#[async_trait]
impl AcquisitionPipeline for SimulatedPipeline {
    async fn run(&self, payload: &JobPayload) -> Result<PathBuf, PipelineError> {
        tokio::time::sleep(self.duration).await;

        if self.fail {
            return Err(PipelineError::Failed {
                reason: "simulated acquisition failure".to_string(),
            });
        }

        let dest_dir = self.encoded_root.join(&payload.filename);
        tokio::fs::create_dir_all(&dest_dir).await?;
        let output = dest_dir.join(&payload.filename);

        let body = format!("simulated media for {}\n", payload.filename);
        tokio::fs::write(&output, body.as_bytes()).await?;

        Ok(output)
    }
}
