//! Download+encode pipeline abstraction.
//!
//! The queue treats the pipeline as a black box: given a work order it
//! eventually produces one encoded file, or fails. Production runs an
//! operator-configured external command; development and tests run a
//! simulated acquisition with the same interface.

pub mod command;
pub mod simulation;

use std::path::PathBuf;

use async_trait::async_trait;

pub use command::CommandPipeline;
pub use simulation::SimulatedPipeline;

use crate::queue::JobPayload;

/// Abstraction over the media acquisition pipeline.
#[async_trait]
pub trait AcquisitionPipeline: Send + Sync {
    /// Downloads and encodes the media described by `payload`, returning
    /// the path of the produced file.
    ///
    /// # Errors
    /// - `PipelineError::Spawn` - Pipeline process could not be launched
    /// - `PipelineError::Failed` - Pipeline ran but did not produce output
    /// - `PipelineError::Io` - File system error while preparing output
    async fn run(&self, payload: &JobPayload) -> Result<PathBuf, PipelineError>;
}

/// Errors produced while executing an acquisition.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to launch pipeline command: {reason}")]
    Spawn { reason: String },

    #[error("Pipeline failed: {reason}")]
    Failed { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
