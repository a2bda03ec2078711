//! Ebbtide Core - Acquisition job lifecycle and range streaming
//!
//! This crate provides the building blocks for a magnet-link media server:
//! submission identity, job queue policy, record/job reconciliation, and
//! byte-range file streaming. Persistence and the download+encode pipeline
//! are collaborators behind narrow interfaces with in-process defaults.

pub mod acquire;
pub mod config;
pub mod library;
pub mod pipeline;
pub mod queue;
pub mod streaming;

// Re-export main types for convenient access
pub use acquire::{AcquireError, AcquisitionService, CancelOutcome, SubmitReceipt};
pub use config::{EbbtideConfig, RuntimeMode};
pub use library::{InMemoryMediaStore, LibraryError, MediaRecord, MediaStore, RecordId};
pub use pipeline::{AcquisitionPipeline, PipelineError};
pub use queue::{JobId, JobQueueHandle, JobState, QueueError, spawn_job_queue};
pub use streaming::{StreamContent, StreamError};

/// Core errors that can bubble up from any Ebbtide subsystem.
#[derive(Debug, thiserror::Error)]
pub enum EbbtideError {
    #[error("Acquisition error: {0}")]
    Acquire(#[from] AcquireError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] pipeline::PipelineError),

    #[error("Streaming error: {0}")]
    Streaming(#[from] StreamError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EbbtideError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            EbbtideError::Acquire(AcquireError::MalformedMagnet { reason }) => {
                format!("Invalid magnet link: {reason}")
            }
            EbbtideError::Acquire(_) => "Submission failed".to_string(),
            EbbtideError::Queue(_) => "Job queue error occurred".to_string(),
            EbbtideError::Library(LibraryError::RecordNotFound { id }) => {
                format!("Video {id} not found")
            }
            EbbtideError::Library(_) => "Record store error occurred".to_string(),
            EbbtideError::Pipeline(_) => "Acquisition pipeline error occurred".to_string(),
            EbbtideError::Streaming(StreamError::FileNotFound { .. }) => {
                "Video file does not exist".to_string()
            }
            EbbtideError::Streaming(_) => "Streaming error occurred".to_string(),
            EbbtideError::Configuration { .. } => "Configuration error occurred".to_string(),
            EbbtideError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            EbbtideError::Acquire(AcquireError::MalformedMagnet { .. })
                | EbbtideError::Configuration { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EbbtideError>;
