//! HTTP request handlers organized by functionality

pub mod api;
pub mod streaming;

// Re-export handler functions
pub use api::{SubmitRequest, active_jobs, delete_video, list_videos, submit_video};
pub use streaming::stream_video;
