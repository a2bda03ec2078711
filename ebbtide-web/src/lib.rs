//! Ebbtide Web - JSON API Server
//!
//! HTTP surface for the media library: submission, progress, byte-range
//! playback, and deletion. All state is injected at startup; handlers hold
//! no globals.

pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, app_state, router, run_server};
