//! HTTP server assembly for Ebbtide.
//!
//! Builds the router over injected collaborators: the job queue handle,
//! the record store, and configuration. The hosting process owns their
//! lifecycle; nothing here is process-global.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use ebbtide_core::EbbtideError;
use ebbtide_core::acquire::AcquisitionService;
use ebbtide_core::config::{EbbtideConfig, RuntimeMode};
use ebbtide_core::library::{InMemoryMediaStore, MediaStore};
use ebbtide_core::pipeline::{CommandPipeline, SimulatedPipeline};
use ebbtide_core::queue::{JobQueueHandle, spawn_job_queue};
use tower_http::cors::CorsLayer;

use crate::handlers::{active_jobs, delete_video, list_videos, stream_video, submit_video};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub acquisitions: AcquisitionService,
    pub queue: JobQueueHandle,
    pub store: Arc<dyn MediaStore>,
    pub config: EbbtideConfig,
}

/// Builds application state over already-constructed collaborators.
pub fn app_state(
    config: EbbtideConfig,
    queue: JobQueueHandle,
    store: Arc<dyn MediaStore>,
) -> AppState {
    AppState {
        acquisitions: AcquisitionService::new(queue.clone(), config.queue.cancel_timeout),
        queue,
        store,
        config,
    }
}

/// Builds the media API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_videos).post(submit_video))
        .route("/progress", get(active_jobs))
        .route("/{id}", get(stream_video).delete(delete_video))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the server until ctrl-c.
///
/// Production mode requires a configured pipeline command; development mode
/// simulates acquisitions so the full loop works offline.
///
/// # Errors
/// - `EbbtideError::Configuration` - Production mode without a pipeline command
/// - `EbbtideError::Pipeline` - Pipeline command template is unusable
/// - `EbbtideError::Io` - Library directory creation, bind, or serve failure
pub async fn run_server(config: EbbtideConfig, mode: RuntimeMode) -> ebbtide_core::Result<()> {
    tokio::fs::create_dir_all(config.storage.encoded_root()).await?;

    let queue = match mode {
        RuntimeMode::Production => {
            let Some(command) = config.pipeline.command.clone() else {
                return Err(EbbtideError::Configuration {
                    reason: "production mode requires a pipeline command (EBBTIDE_PIPELINE_COMMAND)"
                        .to_string(),
                });
            };
            let pipeline = CommandPipeline::new(&command, config.storage.encoded_root())?;
            spawn_job_queue(&config.queue, pipeline)
        }
        RuntimeMode::Development => {
            let pipeline = SimulatedPipeline::new(
                config.storage.encoded_root(),
                config.pipeline.simulated_duration,
            );
            spawn_job_queue(&config.queue, pipeline)
        }
    };

    let store: Arc<dyn MediaStore> = Arc::new(InMemoryMediaStore::new());
    let port = config.server.port;
    let state = app_state(config, queue.clone(), store);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    println!("Ebbtide media server running on http://127.0.0.1:{port} [{mode}]");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(queue))
        .await?;

    Ok(())
}

/// Completes on ctrl-c after stopping the queue actor.
async fn shutdown_signal(queue: JobQueueHandle) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown requested, stopping job queue");
    let _ = queue.shutdown().await;
}
