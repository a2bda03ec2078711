//! API handlers for the media library and acquisition jobs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use ebbtide_core::acquire::{AcquireError, CancelOutcome};
use ebbtide_core::library::{LibraryError, NewMediaRecord, RecordId};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::server::AppState;

/// Single fixed owner until multi-tenancy lands.
const OWNER_ID: u64 = 1;

/// Submission request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub magnet_link: String,
}

/// GET / - list every media record.
///
/// An empty library yields an informational message rather than a bare
/// empty array.
pub async fn list_videos(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let records = state.store.list_all().await.map_err(|error| {
        tracing::error!(error = %error, "record listing failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if records.is_empty() {
        return Ok(Json(json!({ "message": "No videos found" })));
    }

    Ok(Json(json!(records)))
}

/// GET /progress - snapshots of currently-active acquisition jobs.
pub async fn active_jobs(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let jobs = state.queue.active_jobs().await.map_err(|error| {
        tracing::error!(error = %error, "active job listing failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(json!(jobs)))
}

/// POST / - dispatch an acquisition and persist its record.
///
/// The record is created before the download finishes; its path is where
/// the encoded file will eventually land.
pub async fn submit_video(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let receipt = match state.acquisitions.submit(&request.magnet_link).await {
        Ok(receipt) => receipt,
        Err(AcquireError::MalformedMagnet { reason }) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid magnet link: {reason}") })),
            ));
        }
        Err(error) => {
            tracing::error!(error = %error, "acquisition dispatch failed");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Submission failed" })),
            ));
        }
    };

    let new_record = NewMediaRecord {
        filename: receipt.filename.clone(),
        path: state.config.storage.record_dir(&receipt.filename),
        hash: receipt.token,
        job_id: receipt.job_id,
        magnet_link: request.magnet_link,
        owner_id: OWNER_ID,
    };

    match state.store.create_record(new_record).await {
        Ok(record) => Ok(Json(json!({ "video": record }))),
        Err(error) => {
            tracing::error!(error = %error, job_id = %receipt.job_id, "record creation failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Submission failed" })),
            ))
        }
    }
}

/// DELETE /{id} - reconcile the producing job, then remove the record.
///
/// Cancellation is best-effort; every outcome short of queue loss still
/// deletes the record.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let id = RecordId::new(id);

    let record = state.store.find_by_id(id).await.map_err(|error| {
        tracing::error!(error = %error, "record lookup failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Record store failure" })),
        )
    })?;
    let Some(record) = record else {
        return Err((StatusCode::NOT_FOUND, Json(json!("Video not found"))));
    };

    match state.acquisitions.cancel_for_record(&record).await {
        CancelOutcome::Cancelled => {
            tracing::info!(job_id = %record.job_id, "producing job cancelled before deletion");
        }
        CancelOutcome::AlreadyGone => {
            tracing::debug!(job_id = %record.job_id, "no live job to cancel");
        }
        CancelOutcome::Raced => {
            tracing::warn!(job_id = %record.job_id, "job completed before cancellation landed");
        }
        CancelOutcome::Failed { reason } => {
            tracing::warn!(job_id = %record.job_id, reason = %reason, "cancellation failed, deleting anyway");
        }
    }

    match state.store.delete_by_id(id).await {
        Ok(()) => Ok(Json(json!("Successfully deleted"))),
        Err(LibraryError::RecordNotFound { .. }) => {
            Err((StatusCode::NOT_FOUND, Json(json!("Video not found"))))
        }
        Err(error) => {
            tracing::error!(error = %error, "record deletion failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Record store failure" })),
            ))
        }
    }
}
