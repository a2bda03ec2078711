//! Byte-range video streaming handler.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use ebbtide_core::library::RecordId;
use ebbtide_core::streaming::{StreamContent, StreamError, stream_file};
use serde_json::json;

use crate::server::AppState;

/// GET /{id} - stream the media file behind a record.
///
/// Honors a `Range` request header with 206 partial responses so players
/// can seek. A record miss and a file miss are both 404, but logged
/// distinctly: one means an unknown id, the other a record whose file was
/// never encoded or was removed externally.
pub async fn stream_video(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let id = RecordId::new(id);

    let record = match state.store.find_by_id(id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!(record_id = %id, "streaming request for unknown record");
            return Ok((StatusCode::NOT_FOUND, Json(json!("Video not found"))).into_response());
        }
        Err(error) => {
            tracing::error!(error = %error, "record lookup failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    match stream_file(&record.path, &record.filename, range_header).await {
        Ok(content) => stream_response(content),
        Err(StreamError::FileNotFound { path }) => {
            tracing::warn!(
                record_id = %id,
                path = %path.display(),
                "record exists but file is not on disk"
            );
            Ok((StatusCode::NOT_FOUND, Json(json!("Video file does not exist"))).into_response())
        }
        Err(StreamError::RangeNotSatisfiable { start, total_size }) => {
            tracing::debug!(record_id = %id, start, total_size, "unsatisfiable range request");
            Response::builder()
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{total_size}"))
                .body(Body::empty())
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(StreamError::Io(error)) => {
            tracing::error!(record_id = %id, error = %error, "file read failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Builds the 200 or 206 response around an incremental body.
fn stream_response(content: StreamContent) -> Result<Response, StatusCode> {
    let mut response = Response::builder()
        .header(header::CONTENT_TYPE, content.content_type)
        .header(header::CONTENT_LENGTH, content.length.to_string());

    if content.partial {
        response = response
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::ACCEPT_RANGES, "bytes")
            .header(header::CONTENT_RANGE, content.content_range());
    } else {
        response = response.status(StatusCode::OK);
    }

    response
        .body(Body::from_stream(content.body))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
