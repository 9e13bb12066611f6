use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::ports::JobStoreError;
use crate::domain::JobId;
use crate::presentation::handlers::transcribe::ErrorResponse;
use crate::presentation::state::AppState;

const NOT_FOUND_MESSAGE: &str = "Job not found";

/// Current snapshot of a job. Unknown and malformed ids are both a plain 404.
#[tracing::instrument(skip(state))]
pub async fn progress_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let Ok(id) = job_id.parse::<JobId>() else {
        tracing::debug!("Malformed job id");
        return not_found();
    };

    match state.transcription_service.progress(id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(JobStoreError::NotFound(_)) => not_found(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read job progress");
            ErrorResponse {
                error: format!("Failed to read job: {}", e),
            }
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn not_found() -> axum::response::Response {
    ErrorResponse {
        error: NOT_FOUND_MESSAGE.to_string(),
    }
    .into_response_with(StatusCode::NOT_FOUND)
}
