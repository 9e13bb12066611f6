use std::io;

use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::application::services::SubmissionError;
use crate::presentation::state::AppState;

const FILE_FIELD: &str = "file";
const NO_FILE_MESSAGE: &str = "No file uploaded";

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub job_id: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) => {
                // Browsers send an empty, unnamed part when no file was chosen.
                if field.file_name().is_none_or(|name| name.trim().is_empty()) {
                    tracing::warn!("Transcription request with an empty file field");
                    return no_file();
                }
                return submit_field(&state, field).await;
            }
            Ok(Some(field)) => {
                tracing::debug!(field = ?field.name(), "Ignoring multipart field");
            }
            Ok(None) => {
                tracing::warn!("Transcription request with no file");
                return no_file();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return ErrorResponse {
                    error: format!("Failed to read multipart: {}", e),
                }
                .into_response_with(StatusCode::BAD_REQUEST);
            }
        }
    }
}

async fn submit_field(state: &AppState, field: Field<'_>) -> Response {
    let filename = field.file_name().map(str::to_string);
    tracing::debug!(filename = ?filename, content_type = ?field.content_type(), "Receiving upload");

    let stream = field.map_err(io::Error::other).boxed();

    match state
        .transcription_service
        .submit(filename.as_deref(), stream)
        .await
    {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(TranscribeResponse {
                job_id: job_id.to_string(),
            }),
        )
            .into_response(),
        Err(SubmissionError::Staging(e)) => {
            tracing::error!(error = %e, "Failed to stage upload");
            ErrorResponse {
                error: format!("Failed to store upload: {}", e),
            }
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(SubmissionError::EmptyUpload) => {
            tracing::warn!("Uploaded file has no content");
            no_file()
        }
        Err(SubmissionError::Store(e)) => {
            tracing::error!(error = %e, "Failed to create job record");
            ErrorResponse {
                error: format!("Failed to create job: {}", e),
            }
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn no_file() -> Response {
    ErrorResponse {
        error: NO_FILE_MESSAGE.to_string(),
    }
    .into_response_with(StatusCode::BAD_REQUEST)
}
