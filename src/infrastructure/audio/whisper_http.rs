use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};

use crate::application::ports::TranscriptionError;

const CHUNK_FILENAME: &str = "chunk.wav";
const CHUNK_MIME: &str = "audio/wav";

/// Multipart form carrying one WAV chunk in the `file` field.
pub(super) fn chunk_form(audio_data: &[u8]) -> Result<Form, TranscriptionError> {
    let part = Part::bytes(audio_data.to_vec())
        .file_name(CHUNK_FILENAME)
        .mime_str(CHUNK_MIME)
        .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;
    Ok(Form::new().part("file", part))
}

/// Sends the request and turns transport failures and non-2xx replies into errors.
pub(super) async fn send(request: RequestBuilder) -> Result<Response, TranscriptionError> {
    let response = request
        .send()
        .await
        .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(TranscriptionError::ApiRequestFailed(format!(
        "status {}: {}",
        status, body
    )))
}
