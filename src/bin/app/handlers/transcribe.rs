// src/bin/app/handlers/transcribe.rs

use axum::{extract::State, Json};
use scribe::speech::{Transcript, decode_audio};

use crate::errors::AppError;
use crate::types::{AppState, TranscribeRequest};

pub async fn transcribe(
    State(state): State<AppState>,
    Json(body): Json<TranscribeRequest>,
) -> Result<Json<Transcript>, AppError> {
    let audio = decode_audio(&body.audio)?;
    let transcript = state.speech.transcribe(audio).await?;
    Ok(Json(transcript))
}
