// src/bin/app/handlers/generate.rs

use axum::{extract::State, Json};
use scribe::ScribeError;
use scribe::model;
use scribe::records::{Note, now_timestamp};
use scribe::sanitize::sanitize;
use scribe::templates::{DEFAULT_TEMPLATE_ID, resolve_template};
use tracing::info;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::types::{AppState, GenerateRequest, GenerateResponse};

/// Turns a visit transcript into a plain-text note and saves it.
pub async fn generate_note(
    State(state): State<AppState>,
    Caller(claims): Caller,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let transcript = body
        .transcript
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ScribeError::validation("No transcript provided"))?;
    let user_id = claims.subject()?.to_string();
    let provider_email = claims.email.clone().unwrap_or_default();
    let patient_name = body.patient_name.unwrap_or_else(|| "UNKNOWN".to_string());
    let template_id = body
        .template_id
        .unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string());

    let template = resolve_template(state.store.as_ref(), &template_id).await;
    let prompt = model::build_prompt(&template, &patient_name, &transcript);
    let raw = state.model.complete(&prompt).await?;
    let soap_note = sanitize(&raw);

    let timestamp = now_timestamp();
    let note = Note {
        user_id,
        timestamp: timestamp.clone(),
        patient_name,
        patient_id: body.patient_id,
        transcript,
        soap_note: soap_note.clone(),
        template_id,
        template_name: template.name.clone(),
        provider_email,
        ttl: Note::expiry_from_now(),
        created_at: timestamp.clone(),
    };
    let note_id = note.note_id();
    state.store.put_note(note).await?;
    info!(%note_id, template = %template.name, "note generated");

    Ok(Json(GenerateResponse {
        note: soap_note,
        timestamp,
        note_id,
        template_used: template.name,
        saved: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::test_support::{anonymous, harness, harness_with_reply, user};
    use scribe::store::RecordStore;

    fn request(transcript: Option<&str>, template_id: Option<&str>) -> Json<GenerateRequest> {
        Json(GenerateRequest {
            transcript: transcript.map(String::from),
            patient_name: Some("Jane Doe".into()),
            patient_id: Some("pat_1".into()),
            template_id: template_id.map(String::from),
        })
    }

    #[tokio::test]
    async fn note_is_sanitized_and_saved() {
        let h = harness_with_reply("## SUBJECTIVE:\n**Pain** on *#14*\n\n\n\nPLAN:\n* recall");
        let Json(body) = generate_note(
            State(h.state.clone()),
            user("u1"),
            request(Some("Speaker 0: it hurts"), Some("default_hygiene")),
        )
        .await
        .unwrap();

        assert_eq!(body.note, "SUBJECTIVE:\nPain on #14\n\nPLAN:\n- recall");
        assert_eq!(body.template_used, "Hygiene Recall");
        assert_eq!(body.note_id, format!("u1#{}", body.timestamp));
        assert!(body.saved);

        let saved = h.store.notes_by_user("u1", 10).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].soap_note, body.note);
        assert_eq!(saved[0].patient_id.as_deref(), Some("pat_1"));
        assert_eq!(saved[0].provider_email, "u1@example.com");
        assert!(saved[0].ttl > chrono::Utc::now().timestamp());

        let prompts = h.model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Probing depths: [findings]"));
        assert!(prompts[0].ends_with("TRANSCRIPT:\nSpeaker 0: it hurts"));
    }

    #[tokio::test]
    async fn unknown_template_falls_back_to_soap() {
        let h = harness();
        let Json(body) = generate_note(State(h.state), user("u1"), request(Some("hi"), Some("custom_nope")))
            .await
            .unwrap();
        assert_eq!(body.template_used, "SOAP General");
    }

    #[tokio::test]
    async fn missing_transcript_is_rejected() {
        let h = harness();
        let err = generate_note(State(h.state), user("u1"), request(None, None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(h.model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymous_callers_are_rejected() {
        let err = generate_note(State(harness().state), anonymous(), request(Some("hi"), None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
