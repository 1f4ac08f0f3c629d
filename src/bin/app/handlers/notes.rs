// src/bin/app/handlers/notes.rs

use axum::{
    extract::{Query, State},
    Json,
};
use scribe::records::Note;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::types::{AppState, DEFAULT_HISTORY_LIMIT, HistoryQuery, HistoryResponse, NoteView};

/// Visit history. Admins may ask for every provider's notes with `all=true`;
/// everyone else only ever sees their own.
pub async fn note_history(
    State(state): State<AppState>,
    Caller(claims): Caller,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let user_id = claims.subject()?.to_string();
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let admin_view = claims.is_admin() && params.wants_all();

    let notes: Vec<Note> = if let Some(patient_id) = params.patient_id.as_deref() {
        let notes = state.store.notes_by_patient(patient_id, limit).await?;
        if admin_view {
            notes
        } else {
            notes.into_iter().filter(|n| n.user_id == user_id).collect()
        }
    } else if admin_view {
        let mut notes = state.store.scan_notes(limit).await?;
        notes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        notes
    } else {
        state.store.notes_by_user(&user_id, limit).await?
    };

    let notes: Vec<NoteView> = notes.into_iter().map(NoteView::from).collect();
    Ok(Json(HistoryResponse {
        count: notes.len(),
        notes,
        is_admin_view: admin_view,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::test_support::{admin, anonymous, harness, user, Harness};
    use scribe::store::RecordStore;

    fn note(user_id: &str, patient_id: &str, timestamp: &str) -> Note {
        Note {
            user_id: user_id.into(),
            timestamp: timestamp.into(),
            patient_name: "Pat".into(),
            patient_id: Some(patient_id.into()),
            transcript: "t".into(),
            soap_note: "n".into(),
            template_id: "default_soap".into(),
            template_name: "SOAP General".into(),
            provider_email: format!("{user_id}@example.com"),
            ttl: 0,
            created_at: timestamp.into(),
        }
    }

    async fn seeded() -> Harness {
        let h = harness();
        h.store.put_note(note("u1", "p1", "2025-01-01T00:00:00Z")).await.unwrap();
        h.store.put_note(note("u2", "p1", "2025-02-01T00:00:00Z")).await.unwrap();
        h.store.put_note(note("u1", "p2", "2025-03-01T00:00:00Z")).await.unwrap();
        h
    }

    fn params(patient_id: Option<&str>, all: bool) -> Query<HistoryQuery> {
        Query(HistoryQuery {
            limit: None,
            patient_id: patient_id.map(String::from),
            all: all.then(|| "TRUE".to_string()),
        })
    }

    #[tokio::test]
    async fn requires_a_signed_in_caller() {
        let h = harness();
        let err = note_history(State(h.state), anonymous(), params(None, false))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn providers_see_their_own_notes_newest_first() {
        let h = seeded().await;
        let Json(body) = note_history(State(h.state), user("u1"), params(None, false))
            .await
            .unwrap();
        let stamps: Vec<&str> = body.notes.iter().map(|n| n.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["2025-03-01T00:00:00Z", "2025-01-01T00:00:00Z"]);
        assert!(!body.is_admin_view);
    }

    #[tokio::test]
    async fn patient_history_is_filtered_for_non_admins() {
        let h = seeded().await;
        let Json(body) = note_history(State(h.state.clone()), user("u1"), params(Some("p1"), true))
            .await
            .unwrap();
        assert_eq!(body.count, 1);
        assert_eq!(body.notes[0].user_id, "u1");

        let Json(body) = note_history(State(h.state), admin("a1"), params(Some("p1"), true))
            .await
            .unwrap();
        assert_eq!(body.count, 2);
        assert!(body.is_admin_view);
    }

    #[tokio::test]
    async fn admins_can_list_every_note() {
        let h = seeded().await;
        let Json(body) = note_history(State(h.state), admin("a1"), params(None, true))
            .await
            .unwrap();
        assert_eq!(body.count, 3);
        assert_eq!(body.notes[0].timestamp, "2025-03-01T00:00:00Z");
    }

    #[tokio::test]
    async fn admins_without_all_get_their_own_view() {
        let h = seeded().await;
        let Json(body) = note_history(State(h.state), admin("u2"), params(None, false))
            .await
            .unwrap();
        assert_eq!(body.count, 1);
        assert!(!body.is_admin_view);
    }
}
