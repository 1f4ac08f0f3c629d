// src/bin/app/handlers/search.rs

use axum::{
    extract::{Query, State},
    Json,
};
use scribe::fuzzy;
use scribe::records::{Patient, PatientSummary};
use scribe::store;
use tracing::debug;

use crate::errors::AppError;
use crate::types::{AppState, DEFAULT_SEARCH_LIMIT, PatientSearchQuery, PatientSearchResponse};

/// Fuzzy search over every patient. A blank query is answered without
/// touching the store; a store failure is an error, never an empty list.
pub async fn search_patients(
    State(state): State<AppState>,
    Query(params): Query<PatientSearchQuery>,
) -> Result<Json<PatientSearchResponse>, AppError> {
    let query = params.q.unwrap_or_default().trim().to_string();
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    if query.is_empty() {
        return Ok(Json(PatientSearchResponse {
            patients: vec![],
            count: 0,
            query,
        }));
    }

    let patients = store::scan_all_patients(state.store.as_ref()).await?;
    let ranked = rank_patients(&query, &patients, limit);

    Ok(Json(PatientSearchResponse {
        count: ranked.len(),
        patients: ranked,
        query,
    }))
}

fn rank_patients(query: &str, patients: &[Patient], limit: usize) -> Vec<PatientSummary> {
    fuzzy::score_candidates(query, patients)
        .into_iter()
        .take(limit)
        .map(|m| {
            debug!(patient = %m.candidate.patient_id, score = m.score, kind = %m.kind, "patient matched");
            m.candidate.summary()
        })
        .collect()
}
