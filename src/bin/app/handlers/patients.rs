// src/bin/app/handlers/patients.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use scribe::ScribeError;
use scribe::records::{NewPatient, Patient};
use tracing::info;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::types::{AppState, CreatedPatientResponse, PatientResponse};

pub async fn create_patient(
    State(state): State<AppState>,
    Caller(claims): Caller,
    Json(input): Json<NewPatient>,
) -> Result<(StatusCode, Json<CreatedPatientResponse>), AppError> {
    let created_by = claims.sub.as_deref().unwrap_or("unknown");
    let patient = Patient::create(&input, created_by)
        .ok_or_else(|| ScribeError::validation("Patient name is required"))?;

    state.store.put_patient(patient.clone()).await?;
    info!(patient_id = %patient.patient_id, "patient created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedPatientResponse {
            message: "Patient created successfully".to_string(),
            patient: patient.summary(),
        }),
    ))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientResponse>, AppError> {
    let patient = state
        .store
        .get_patient(&patient_id)
        .await?
        .ok_or_else(|| ScribeError::not_found("Patient not found"))?;

    Ok(Json(PatientResponse {
        patient: patient.summary(),
    }))
}
