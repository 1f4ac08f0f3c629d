// src/bin/app/handlers/templates.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use scribe::ScribeError;
use scribe::records::{Template, TemplateDraft};
use scribe::templates::{DEFAULT_TEMPLATES, default_template, is_default_template};
use tracing::{info, warn};

use crate::auth::Caller;
use crate::errors::AppError;
use crate::types::{
    AppState, MessageResponse, TemplateChangeResponse, TemplateListResponse, TemplateResponse,
};

/// Built-ins first, then custom templates. An unreachable store still
/// yields the built-ins.
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let mut templates: Vec<Template> = DEFAULT_TEMPLATES.clone();
    match state.store.scan_templates().await {
        Ok(custom) => templates.extend(custom),
        Err(e) => warn!(error = %e, "listing custom templates failed"),
    }
    Json(TemplateListResponse {
        count: templates.len(),
        templates,
    })
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<TemplateResponse>, AppError> {
    if let Some(template) = default_template(&template_id) {
        return Ok(Json(TemplateResponse {
            template: template.clone(),
        }));
    }
    let template = state
        .store
        .get_template(&template_id)
        .await?
        .ok_or_else(|| ScribeError::not_found("Template not found"))?;
    Ok(Json(TemplateResponse { template }))
}

pub async fn create_template(
    State(state): State<AppState>,
    Caller(claims): Caller,
    Json(draft): Json<TemplateDraft>,
) -> Result<(StatusCode, Json<TemplateChangeResponse>), AppError> {
    claims.require_admin("Only admins can create templates")?;
    let draft = draft.trimmed();
    if draft.name.is_empty() || draft.example_output.is_empty() {
        return Err(ScribeError::validation("Name and example output are required").into());
    }

    let created_by = claims.email.as_deref().unwrap_or("unknown");
    let template = Template::custom(&draft, created_by);
    state.store.put_template(template.clone()).await?;
    info!(template_id = %template.template_id, "template created");

    Ok((
        StatusCode::CREATED,
        Json(TemplateChangeResponse {
            message: "Template created successfully".into(),
            template,
        }),
    ))
}

pub async fn update_template(
    State(state): State<AppState>,
    Caller(claims): Caller,
    Path(template_id): Path<String>,
    Json(draft): Json<TemplateDraft>,
) -> Result<Json<TemplateChangeResponse>, AppError> {
    claims.require_admin("Only admins can update templates")?;
    if is_default_template(&template_id) {
        return Err(ScribeError::validation("Cannot modify default templates").into());
    }
    let draft = draft.trimmed();
    if draft.name.is_empty() {
        return Err(ScribeError::validation("Name is required").into());
    }

    let updated_by = claims.email.as_deref().unwrap_or("unknown");
    let template = state
        .store
        .update_template(&template_id, &draft, updated_by)
        .await?;
    info!(%template_id, "template updated");

    Ok(Json(TemplateChangeResponse {
        message: "Template updated successfully".into(),
        template,
    }))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Caller(claims): Caller,
    Path(template_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    claims.require_admin("Only admins can delete templates")?;
    if is_default_template(&template_id) {
        return Err(ScribeError::validation("Cannot delete default templates").into());
    }
    state.store.delete_template(&template_id).await?;
    info!(%template_id, "template deleted");
    Ok(Json(MessageResponse {
        message: "Template deleted successfully".into(),
    }))
}
