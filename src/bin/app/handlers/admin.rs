// src/bin/app/handlers/admin.rs

use axum::{extract::State, http::StatusCode, Json};
use scribe::ScribeError;
use scribe::identity::{NewUser, list_all_users};
use scribe::records::{Role, UserRecord, UserStatus, now_timestamp};
use tracing::{info, warn};

use crate::auth::Caller;
use crate::errors::AppError;
use crate::types::{AppState, InviteRequest, InviteResponse, InvitedUser, UserListResponse};

pub async fn invite_user(
    State(state): State<AppState>,
    Caller(claims): Caller,
    Json(body): Json<InviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>), AppError> {
    claims.require_admin("Only admins can invite users")?;

    let email = body.email.trim().to_lowercase();
    let name = body.name.trim().to_string();
    if email.is_empty() || name.is_empty() {
        return Err(ScribeError::validation("Email and name are required").into());
    }
    let role = Role::parse_or_user(&body.role);

    if state.directory.find_user(&email).await?.is_some() {
        return Err(ScribeError::Conflict("User with this email already exists".into()).into());
    }

    let created = state
        .directory
        .create_user(NewUser {
            email: email.clone(),
            name: name.clone(),
            role,
        })
        .await?;

    let invited_at = now_timestamp();
    state
        .store
        .put_user(UserRecord {
            user_id: created.user_id.clone(),
            email: email.clone(),
            name: name.clone(),
            role,
            status: UserStatus::Pending,
            invited_by: claims.email.clone().unwrap_or_default(),
            invited_at: invited_at.clone(),
            created_at: invited_at,
        })
        .await?;

    if let Err(e) = state.directory.resend_invite(&email).await {
        warn!(%email, error = %e, "invitation email not sent");
    }
    info!(%email, ?role, "user invited");

    Ok((
        StatusCode::CREATED,
        Json(InviteResponse {
            message: format!("Invitation sent to {email}"),
            user: InvitedUser {
                email,
                name,
                role,
                status: UserStatus::Pending,
            },
        }),
    ))
}

pub async fn list_users(
    State(state): State<AppState>,
    Caller(claims): Caller,
) -> Result<Json<UserListResponse>, AppError> {
    claims.require_admin("Only admins can view users")?;
    let users = list_all_users(state.directory.as_ref()).await?;
    Ok(Json(UserListResponse {
        count: users.len(),
        users,
    }))
}
