//! Account registration and deletion.
//!
//! Registration is the only path that creates a Profile: the store does it
//! in the same transaction as the User row.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fitlog_shared::validate::validate_not_blank;

use crate::api::{require_requester, AppState};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub profile_id: Uuid,
    pub profile_image: String,
    pub created_at: DateTime<Utc>,
}

/// `POST /api/users`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_not_blank("username", &req.username)?;

    let mut db = state.db.lock().await;
    let (user, profile) = db.create_user(req.username.trim())?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            username: user.username,
            profile_id: profile.id,
            profile_image: profile.image,
            created_at: user.created_at,
        }),
    ))
}

/// `DELETE /api/users/{id}`: a user may only delete their own account.
/// The profile and all owned resources cascade away with it.
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requester = require_requester(&headers)?;
    if requester != id {
        return Err(ApiError::Forbidden("not the account owner"));
    }

    let db = state.db.lock().await;
    if !db.delete_user(id)? {
        return Err(ApiError::NotFound("user"));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
