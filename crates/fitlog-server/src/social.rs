//! Like, comment and follow handlers.
//!
//! Likes and follow edges rely on the store's unique constraints for
//! duplicate arbitration; a second attempt surfaces as a 400 with a
//! field-level duplicate indication, never as a second row.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fitlog_shared::authz::{authorize, is_owner, Decision, Operation};
use fitlog_shared::validate::validate_not_blank;
use fitlog_store::{Comment, CommentRecord, Follower, Like};

use crate::api::{require_requester, requester, AppState};
use crate::error::ApiError;

// ─── Likes ───

#[derive(Deserialize)]
pub struct LikePayload {
    pub post_id: Uuid,
}

/// `POST /api/likes`
pub async fn create_like(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LikePayload>,
) -> Result<(StatusCode, Json<Like>), ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    // Fail closed before the insert so a missing post is a 404, not a
    // foreign-key error.
    db.get_post(payload.post_id)
        .map_err(|_| ApiError::NotFound("post"))?;
    let like = db.create_like(requester, payload.post_id)?;
    Ok((StatusCode::CREATED, Json(like)))
}

/// `DELETE /api/likes/{id}`: only the liker may unlike.
pub async fn delete_like(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    let like = db.get_like(id)?;
    if let Decision::Deny(_) = authorize(Some(requester), &like, Operation::Write) {
        return Err(ApiError::Forbidden("not the like owner"));
    }
    db.delete_like(id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ─── Comments ───

#[derive(Deserialize)]
pub struct CommentPayload {
    pub post_id: Uuid,
    pub content: String,
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author: String,
    pub is_owner: bool,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    fn from_record(record: CommentRecord, requester: Option<Uuid>) -> Self {
        let CommentRecord {
            comment,
            author_username,
        } = record;
        Self {
            is_owner: is_owner(requester, &comment),
            id: comment.id,
            author: author_username,
            post_id: comment.post_id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

/// `GET /api/posts/{id}/comments`
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let requester = requester(&headers)?;
    let db = state.db.lock().await;
    db.get_post(post_id).map_err(|_| ApiError::NotFound("post"))?;
    let records = db.list_comments_for_post(post_id)?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| CommentResponse::from_record(r, requester))
            .collect(),
    ))
}

/// `POST /api/comments`
pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CommentPayload>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let requester = require_requester(&headers)?;
    validate_not_blank("content", &payload.content)?;

    let db = state.db.lock().await;
    db.get_post(payload.post_id)
        .map_err(|_| ApiError::NotFound("post"))?;
    let author = db.get_user(requester).map_err(|_| ApiError::NotFound("user"))?;

    let comment = Comment {
        id: Uuid::new_v4(),
        author_id: requester,
        post_id: payload.post_id,
        content: payload.content,
        created_at: Utc::now(),
    };
    db.create_comment(&comment)?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::from_record(
            CommentRecord {
                comment,
                author_username: author.username,
            },
            Some(requester),
        )),
    ))
}

/// `DELETE /api/comments/{id}`: only the author may delete.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    let comment = db.get_comment(id)?;
    if let Decision::Deny(_) = authorize(Some(requester), &comment, Operation::Write) {
        return Err(ApiError::Forbidden("not the comment author"));
    }
    db.delete_comment(id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ─── Follow edges ───

#[derive(Deserialize)]
pub struct FollowPayload {
    pub followed: Uuid,
}

/// `GET /api/followers`: who the requester follows.
pub async fn list_following(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Follower>>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    Ok(Json(db.list_following(requester)?))
}

/// `POST /api/followers`
pub async fn create_follow(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<FollowPayload>,
) -> Result<(StatusCode, Json<Follower>), ApiError> {
    let requester = require_requester(&headers)?;
    if payload.followed == requester {
        return Err(ApiError::Validation {
            field: "followed",
            reason: "cannot follow yourself".to_string(),
        });
    }

    let db = state.db.lock().await;
    db.get_user(payload.followed)
        .map_err(|_| ApiError::NotFound("user"))?;
    let edge = db.create_follow(requester, payload.followed)?;
    Ok((StatusCode::CREATED, Json(edge)))
}

/// `DELETE /api/followers/{id}`: only the follower may unfollow.
pub async fn delete_follow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    let edge = db.get_follow(id)?;
    if let Decision::Deny(_) = authorize(Some(requester), &edge, Operation::Write) {
        return Err(ApiError::Forbidden("not the follower"));
    }
    db.delete_follow(id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
