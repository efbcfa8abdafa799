//! Workout post handlers.
//!
//! List and detail payloads embed like/comment counts from the batched
//! aggregate counters (two extra queries per page, regardless of page
//! size) and the requesting user's own like id, fetched the same way.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fitlog_shared::authz::{authorize, is_owner, Decision, Operation};
use fitlog_shared::types::{Intensity, WorkoutType};
use fitlog_store::{Database, PostCounts, PostRecord, WorkoutPost};

use crate::api::{require_requester, requester, AppState};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreatePostPayload {
    pub workout_id: Uuid,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
pub struct UpdatePostPayload {
    pub content: String,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub owner: String,
    pub is_owner: bool,
    pub workout_id: Uuid,
    pub workout_type: WorkoutType,
    pub workout_duration: i64,
    pub workout_intensity: Intensity,
    pub content: String,
    pub like_id: Option<Uuid>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    fn from_record(
        record: PostRecord,
        counts: PostCounts,
        like_id: Option<Uuid>,
        requester: Option<Uuid>,
    ) -> Self {
        let PostRecord {
            post,
            owner_username,
            workout_type,
            workout_duration,
            workout_intensity,
        } = record;
        Self {
            is_owner: is_owner(requester, &post),
            id: post.id,
            owner: owner_username,
            workout_id: post.workout_id,
            workout_type,
            workout_duration,
            workout_intensity,
            content: post.content,
            like_id,
            likes_count: counts.likes,
            comments_count: counts.comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Assemble responses for a page of post records: one counts pass per
/// kind plus one like lookup for the requester.
fn page_responses(
    db: &Database,
    records: Vec<PostRecord>,
    requester: Option<Uuid>,
) -> Result<Vec<PostResponse>, ApiError> {
    let ids: Vec<Uuid> = records.iter().map(|r| r.post.id).collect();
    let counts = db.post_counts(&ids)?;
    let like_ids: HashMap<Uuid, Uuid> = match requester {
        Some(user) => db.like_ids_for_posts(user, &ids)?,
        None => HashMap::new(),
    };

    Ok(records
        .into_iter()
        .map(|record| {
            let id = record.post.id;
            PostResponse::from_record(
                record,
                counts.get(&id).copied().unwrap_or_default(),
                like_ids.get(&id).copied(),
                requester,
            )
        })
        .collect())
}

/// `GET /api/posts`
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let requester = requester(&headers)?;
    let db = state.db.lock().await;
    let records = db.list_posts()?;
    Ok(Json(page_responses(&db, records, requester)?))
}

/// `POST /api/posts`: publish one of your own workouts.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePostPayload>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let requester = require_requester(&headers)?;

    let db = state.db.lock().await;
    let workout = db.get_workout(payload.workout_id)?;
    if let Decision::Deny(_) = authorize(Some(requester), &workout, Operation::Write) {
        return Err(ApiError::Forbidden("not the workout owner"));
    }

    let now = Utc::now();
    let post = WorkoutPost {
        id: Uuid::new_v4(),
        owner_id: requester,
        workout_id: workout.id,
        content: payload.content,
        created_at: now,
        updated_at: now,
    };
    db.create_post(&post)?;

    let record = db.get_post_record(post.id)?;
    let responses = page_responses(&db, vec![record], Some(requester))?;
    let response = responses.into_iter().next().ok_or_else(|| {
        ApiError::Internal("created post vanished".to_string())
    })?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /api/posts/{id}`
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<PostResponse>, ApiError> {
    let requester = requester(&headers)?;
    let db = state.db.lock().await;
    let record = db.get_post_record(id)?;
    let responses = page_responses(&db, vec![record], requester)?;
    let response = responses
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("post record vanished".to_string()))?;
    Ok(Json(response))
}

/// `PUT /api/posts/{id}`: only the content is mutable.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePostPayload>,
) -> Result<Json<PostResponse>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    let post = db.get_post(id)?;
    if let Decision::Deny(_) = authorize(Some(requester), &post, Operation::Write) {
        return Err(ApiError::Forbidden("not the post owner"));
    }

    db.update_post_content(id, &payload.content)?;
    let record = db.get_post_record(id)?;
    let responses = page_responses(&db, vec![record], Some(requester))?;
    let response = responses
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("post record vanished".to_string()))?;
    Ok(Json(response))
}

/// `DELETE /api/posts/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    let post = db.get_post(id)?;
    if let Decision::Deny(_) = authorize(Some(requester), &post, Operation::Write) {
        return Err(ApiError::Forbidden("not the post owner"));
    }
    db.delete_post(id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
