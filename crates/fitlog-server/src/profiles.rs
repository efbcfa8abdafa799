//! Profile handlers.
//!
//! Profiles cannot be created or deleted here; they live and die with
//! their user.  List and detail payloads embed post/follower/following
//! counts from the batched counters and the requester's own follow edge.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fitlog_shared::authz::{authorize, is_owner, Decision, Operation};
use fitlog_store::{Database, ProfileRecord, UserCounts};

use crate::api::{require_requester, requester, AppState};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ProfilePayload {
    pub name: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner: String,
    pub name: Option<String>,
    pub content: Option<String>,
    pub image: String,
    pub is_owner: bool,
    pub following_id: Option<Uuid>,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileResponse {
    fn from_record(
        record: ProfileRecord,
        counts: UserCounts,
        following_id: Option<Uuid>,
        requester: Option<Uuid>,
    ) -> Self {
        let ProfileRecord {
            profile,
            owner_username,
        } = record;
        Self {
            is_owner: is_owner(requester, &profile),
            id: profile.id,
            owner_id: profile.owner_id,
            owner: owner_username,
            name: profile.name,
            content: profile.content,
            image: profile.image,
            following_id,
            posts_count: counts.posts,
            followers_count: counts.followers,
            following_count: counts.following,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Assemble responses for a page of profiles: one counts pass per kind
/// plus one follow-edge lookup for the requester.
fn page_responses(
    db: &Database,
    records: Vec<ProfileRecord>,
    requester: Option<Uuid>,
) -> Result<Vec<ProfileResponse>, ApiError> {
    let owner_ids: Vec<Uuid> = records.iter().map(|r| r.profile.owner_id).collect();
    let counts = db.user_counts(&owner_ids)?;
    let follow_ids: HashMap<Uuid, Uuid> = match requester {
        Some(user) => db.follow_ids_for(user, &owner_ids)?,
        None => HashMap::new(),
    };

    Ok(records
        .into_iter()
        .map(|record| {
            let owner = record.profile.owner_id;
            ProfileResponse::from_record(
                record,
                counts.get(&owner).copied().unwrap_or_default(),
                follow_ids.get(&owner).copied(),
                requester,
            )
        })
        .collect())
}

fn single_response(
    db: &Database,
    record: ProfileRecord,
    requester: Option<Uuid>,
) -> Result<ProfileResponse, ApiError> {
    page_responses(db, vec![record], requester)?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("profile record vanished".to_string()))
}

/// `GET /api/profiles`
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ProfileResponse>>, ApiError> {
    let requester = requester(&headers)?;
    let db = state.db.lock().await;
    let records = db.list_profiles()?;
    Ok(Json(page_responses(&db, records, requester)?))
}

/// `GET /api/profiles/current`
pub async fn current(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    let record = db.get_profile(requester)?;
    Ok(Json(single_response(&db, record, Some(requester))?))
}

/// `GET /api/profiles/{owner_id}`
pub async fn detail(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let requester = requester(&headers)?;
    let db = state.db.lock().await;
    let record = db.get_profile(owner_id)?;
    Ok(Json(single_response(&db, record, requester)?))
}

/// `PUT /api/profiles/{owner_id}`
pub async fn update(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    let record = db.get_profile(owner_id)?;
    if let Decision::Deny(_) = authorize(Some(requester), &record.profile, Operation::Write) {
        return Err(ApiError::Forbidden("not the profile owner"));
    }

    let updated = db.update_profile(
        owner_id,
        payload.name.as_deref(),
        payload.content.as_deref(),
        payload.image.as_deref(),
    )?;
    Ok(Json(single_response(&db, updated, Some(requester))?))
}
