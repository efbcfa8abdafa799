//! Workout CRUD handlers.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fitlog_shared::authz::{authorize, is_owner, Decision, Operation};
use fitlog_shared::types::{Intensity, WorkoutType};
use fitlog_shared::validate::{validate_duration, validate_not_blank};
use fitlog_store::{Workout, WorkoutRecord};

use crate::api::{require_requester, requester, AppState};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct WorkoutPayload {
    pub title: String,
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub intensity: Intensity,
    pub duration: i64,
    /// Defaults to today when omitted.
    pub date_logged: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl WorkoutPayload {
    fn validate(&self) -> Result<(), ApiError> {
        validate_not_blank("title", &self.title)?;
        validate_duration(self.duration)?;
        Ok(())
    }
}

#[derive(Serialize)]
pub struct WorkoutResponse {
    pub id: Uuid,
    pub owner: String,
    pub is_owner: bool,
    pub title: String,
    pub workout_type: WorkoutType,
    pub intensity: Intensity,
    pub duration: i64,
    pub date_logged: NaiveDate,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutResponse {
    fn from_record(record: WorkoutRecord, requester: Option<Uuid>) -> Self {
        let WorkoutRecord {
            workout,
            owner_username,
        } = record;
        Self {
            is_owner: is_owner(requester, &workout),
            id: workout.id,
            owner: owner_username,
            title: workout.title,
            workout_type: workout.workout_type,
            intensity: workout.intensity,
            duration: workout.duration,
            date_logged: workout.date_logged,
            notes: workout.notes,
            created_at: workout.created_at,
            updated_at: workout.updated_at,
        }
    }
}

/// `GET /api/workouts`
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WorkoutResponse>>, ApiError> {
    let requester = requester(&headers)?;
    let db = state.db.lock().await;
    let records = db.list_workouts()?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| WorkoutResponse::from_record(r, requester))
            .collect(),
    ))
}

/// `POST /api/workouts`
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WorkoutPayload>,
) -> Result<(StatusCode, Json<WorkoutResponse>), ApiError> {
    let requester = require_requester(&headers)?;
    payload.validate()?;

    let now = Utc::now();
    let workout = Workout {
        id: Uuid::new_v4(),
        owner_id: requester,
        title: payload.title.trim().to_string(),
        workout_type: payload.workout_type,
        intensity: payload.intensity,
        duration: payload.duration,
        date_logged: payload.date_logged.unwrap_or_else(|| now.date_naive()),
        notes: payload.notes,
        created_at: now,
        updated_at: now,
    };

    let db = state.db.lock().await;
    db.create_workout(&workout)?;
    let record = db.get_workout_record(workout.id)?;
    Ok((
        StatusCode::CREATED,
        Json(WorkoutResponse::from_record(record, Some(requester))),
    ))
}

/// `GET /api/workouts/{id}`
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<WorkoutResponse>, ApiError> {
    let requester = requester(&headers)?;
    let db = state.db.lock().await;
    let record = db.get_workout_record(id)?;
    Ok(Json(WorkoutResponse::from_record(record, requester)))
}

/// `PUT /api/workouts/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<WorkoutPayload>,
) -> Result<Json<WorkoutResponse>, ApiError> {
    let requester = require_requester(&headers)?;
    payload.validate()?;

    let db = state.db.lock().await;
    let mut workout = db.get_workout(id)?;
    if let Decision::Deny(_) = authorize(Some(requester), &workout, Operation::Write) {
        return Err(ApiError::Forbidden("not the workout owner"));
    }

    workout.title = payload.title.trim().to_string();
    workout.workout_type = payload.workout_type;
    workout.intensity = payload.intensity;
    workout.duration = payload.duration;
    if let Some(date) = payload.date_logged {
        workout.date_logged = date;
    }
    workout.notes = payload.notes;

    db.update_workout(&workout)?;
    let record = db.get_workout_record(id)?;
    Ok(Json(WorkoutResponse::from_record(record, Some(requester))))
}

/// `DELETE /api/workouts/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    let workout = db.get_workout(id)?;
    if let Decision::Deny(_) = authorize(Some(requester), &workout, Operation::Write) {
        return Err(ApiError::Forbidden("not the workout owner"));
    }
    db.delete_workout(id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
