//! The statistics assembler and its endpoints.
//!
//! Aggregation failures do not reach the client: the caller contract is a
//! 200 with an all-zero payload, matching what an account with no data
//! looks like.  That choice hides genuine store failures from clients, so
//! the assembler emits an error-level tracing event as the operator-visible
//! signal before degrading.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use uuid::Uuid;

use fitlog_shared::stats::Statistics;
use fitlog_store::Database;

use crate::api::{require_requester, AppState};
use crate::error::ApiError;

/// Compute a user's statistics as of `today`, degrading to the zeroed
/// payload if the store fails.
pub fn assemble_statistics(db: &Database, user_id: Uuid, today: NaiveDate) -> Statistics {
    match db.workout_summaries(user_id) {
        Ok(summaries) => Statistics::from_summaries(&summaries, today),
        Err(e) => {
            tracing::error!(
                user = %user_id,
                error = %e,
                "statistics aggregation failed, returning empty payload"
            );
            Statistics::zeroed()
        }
    }
}

/// `GET /api/workouts/statistics`: the requester's own statistics.
pub async fn my_statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Statistics>, ApiError> {
    let requester = require_requester(&headers)?;
    let db = state.db.lock().await;
    let today = chrono::Utc::now().date_naive();
    Ok(Json(assemble_statistics(&db, requester, today)))
}

/// `GET /api/profiles/{owner_id}/statistics`
///
/// Unlike aggregation failures, an unknown subject is a plain 404.
pub async fn profile_statistics(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<Statistics>, ApiError> {
    let db = state.db.lock().await;
    db.get_user(owner_id).map_err(|_| ApiError::NotFound("user"))?;
    let today = chrono::Utc::now().date_naive();
    Ok(Json(assemble_statistics(&db, owner_id, today)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, Utc};
    use fitlog_shared::types::{Intensity, WorkoutType};
    use fitlog_store::Workout;

    fn workout(owner_id: Uuid, date: NaiveDate) -> Workout {
        let now = Utc::now();
        Workout {
            id: Uuid::new_v4(),
            owner_id,
            title: "Session".to_string(),
            workout_type: WorkoutType::Cardio,
            intensity: Intensity::Moderate,
            duration: 30,
            date_logged: date,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn end_to_end_statistics_over_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let (alice, _) = db.create_user("alice").unwrap();

        // Workouts on D, D-1, D-2 and D-4, 30 minutes each, one month.
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        for back in [0u64, 1, 2, 4] {
            let date = today.checked_sub_days(Days::new(back)).unwrap();
            db.create_workout(&workout(alice.id, date)).unwrap();
        }

        let stats = assemble_statistics(&db, alice.id, today);
        assert_eq!(stats.total_workouts, 4);
        assert_eq!(stats.total_duration, 120);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.monthly_trends.len(), 1);
        assert_eq!(stats.monthly_trends[0].total, 4);
        assert_eq!(stats.monthly_trends[0].duration, 120);
    }

    #[test]
    fn unknown_user_has_zero_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            assemble_statistics(&db, Uuid::new_v4(), today),
            Statistics::zeroed()
        );
    }

    #[test]
    fn store_failure_degrades_to_zeroed_payload() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let (alice, _) = db.create_user("alice").unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        db.create_workout(&workout(alice.id, today)).unwrap();

        // Sabotage the schema so the summary query fails.
        db.conn().execute_batch("DROP TABLE workouts").unwrap();

        assert_eq!(assemble_statistics(&db, alice.id, today), Statistics::zeroed());
    }
}
