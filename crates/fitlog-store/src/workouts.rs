//! CRUD operations for [`Workout`] records.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Workout, WorkoutRecord};
use crate::row;

const SELECT_COLS: &str = "w.id, w.owner_id, w.title, w.workout_type, w.intensity,
             w.duration, w.date_logged, w.notes, w.created_at, w.updated_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new workout.  Duration bounds are validated at the API
    /// boundary before this is called.
    pub fn create_workout(&self, workout: &Workout) -> Result<()> {
        self.conn().execute(
            "INSERT INTO workouts (id, owner_id, title, workout_type, intensity,
                                   duration, date_logged, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                workout.id.to_string(),
                workout.owner_id.to_string(),
                workout.title,
                workout.workout_type.as_str(),
                workout.intensity.as_str(),
                workout.duration,
                workout.date_logged.format("%Y-%m-%d").to_string(),
                workout.notes,
                workout.created_at.to_rfc3339(),
                workout.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single workout by UUID.
    pub fn get_workout(&self, id: Uuid) -> Result<Workout> {
        self.conn()
            .query_row(
                &format!("SELECT {SELECT_COLS} FROM workouts w WHERE w.id = ?1"),
                params![id.to_string()],
                row_to_workout,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Fetch a workout joined with its owner's username.
    pub fn get_workout_record(&self, id: Uuid) -> Result<WorkoutRecord> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {SELECT_COLS}, u.username
                     FROM workouts w JOIN users u ON u.id = w.owner_id
                     WHERE w.id = ?1"
                ),
                params![id.to_string()],
                row_to_workout_record,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List all workouts, most recently logged first.
    pub fn list_workouts(&self) -> Result<Vec<WorkoutRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {SELECT_COLS}, u.username
             FROM workouts w JOIN users u ON u.id = w.owner_id
             ORDER BY w.date_logged DESC, w.created_at DESC"
        ))?;
        let rows = stmt.query_map([], row_to_workout_record)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Update the mutable fields of a workout.
    pub fn update_workout(&self, workout: &Workout) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE workouts
             SET title = ?2, workout_type = ?3, intensity = ?4, duration = ?5,
                 date_logged = ?6, notes = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                workout.id.to_string(),
                workout.title,
                workout.workout_type.as_str(),
                workout.intensity.as_str(),
                workout.duration,
                workout.date_logged.format("%Y-%m-%d").to_string(),
                workout.notes,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a workout by UUID.  Returns `true` if a row was deleted.
    /// Any post wrapping it goes with it (cascade).
    pub fn delete_workout(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM workouts WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_workout(row: &rusqlite::Row<'_>) -> rusqlite::Result<Workout> {
    Ok(Workout {
        id: row::uuid_col(row, 0)?,
        owner_id: row::uuid_col(row, 1)?,
        title: row.get(2)?,
        workout_type: row::enum_col(row, 3)?,
        intensity: row::enum_col(row, 4)?,
        duration: row.get(5)?,
        date_logged: row::date_col(row, 6)?,
        notes: row.get(7)?,
        created_at: row::timestamp_col(row, 8)?,
        updated_at: row::timestamp_col(row, 9)?,
    })
}

fn row_to_workout_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkoutRecord> {
    Ok(WorkoutRecord {
        workout: row_to_workout(row)?,
        owner_username: row.get(10)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fitlog_shared::types::{Intensity, WorkoutType};

    pub(crate) fn sample_workout(owner_id: Uuid, date: NaiveDate) -> Workout {
        let now = Utc::now();
        Workout {
            id: Uuid::new_v4(),
            owner_id,
            title: "Morning Run".to_string(),
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
    fn crud_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let (alice, _) = db.create_user("alice").unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut workout = sample_workout(alice.id, date);
        db.create_workout(&workout).unwrap();

        let fetched = db.get_workout(workout.id).unwrap();
        assert_eq!(fetched.title, "Morning Run");
        assert_eq!(fetched.date_logged, date);
        assert_eq!(fetched.workout_type, WorkoutType::Cardio);

        workout.title = "Evening Run".to_string();
        workout.intensity = Intensity::High;
        db.update_workout(&workout).unwrap();
        let fetched = db.get_workout_record(workout.id).unwrap();
        assert_eq!(fetched.workout.title, "Evening Run");
        assert_eq!(fetched.owner_username, "alice");

        assert_eq!(db.list_workouts().unwrap().len(), 1);
        assert!(db.delete_workout(workout.id).unwrap());
        assert!(matches!(db.get_workout(workout.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn list_is_ordered_by_date_logged_desc() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let (alice, _) = db.create_user("alice").unwrap();

        for day in [10, 20, 15] {
            let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            db.create_workout(&sample_workout(alice.id, date)).unwrap();
        }

        let days: Vec<u32> = db
            .list_workouts()
            .unwrap()
            .iter()
            .map(|r| chrono::Datelike::day(&r.workout.date_logged))
            .collect();
        assert_eq!(days, vec![20, 15, 10]);
    }

    #[test]
    fn update_of_missing_workout_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let ghost = sample_workout(Uuid::new_v4(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(matches!(db.update_workout(&ghost), Err(StoreError::NotFound)));
    }
}
