//! The one-pass query feeding the statistics assembler.

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::row;
use fitlog_shared::stats::WorkoutSummary;

impl Database {
    /// Fetch (type, duration, date) for every workout owned by `owner_id`.
    ///
    /// A single scan; the streak and bucket math runs over the result in
    /// `fitlog_shared::stats`.
    pub fn workout_summaries(&self, owner_id: Uuid) -> Result<Vec<WorkoutSummary>> {
        let mut stmt = self.conn().prepare(
            "SELECT workout_type, duration, date_logged
             FROM workouts WHERE owner_id = ?1",
        )?;
        let rows = stmt.query_map(params![owner_id.to_string()], |r| {
            Ok(WorkoutSummary {
                workout_type: row::enum_col(r, 0)?,
                duration: r.get(1)?,
                date_logged: row::date_col(r, 2)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workouts::tests::sample_workout;
    use chrono::NaiveDate;

    #[test]
    fn summaries_cover_only_the_owner() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let (alice, _) = db.create_user("alice").unwrap();
        let (bob, _) = db.create_user("bob").unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        db.create_workout(&sample_workout(alice.id, date)).unwrap();
        db.create_workout(&sample_workout(alice.id, date)).unwrap();
        db.create_workout(&sample_workout(bob.id, date)).unwrap();

        let summaries = db.workout_summaries(alice.id).unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.date_logged == date));

        assert!(db.workout_summaries(Uuid::new_v4()).unwrap().is_empty());
    }
}
