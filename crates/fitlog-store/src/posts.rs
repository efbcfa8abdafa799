//! CRUD operations for [`WorkoutPost`] records.
//!
//! A post wraps exactly one workout; the `workout_id` unique constraint
//! turns a second publish of the same workout into a conflict.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{map_unique_violation, Result, StoreError};
use crate::models::{PostRecord, WorkoutPost};
use crate::row;

const SELECT_RECORD: &str = "SELECT p.id, p.owner_id, p.workout_id, p.content,
            p.created_at, p.updated_at, u.username,
            w.workout_type, w.duration, w.intensity
     FROM workout_posts p
     JOIN users u ON u.id = p.owner_id
     JOIN workouts w ON w.id = p.workout_id";

impl Database {
    /// Publish a workout as a post.
    pub fn create_post(&self, post: &WorkoutPost) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO workout_posts (id, owner_id, workout_id, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    post.id.to_string(),
                    post.owner_id.to_string(),
                    post.workout_id.to_string(),
                    post.content,
                    post.created_at.to_rfc3339(),
                    post.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| map_unique_violation("post", e))?;
        Ok(())
    }

    /// Fetch a single post by UUID.
    pub fn get_post(&self, id: Uuid) -> Result<WorkoutPost> {
        self.conn()
            .query_row(
                "SELECT id, owner_id, workout_id, content, created_at, updated_at
                 FROM workout_posts WHERE id = ?1",
                params![id.to_string()],
                row_to_post,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Fetch a post joined with its owner's username and the wrapped
    /// workout's type, duration and intensity.
    pub fn get_post_record(&self, id: Uuid) -> Result<PostRecord> {
        self.conn()
            .query_row(
                &format!("{SELECT_RECORD} WHERE p.id = ?1"),
                params![id.to_string()],
                row_to_post_record,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List all posts, newest first.
    pub fn list_posts(&self) -> Result<Vec<PostRecord>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{SELECT_RECORD} ORDER BY p.created_at DESC"))?;
        let rows = stmt.query_map([], row_to_post_record)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Replace the free-text content of a post.
    pub fn update_post_content(&self, id: Uuid, content: &str) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE workout_posts SET content = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), content, Utc::now().to_rfc3339()],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Delete a post by UUID.  Returns `true` if a row was deleted.
    /// Likes and comments on it go with it (cascade).
    pub fn delete_post(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM workout_posts WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkoutPost> {
    Ok(WorkoutPost {
        id: row::uuid_col(row, 0)?,
        owner_id: row::uuid_col(row, 1)?,
        workout_id: row::uuid_col(row, 2)?,
        content: row.get(3)?,
        created_at: row::timestamp_col(row, 4)?,
        updated_at: row::timestamp_col(row, 5)?,
    })
}

fn row_to_post_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        post: row_to_post(row)?,
        owner_username: row.get(6)?,
        workout_type: row::enum_col(row, 7)?,
        workout_duration: row.get(8)?,
        workout_intensity: row::enum_col(row, 9)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::workouts::tests::sample_workout;
    use chrono::NaiveDate;

    /// Create a user, a workout and a post wrapping it; returns the post.
    pub(crate) fn publish(db: &mut Database, username: &str) -> WorkoutPost {
        let (user, _) = db.create_user(username).unwrap();
        publish_for(db, user.id)
    }

    pub(crate) fn publish_for(db: &Database, owner_id: Uuid) -> WorkoutPost {
        let workout = sample_workout(owner_id, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        db.create_workout(&workout).unwrap();
        let now = Utc::now();
        let post = WorkoutPost {
            id: Uuid::new_v4(),
            owner_id,
            workout_id: workout.id,
            content: "felt great".to_string(),
            created_at: now,
            updated_at: now,
        };
        db.create_post(&post).unwrap();
        post
    }

    #[test]
    fn publish_and_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let post = publish(&mut db, "alice");

        let record = db.get_post_record(post.id).unwrap();
        assert_eq!(record.owner_username, "alice");
        assert_eq!(record.workout_duration, 30);
        assert_eq!(db.list_posts().unwrap().len(), 1);

        db.update_post_content(post.id, "updated").unwrap();
        assert_eq!(db.get_post(post.id).unwrap().content, "updated");

        assert!(db.delete_post(post.id).unwrap());
        assert!(matches!(db.get_post(post.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn one_post_per_workout() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let post = publish(&mut db, "alice");

        let now = Utc::now();
        let second = WorkoutPost {
            id: Uuid::new_v4(),
            owner_id: post.owner_id,
            workout_id: post.workout_id,
            content: String::new(),
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            db.create_post(&second),
            Err(StoreError::Duplicate("post"))
        ));
    }

    #[test]
    fn deleting_workout_removes_post() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let post = publish(&mut db, "alice");
        assert!(db.delete_workout(post.workout_id).unwrap());
        assert!(matches!(db.get_post(post.id), Err(StoreError::NotFound)));
    }
}
