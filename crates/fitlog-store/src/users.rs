//! User accounts and the profile lifecycle.
//!
//! A Profile exists for exactly one User and is created in the same SQLite
//! transaction as the account itself: both rows land or neither does.
//! Nothing else in the system creates profiles, and deleting a user
//! cascades to its profile.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{map_unique_violation, Result, StoreError};
use crate::models::{Profile, User, DEFAULT_PROFILE_IMAGE};
use crate::row;

impl Database {
    /// Create a new user together with its default profile.
    ///
    /// A second account with the same username fails with
    /// [`StoreError::Duplicate`] and leaves no partial rows behind.
    pub fn create_user(&mut self, username: &str) -> Result<(User, Profile)> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: now,
        };
        let profile = Profile {
            id: Uuid::new_v4(),
            owner_id: user.id,
            name: None,
            content: None,
            image: DEFAULT_PROFILE_IMAGE.to_string(),
            created_at: now,
            updated_at: now,
        };

        let tx = self.conn_mut().transaction()?;
        tx.execute(
            "INSERT INTO users (id, username, created_at) VALUES (?1, ?2, ?3)",
            params![
                user.id.to_string(),
                user.username,
                user.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| map_unique_violation("username", e))?;
        tx.execute(
            "INSERT INTO profiles (id, owner_id, name, content, image, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                profile.id.to_string(),
                profile.owner_id.to_string(),
                profile.name,
                profile.content,
                profile.image,
                profile.created_at.to_rfc3339(),
                profile.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| map_unique_violation("profile", e))?;
        tx.commit()?;

        tracing::info!(user = %user.id, username = %user.username, "created user with profile");
        Ok((user, profile))
    }

    /// Fetch a single user by id.
    pub fn get_user(&self, id: Uuid) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, username, created_at FROM users WHERE id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Fetch a single user by username.
    pub fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, username, created_at FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    // ON DELETE CASCADE: profile, workouts, posts, likes, comments and
    // follow edges go with it
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row::uuid_col(row, 0)?,
        username: row.get(1)?,
        created_at: row::timestamp_col(row, 2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn registration_creates_exactly_one_default_profile() {
        let (_dir, mut db) = open_db();
        let (user, profile) = db.create_user("alice").unwrap();

        assert_eq!(profile.owner_id, user.id);
        assert_eq!(profile.image, DEFAULT_PROFILE_IMAGE);
        assert!(profile.name.is_none());
        assert!(profile.content.is_none());

        let count: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM profiles WHERE owner_id = ?1",
                params![user.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let (_dir, mut db) = open_db();
        db.create_user("alice").unwrap();
        let err = db.create_user("alice").unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("username")));

        // The failed attempt must not leave an orphan profile behind.
        let profiles: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))
            .unwrap();
        assert_eq!(profiles, 1);
    }

    #[test]
    fn delete_cascades_to_profile() {
        let (_dir, mut db) = open_db();
        let (user, _) = db.create_user("bob").unwrap();
        assert!(db.delete_user(user.id).unwrap());
        assert!(matches!(db.get_user(user.id), Err(StoreError::NotFound)));

        let profiles: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))
            .unwrap();
        assert_eq!(profiles, 0);
    }

    #[test]
    fn lookup_by_username() {
        let (_dir, mut db) = open_db();
        let (user, _) = db.create_user("carol").unwrap();
        assert_eq!(db.get_user_by_username("carol").unwrap().id, user.id);
        assert!(matches!(
            db.get_user_by_username("nobody"),
            Err(StoreError::NotFound)
        ));
    }
}
