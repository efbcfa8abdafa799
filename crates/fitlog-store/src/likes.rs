//! Like creation, lookup and removal.
//!
//! The second like for the same (owner, post) pair must fail, atomically
//! under concurrent attempts, so the insert is a plain INSERT and the
//! `UNIQUE (owner_id, post_id)` constraint does the arbitration.

use std::collections::HashMap;

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{map_unique_violation, Result, StoreError};
use crate::models::Like;
use crate::row;

impl Database {
    /// Like a post.  A duplicate (owner, post) pair fails with
    /// [`StoreError::Duplicate`] and leaves the existing row untouched.
    pub fn create_like(&self, owner_id: Uuid, post_id: Uuid) -> Result<Like> {
        let like = Like {
            id: Uuid::new_v4(),
            owner_id,
            post_id,
            created_at: Utc::now(),
        };
        self.conn()
            .execute(
                "INSERT INTO likes (id, owner_id, post_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    like.id.to_string(),
                    like.owner_id.to_string(),
                    like.post_id.to_string(),
                    like.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| map_unique_violation("like", e))?;
        Ok(like)
    }

    /// Fetch a single like by UUID.
    pub fn get_like(&self, id: Uuid) -> Result<Like> {
        self.conn()
            .query_row(
                "SELECT id, owner_id, post_id, created_at FROM likes WHERE id = ?1",
                params![id.to_string()],
                row_to_like,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Delete a like by UUID.  Returns `true` if a row was deleted.
    pub fn delete_like(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM likes WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    /// For a page of posts, find which ones `owner_id` has liked.
    ///
    /// One query for the whole page; posts the user has not liked are
    /// simply absent from the map.
    pub fn like_ids_for_posts(
        &self,
        owner_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Uuid>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; post_ids.len()].join(", ");
        let sql = format!(
            "SELECT post_id, id FROM likes
             WHERE owner_id = ?1 AND post_id IN ({placeholders})"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let params_iter = std::iter::once(owner_id.to_string())
            .chain(post_ids.iter().map(|id| id.to_string()));
        let rows = stmt.query_map(rusqlite::params_from_iter(params_iter), |row| {
            Ok((row::uuid_col(row, 0)?, row::uuid_col(row, 1)?))
        })?;

        let mut map = HashMap::new();
        for pair in rows {
            let (post_id, like_id) = pair?;
            map.insert(post_id, like_id);
        }
        Ok(map)
    }
}

fn row_to_like(row: &rusqlite::Row<'_>) -> rusqlite::Result<Like> {
    Ok(Like {
        id: row::uuid_col(row, 0)?,
        owner_id: row::uuid_col(row, 1)?,
        post_id: row::uuid_col(row, 2)?,
        created_at: row::timestamp_col(row, 3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::tests::publish;

    #[test]
    fn duplicate_like_is_a_conflict_with_one_surviving_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let post = publish(&mut db, "alice");
        let (bob, _) = db.create_user("bob").unwrap();

        db.create_like(bob.id, post.id).unwrap();
        let err = db.create_like(bob.id, post.id).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("like")));

        let rows: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM likes WHERE owner_id = ?1 AND post_id = ?2",
                params![bob.id.to_string(), post.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn like_lookup_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let liked = publish(&mut db, "alice");
        let (bob, _) = db.create_user("bob").unwrap();
        let not_liked = crate::posts::tests::publish_for(&db, bob.id);

        let like = db.create_like(bob.id, liked.id).unwrap();

        let map = db
            .like_ids_for_posts(bob.id, &[liked.id, not_liked.id])
            .unwrap();
        assert_eq!(map.get(&liked.id), Some(&like.id));
        assert!(!map.contains_key(&not_liked.id));
    }

    #[test]
    fn unlike_removes_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let post = publish(&mut db, "alice");
        let (bob, _) = db.create_user("bob").unwrap();

        let like = db.create_like(bob.id, post.id).unwrap();
        assert_eq!(db.get_like(like.id).unwrap().owner_id, bob.id);
        assert!(db.delete_like(like.id).unwrap());
        assert!(matches!(db.get_like(like.id), Err(StoreError::NotFound)));

        // The pair can be liked again after removal.
        db.create_like(bob.id, post.id).unwrap();
    }
}
