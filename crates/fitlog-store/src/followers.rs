//! Follow edge creation, lookup and removal.
//!
//! One edge per ordered (follower, followed) pair; the `UNIQUE` constraint
//! arbitrates concurrent duplicate attempts.

use std::collections::HashMap;

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{map_unique_violation, Result, StoreError};
use crate::models::Follower;
use crate::row;

impl Database {
    /// Follow a user.  A duplicate pair fails with
    /// [`StoreError::Duplicate`].
    pub fn create_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<Follower> {
        let edge = Follower {
            id: Uuid::new_v4(),
            follower_id,
            followed_id,
            created_at: Utc::now(),
        };
        self.conn()
            .execute(
                "INSERT INTO followers (id, follower_id, followed_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    edge.id.to_string(),
                    edge.follower_id.to_string(),
                    edge.followed_id.to_string(),
                    edge.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| map_unique_violation("follow", e))?;
        Ok(edge)
    }

    /// Fetch a single follow edge by UUID.
    pub fn get_follow(&self, id: Uuid) -> Result<Follower> {
        self.conn()
            .query_row(
                "SELECT id, follower_id, followed_id, created_at FROM followers WHERE id = ?1",
                params![id.to_string()],
                row_to_follower,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List the edges where `follower_id` is the follower (who they follow).
    pub fn list_following(&self, follower_id: Uuid) -> Result<Vec<Follower>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, follower_id, followed_id, created_at
             FROM followers WHERE follower_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![follower_id.to_string()], row_to_follower)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Delete a follow edge by UUID.  Returns `true` if a row was deleted.
    pub fn delete_follow(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM followers WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    /// For a page of users, find which ones `follower_id` already follows.
    ///
    /// One query for the whole page; users not followed are absent from
    /// the map.
    pub fn follow_ids_for(
        &self,
        follower_id: Uuid,
        followed_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Uuid>> {
        if followed_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; followed_ids.len()].join(", ");
        let sql = format!(
            "SELECT followed_id, id FROM followers
             WHERE follower_id = ?1 AND followed_id IN ({placeholders})"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let params_iter = std::iter::once(follower_id.to_string())
            .chain(followed_ids.iter().map(|id| id.to_string()));
        let rows = stmt.query_map(rusqlite::params_from_iter(params_iter), |row| {
            Ok((row::uuid_col(row, 0)?, row::uuid_col(row, 1)?))
        })?;

        let mut map = HashMap::new();
        for pair in rows {
            let (followed_id, edge_id) = pair?;
            map.insert(followed_id, edge_id);
        }
        Ok(map)
    }
}

fn row_to_follower(row: &rusqlite::Row<'_>) -> rusqlite::Result<Follower> {
    Ok(Follower {
        id: row::uuid_col(row, 0)?,
        follower_id: row::uuid_col(row, 1)?,
        followed_id: row::uuid_col(row, 2)?,
        created_at: row::timestamp_col(row, 3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_edge_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let (alice, _) = db.create_user("alice").unwrap();
        let (bob, _) = db.create_user("bob").unwrap();

        db.create_follow(alice.id, bob.id).unwrap();
        assert!(matches!(
            db.create_follow(alice.id, bob.id),
            Err(StoreError::Duplicate("follow"))
        ));

        // The reverse edge is a different ordered pair and is fine.
        db.create_follow(bob.id, alice.id).unwrap();
    }

    #[test]
    fn follow_listing_and_removal() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let (alice, _) = db.create_user("alice").unwrap();
        let (bob, _) = db.create_user("bob").unwrap();
        let (carol, _) = db.create_user("carol").unwrap();

        let edge = db.create_follow(alice.id, bob.id).unwrap();
        db.create_follow(alice.id, carol.id).unwrap();

        assert_eq!(db.list_following(alice.id).unwrap().len(), 2);

        let map = db
            .follow_ids_for(alice.id, &[bob.id, carol.id])
            .unwrap();
        assert_eq!(map.get(&bob.id), Some(&edge.id));
        assert_eq!(map.len(), 2);

        assert!(db.delete_follow(edge.id).unwrap());
        assert!(matches!(db.get_follow(edge.id), Err(StoreError::NotFound)));
        assert_eq!(db.list_following(alice.id).unwrap().len(), 1);
    }
}
