//! Comment creation, listing and removal.

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Comment, CommentRecord};
use crate::row;

impl Database {
    /// Insert a new comment.  Many comments per post are allowed.
    pub fn create_comment(&self, comment: &Comment) -> Result<()> {
        self.conn().execute(
            "INSERT INTO comments (id, author_id, post_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                comment.id.to_string(),
                comment.author_id.to_string(),
                comment.post_id.to_string(),
                comment.content,
                comment.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a single comment by UUID.
    pub fn get_comment(&self, id: Uuid) -> Result<Comment> {
        self.conn()
            .query_row(
                "SELECT id, author_id, post_id, content, created_at
                 FROM comments WHERE id = ?1",
                params![id.to_string()],
                row_to_comment,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List the comments on a post, oldest first.
    pub fn list_comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT c.id, c.author_id, c.post_id, c.content, c.created_at, u.username
             FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.post_id = ?1
             ORDER BY c.created_at ASC",
        )?;
        let rows = stmt.query_map(params![post_id.to_string()], |row| {
            Ok(CommentRecord {
                comment: row_to_comment(row)?,
                author_username: row.get(5)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Delete a comment by UUID.  Returns `true` if a row was deleted.
    pub fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM comments WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

fn row_to_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row::uuid_col(row, 0)?,
        author_id: row::uuid_col(row, 1)?,
        post_id: row::uuid_col(row, 2)?,
        content: row.get(3)?,
        created_at: row::timestamp_col(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::tests::publish;
    use chrono::Utc;

    #[test]
    fn comments_list_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let post = publish(&mut db, "alice");
        let (bob, _) = db.create_user("bob").unwrap();

        for (i, text) in ["first", "second"].iter().enumerate() {
            let comment = Comment {
                id: Uuid::new_v4(),
                author_id: bob.id,
                post_id: post.id,
                content: text.to_string(),
                created_at: Utc::now() + chrono::Duration::seconds(i as i64),
            };
            db.create_comment(&comment).unwrap();
        }

        let listed = db.list_comments_for_post(post.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].comment.content, "first");
        assert_eq!(listed[0].author_username, "bob");
    }

    #[test]
    fn delete_comment_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let post = publish(&mut db, "alice");
        let (bob, _) = db.create_user("bob").unwrap();

        let comment = Comment {
            id: Uuid::new_v4(),
            author_id: bob.id,
            post_id: post.id,
            content: "nice pace".to_string(),
            created_at: Utc::now(),
        };
        db.create_comment(&comment).unwrap();
        assert_eq!(db.get_comment(comment.id).unwrap().author_id, bob.id);
        assert!(db.delete_comment(comment.id).unwrap());
        assert!(matches!(db.get_comment(comment.id), Err(StoreError::NotFound)));
    }
}
