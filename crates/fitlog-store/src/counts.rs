//! Batched relationship counters.
//!
//! List endpoints need N×K counts (likes/comments per post, posts/
//! followers/following per user) for a page of N subjects.  Each count
//! kind is one fixed `GROUP BY` query over the page's ids, so the number
//! of store round-trips per page is constant regardless of N.
//!
//! Every kind is counted independently and merged by subject id afterwards
//! -- never through a single multi-join query, whose row fan-out would
//! inflate one kind's count by another's cardinality.  Subjects with no
//! related rows are present in the result with zero counts.

use std::collections::HashMap;

use rusqlite::params_from_iter;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::row;

/// Like and comment counts for one post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostCounts {
    pub likes: i64,
    pub comments: i64,
}

/// Post, follower and following counts for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCounts {
    pub posts: i64,
    pub followers: i64,
    pub following: i64,
}

// The fixed aggregation pipeline: one named query per count kind.
const LIKES_BY_POST: &str =
    "SELECT post_id, COUNT(*) FROM likes WHERE post_id IN ({ids}) GROUP BY post_id";
const COMMENTS_BY_POST: &str =
    "SELECT post_id, COUNT(*) FROM comments WHERE post_id IN ({ids}) GROUP BY post_id";
const POSTS_BY_OWNER: &str =
    "SELECT owner_id, COUNT(*) FROM workout_posts WHERE owner_id IN ({ids}) GROUP BY owner_id";
const FOLLOWERS_BY_USER: &str =
    "SELECT followed_id, COUNT(*) FROM followers WHERE followed_id IN ({ids}) GROUP BY followed_id";
const FOLLOWING_BY_USER: &str =
    "SELECT follower_id, COUNT(*) FROM followers WHERE follower_id IN ({ids}) GROUP BY follower_id";

impl Database {
    /// Like/comment counts for a page of posts.  Two queries total.
    pub fn post_counts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, PostCounts>> {
        let likes = self.count_grouped(LIKES_BY_POST, post_ids)?;
        let comments = self.count_grouped(COMMENTS_BY_POST, post_ids)?;

        Ok(post_ids
            .iter()
            .map(|id| {
                (
                    *id,
                    PostCounts {
                        likes: likes.get(id).copied().unwrap_or(0),
                        comments: comments.get(id).copied().unwrap_or(0),
                    },
                )
            })
            .collect())
    }

    /// Post/follower/following counts for a page of users.  Three queries
    /// total.
    pub fn user_counts(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, UserCounts>> {
        let posts = self.count_grouped(POSTS_BY_OWNER, user_ids)?;
        let followers = self.count_grouped(FOLLOWERS_BY_USER, user_ids)?;
        let following = self.count_grouped(FOLLOWING_BY_USER, user_ids)?;

        Ok(user_ids
            .iter()
            .map(|id| {
                (
                    *id,
                    UserCounts {
                        posts: posts.get(id).copied().unwrap_or(0),
                        followers: followers.get(id).copied().unwrap_or(0),
                        following: following.get(id).copied().unwrap_or(0),
                    },
                )
            })
            .collect())
    }

    /// Run one of the fixed grouped-count queries over a page of ids.
    fn count_grouped(&self, query: &str, ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = query.replace("{ids}", &placeholders);

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(ids.iter().map(|id| id.to_string())),
            |row| {
                let id = row::uuid_col(row, 0)?;
                let count: i64 = row.get(1)?;
                Ok((id, count))
            },
        )?;

        let mut map = HashMap::new();
        for pair in rows {
            let (id, count) = pair?;
            map.insert(id, count);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Comment, WorkoutPost};
    use crate::workouts::tests::sample_workout;
    use chrono::{NaiveDate, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rusqlite::params;

    fn naive_count(db: &Database, sql: &str, id: Uuid) -> i64 {
        db.conn()
            .query_row(sql, params![id.to_string()], |row| row.get(0))
            .unwrap()
    }

    /// Batched counts must agree with a per-subject filter-and-count for
    /// every subject, zeros included.
    #[test]
    fn batched_counts_match_naive_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let mut rng = StdRng::seed_from_u64(0x5eed);

        // 15 users and 50 posts with random owners: 65 subjects total.
        let mut user_ids = Vec::new();
        for i in 0..15 {
            let (user, _) = db.create_user(&format!("user_{i}")).unwrap();
            user_ids.push(user.id);
        }

        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut post_ids = Vec::new();
        for _ in 0..50 {
            let owner = user_ids[rng.gen_range(0..user_ids.len())];
            let workout = sample_workout(owner, date);
            db.create_workout(&workout).unwrap();
            let now = Utc::now();
            let post = WorkoutPost {
                id: Uuid::new_v4(),
                owner_id: owner,
                workout_id: workout.id,
                content: String::new(),
                created_at: now,
                updated_at: now,
            };
            db.create_post(&post).unwrap();
            post_ids.push(post.id);
        }

        // Random likes (unique by construction), comments and follow edges.
        for &user in &user_ids {
            for &post in &post_ids {
                if rng.gen_bool(0.2) {
                    db.create_like(user, post).unwrap();
                }
                for _ in 0..rng.gen_range(0..3) {
                    if rng.gen_bool(0.1) {
                        db.create_comment(&Comment {
                            id: Uuid::new_v4(),
                            author_id: user,
                            post_id: post,
                            content: "gg".to_string(),
                            created_at: Utc::now(),
                        })
                        .unwrap();
                    }
                }
            }
            for &other in &user_ids {
                if other != user && rng.gen_bool(0.25) {
                    db.create_follow(user, other).unwrap();
                }
            }
        }

        let post_counts = db.post_counts(&post_ids).unwrap();
        assert_eq!(post_counts.len(), post_ids.len());
        for &post in &post_ids {
            let counts = post_counts[&post];
            assert_eq!(
                counts.likes,
                naive_count(&db, "SELECT COUNT(*) FROM likes WHERE post_id = ?1", post)
            );
            assert_eq!(
                counts.comments,
                naive_count(&db, "SELECT COUNT(*) FROM comments WHERE post_id = ?1", post)
            );
        }

        let user_counts = db.user_counts(&user_ids).unwrap();
        assert_eq!(user_counts.len(), user_ids.len());
        for &user in &user_ids {
            let counts = user_counts[&user];
            assert_eq!(
                counts.posts,
                naive_count(
                    &db,
                    "SELECT COUNT(*) FROM workout_posts WHERE owner_id = ?1",
                    user
                )
            );
            assert_eq!(
                counts.followers,
                naive_count(
                    &db,
                    "SELECT COUNT(*) FROM followers WHERE followed_id = ?1",
                    user
                )
            );
            assert_eq!(
                counts.following,
                naive_count(
                    &db,
                    "SELECT COUNT(*) FROM followers WHERE follower_id = ?1",
                    user
                )
            );
        }
    }

    #[test]
    fn subjects_with_no_rows_count_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let (alice, _) = db.create_user("alice").unwrap();

        let counts = db.user_counts(&[alice.id]).unwrap();
        assert_eq!(counts[&alice.id], UserCounts::default());
        assert!(db.post_counts(&[]).unwrap().is_empty());
    }

    /// A user's heavy activity of one kind must not leak into another
    /// kind's count.
    #[test]
    fn kinds_do_not_cross_inflate() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("test.db")).unwrap();
        let post = crate::posts::tests::publish(&mut db, "alice");
        let owner = post.owner_id;

        // Many likes by the post owner on other people's posts.
        for i in 0..5 {
            let (other, _) = db.create_user(&format!("other_{i}")).unwrap();
            let their_post = crate::posts::tests::publish_for(&db, other.id);
            db.create_like(owner, their_post.id).unwrap();
        }

        let counts = db.user_counts(&[owner]).unwrap();
        assert_eq!(counts[&owner].posts, 1);
    }
}
