//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! to the HTTP layer without an intermediate mapping for the simple cases.
//! The `*Record` structs are join results carrying the owner's username for
//! list/detail payloads (a 1:1 join, so it cannot inflate counts).

use chrono::{DateTime, NaiveDate, Utc};
use fitlog_shared::authz::Owned;
use fitlog_shared::types::{Intensity, WorkoutType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder image reference assigned to every new profile.
pub const DEFAULT_PROFILE_IMAGE: &str = "images/default_profile.png";

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// An account identity.  Authentication happens upstream; the store only
/// needs the principal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// The public profile attached 1:1 to a user, created with the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: Option<String>,
    pub content: Option<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Profile {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

// ---------------------------------------------------------------------------
// Workout
// ---------------------------------------------------------------------------

/// A single logged workout.  `date_logged` is a calendar date, not a
/// timestamp; streak and trend math operate on day granularity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workout {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub workout_type: WorkoutType,
    pub intensity: Intensity,
    pub duration: i64,
    pub date_logged: NaiveDate,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Workout {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

// ---------------------------------------------------------------------------
// WorkoutPost
// ---------------------------------------------------------------------------

/// A published wrapper around exactly one workout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutPost {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub workout_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for WorkoutPost {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

// ---------------------------------------------------------------------------
// Like
// ---------------------------------------------------------------------------

/// A like on a post.  At most one per (owner, post) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Like {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Owned for Like {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment on a post; write access is keyed on the author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

// ---------------------------------------------------------------------------
// Follower
// ---------------------------------------------------------------------------

/// A follow edge.  At most one per ordered (follower, followed) pair; only
/// the follower may remove it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Follower {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Owned for Follower {
    fn owner_id(&self) -> Uuid {
        self.follower_id
    }
}

// ---------------------------------------------------------------------------
// Joined records for list/detail payloads
// ---------------------------------------------------------------------------

/// A workout joined with its owner's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutRecord {
    pub workout: Workout,
    pub owner_username: String,
}

/// A post joined with its owner's username and the wrapped workout's
/// type/duration/intensity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub post: WorkoutPost,
    pub owner_username: String,
    pub workout_type: WorkoutType,
    pub workout_duration: i64,
    pub workout_intensity: Intensity,
}

/// A profile joined with its owner's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub profile: Profile,
    pub owner_username: String,
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub comment: Comment,
    pub author_username: String,
}
