//! v001 -- Initial schema creation.
//!
//! Creates the seven core tables: `users`, `profiles`, `workouts`,
//! `workout_posts`, `likes`, `comments`, and `followers`.
//!
//! The unique constraints here are load-bearing: they are what turns a
//! concurrent second insert of the same like / follow edge / profile into a
//! conflict instead of a silent duplicate.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    username   TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL                -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Profiles (exactly one per user, created with the user)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS profiles (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    owner_id   TEXT NOT NULL UNIQUE,        -- FK -> users(id), 1:1
    name       TEXT,
    content    TEXT,
    image      TEXT NOT NULL DEFAULT 'images/default_profile.png',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
);

-- ----------------------------------------------------------------
-- Workouts
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS workouts (
    id           TEXT PRIMARY KEY NOT NULL, -- UUID v4
    owner_id     TEXT NOT NULL,             -- FK -> users(id)
    title        TEXT NOT NULL,
    workout_type TEXT NOT NULL,             -- cardio/strength/flexibility/sports/other
    intensity    TEXT NOT NULL,             -- low/moderate/high
    duration     INTEGER NOT NULL,          -- minutes, 1..=1440
    date_logged  TEXT NOT NULL,             -- YYYY-MM-DD (calendar date)
    notes        TEXT NOT NULL DEFAULT '',
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,

    FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_workouts_owner_date
    ON workouts(owner_id, date_logged DESC);

-- ----------------------------------------------------------------
-- Workout posts (a published wrapper around exactly one workout)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS workout_posts (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    owner_id   TEXT NOT NULL,               -- FK -> users(id)
    workout_id TEXT NOT NULL UNIQUE,        -- FK -> workouts(id), 1:1
    content    TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    FOREIGN KEY (owner_id)   REFERENCES users(id)    ON DELETE CASCADE,
    FOREIGN KEY (workout_id) REFERENCES workouts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_posts_owner ON workout_posts(owner_id);

-- ----------------------------------------------------------------
-- Likes (at most one per owner/post pair)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS likes (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    owner_id   TEXT NOT NULL,               -- FK -> users(id)
    post_id    TEXT NOT NULL,               -- FK -> workout_posts(id)
    created_at TEXT NOT NULL,

    FOREIGN KEY (owner_id) REFERENCES users(id)         ON DELETE CASCADE,
    FOREIGN KEY (post_id)  REFERENCES workout_posts(id) ON DELETE CASCADE,
    UNIQUE (owner_id, post_id)
);

CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id);

-- ----------------------------------------------------------------
-- Comments
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS comments (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    author_id  TEXT NOT NULL,               -- FK -> users(id)
    post_id    TEXT NOT NULL,               -- FK -> workout_posts(id)
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (author_id) REFERENCES users(id)         ON DELETE CASCADE,
    FOREIGN KEY (post_id)   REFERENCES workout_posts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id);

-- ----------------------------------------------------------------
-- Follow edges (at most one per ordered follower/followed pair)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS followers (
    id          TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    follower_id TEXT NOT NULL,              -- FK -> users(id)
    followed_id TEXT NOT NULL,              -- FK -> users(id)
    created_at  TEXT NOT NULL,

    FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (followed_id) REFERENCES users(id) ON DELETE CASCADE,
    UNIQUE (follower_id, followed_id)
);

CREATE INDEX IF NOT EXISTS idx_followers_followed ON followers(followed_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
