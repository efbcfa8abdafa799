//! # fitlog-store
//!
//! Relational persistence for the fitlog backend, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for every domain
//! model, plus the batched aggregate counters used by list endpoints and
//! the one-pass summary query feeding the statistics assembler.
//!
//! Uniqueness rules (one Like per user/post, one follow edge per ordered
//! pair, one Profile per user) are enforced by `UNIQUE` constraints in the
//! schema and surface as [`StoreError::Duplicate`].

pub mod comments;
pub mod counts;
pub mod database;
pub mod followers;
pub mod likes;
pub mod migrations;
pub mod models;
pub mod posts;
pub mod profiles;
pub mod stats;
pub mod users;
pub mod workouts;

mod error;
mod row;

pub use counts::{PostCounts, UserCounts};
pub use database::Database;
pub use error::StoreError;
pub use models::*;
