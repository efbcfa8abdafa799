//! # fitlog-shared
//!
//! Pure domain logic for the fitlog backend: workout enums, the streak
//! calculator, statistics aggregation, ownership-based authorization, and
//! input validation.  No I/O lives here; the store and server crates both
//! depend on it.

pub mod authz;
pub mod stats;
pub mod streak;
pub mod types;
pub mod validate;

pub use authz::{authorize, Decision, DenyReason, Operation, Owned};
pub use stats::{MonthlyBucket, Statistics, TypeCount, WorkoutSummary};
pub use types::{Intensity, WorkoutType};
pub use validate::ValidationError;
