//! Statistics payload types and the pure aggregation behind them.
//!
//! The store fetches one [`WorkoutSummary`] row per workout; everything else
//! (totals, streak, weekly window, per-type counts, monthly trend buckets)
//! is computed here so it can be tested without a database.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::streak;
use crate::types::WorkoutType;

/// Monthly trend buckets are capped at one year of history.
pub const MONTHLY_TREND_CAP: usize = 12;

/// The per-workout slice of data statistics are computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutSummary {
    pub workout_type: WorkoutType,
    pub duration: i64,
    pub date_logged: NaiveDate,
}

/// Count of workouts sharing one [`WorkoutType`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeCount {
    pub workout_type: WorkoutType,
    pub count: i64,
}

/// One calendar month of activity.  `month` is the first day of the month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyBucket {
    pub month: NaiveDate,
    pub total: i64,
    pub duration: i64,
}

/// The public statistics payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    pub total_workouts: i64,
    pub workouts_this_week: i64,
    pub current_streak: u32,
    pub total_duration: i64,
    pub workout_types: Vec<TypeCount>,
    pub monthly_trends: Vec<MonthlyBucket>,
}

impl Statistics {
    /// The payload returned when aggregation fails or the user has no data.
    pub fn zeroed() -> Self {
        Self {
            total_workouts: 0,
            workouts_this_week: 0,
            current_streak: 0,
            total_duration: 0,
            workout_types: Vec::new(),
            monthly_trends: Vec::new(),
        }
    }

    /// Aggregate a user's workout summaries as of `today`.
    ///
    /// "This week" is the 7 calendar days ending at `today` inclusive.
    /// Monthly buckets are ordered most-recent-first and capped at
    /// [`MONTHLY_TREND_CAP`].
    pub fn from_summaries(summaries: &[WorkoutSummary], today: NaiveDate) -> Self {
        if summaries.is_empty() {
            return Self::zeroed();
        }

        let total_workouts = summaries.len() as i64;
        let total_duration = summaries.iter().map(|s| s.duration).sum();

        let workouts_this_week = summaries
            .iter()
            .filter(|s| {
                let age = today.signed_duration_since(s.date_logged).num_days();
                (0..7).contains(&age)
            })
            .count() as i64;

        let current_streak = streak::current_streak(summaries.iter().map(|s| s.date_logged));

        let mut by_type: BTreeMap<WorkoutType, i64> = BTreeMap::new();
        for s in summaries {
            *by_type.entry(s.workout_type).or_default() += 1;
        }
        let mut workout_types: Vec<TypeCount> = by_type
            .into_iter()
            .map(|(workout_type, count)| TypeCount { workout_type, count })
            .collect();
        // Descending by count, then by name so ties are deterministic.
        workout_types.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.workout_type.as_str().cmp(b.workout_type.as_str()))
        });

        let mut by_month: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
        for s in summaries {
            let month = first_of_month(s.date_logged);
            let bucket = by_month.entry(month).or_default();
            bucket.0 += 1;
            bucket.1 += s.duration;
        }
        let monthly_trends: Vec<MonthlyBucket> = by_month
            .into_iter()
            .rev()
            .take(MONTHLY_TREND_CAP)
            .map(|(month, (total, duration))| MonthlyBucket {
                month,
                total,
                duration,
            })
            .collect();

        Self {
            total_workouts,
            workouts_this_week,
            current_streak,
            total_duration,
            workout_types,
            monthly_trends,
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // day 1 always exists for a valid year/month
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}
