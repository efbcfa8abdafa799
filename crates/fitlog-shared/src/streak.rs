//! Workout streak calculation.
//!
//! A streak is the number of contiguous calendar days with at least one
//! logged workout, counted backward from the most recent logged day.  The
//! most recent day does not have to be today: a user who stopped logging a
//! week ago keeps whatever streak they had built up to their last entry.

use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Compute the current streak from a user's `date_logged` values.
///
/// The input may be unsorted and contain duplicates; multiple workouts on
/// the same day count as a single logged day.  Returns 0 for an empty
/// input.
pub fn current_streak(dates: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let distinct: BTreeSet<NaiveDate> = dates.into_iter().collect();

    let mut newest_first = distinct.into_iter().rev();
    let Some(mut anchor) = newest_first.next() else {
        return 0;
    };

    let mut streak = 1;
    for day in newest_first {
        if (anchor - day).num_days() == 1 {
            streak += 1;
            anchor = day;
        } else {
            // Gap of more than one day breaks the chain immediately.
            break;
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(current_streak([]), 0);
    }

    #[test]
    fn single_day_is_one() {
        assert_eq!(current_streak([d("2024-03-15")]), 1);
    }

    #[test]
    fn consecutive_days_accumulate() {
        let dates = [d("2024-03-15"), d("2024-03-14"), d("2024-03-13")];
        assert_eq!(current_streak(dates), 3);
    }

    #[test]
    fn gap_breaks_the_chain() {
        // Two dates with a 2+ day gap: only the most recent day counts.
        assert_eq!(current_streak([d("2024-03-15"), d("2024-03-12")]), 1);
        // A gap further back keeps the leading run.
        let dates = [d("2024-03-15"), d("2024-03-14"), d("2024-03-10")];
        assert_eq!(current_streak(dates), 2);
    }

    #[test]
    fn duplicate_days_collapse() {
        let dates = [d("2024-03-15"), d("2024-03-15"), d("2024-03-14")];
        assert_eq!(current_streak(dates), 2);
    }

    #[test]
    fn unsorted_input_is_fine() {
        let dates = [d("2024-03-13"), d("2024-03-15"), d("2024-03-14")];
        assert_eq!(current_streak(dates), 3);
    }

    #[test]
    fn streak_is_anchored_at_most_recent_entry_not_today() {
        // Built entirely in the past; still counts.
        let anchor = NaiveDate::from_ymd_opt(2020, 6, 10).unwrap();
        let dates: Vec<_> = (0..5)
            .map(|i| anchor.checked_sub_days(Days::new(i)).unwrap())
            .collect();
        assert_eq!(current_streak(dates), 5);
    }
}
