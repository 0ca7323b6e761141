//! Recurrence matching: is a goal active on a given date?
//!
//! # Invariants
//! - Total over every recurrence variant; no input can fault.
//! - A weekly goal with an empty day set is never active.
//! - Tombstoned goals are never active.

use crate::model::goal::{Goal, Recurrence};
use chrono::{Datelike, NaiveDate};

/// Returns whether `goal` is due on `date`.
///
/// Dates are timezone-naive local calendar days; `Once` and `Monthly`
/// anchor on the goal's creation day.
pub fn occurs_on(goal: &Goal, date: NaiveDate) -> bool {
    if goal.is_deleted {
        return false;
    }

    match &goal.recurrence {
        Recurrence::Daily => true,
        Recurrence::Weekly(days) => days.contains(date.weekday()),
        Recurrence::Once => date == goal.anchor_date(),
        Recurrence::Monthly => monthly_matches(goal.anchor_date(), date),
    }
}

/// Monthly rule: due on the anchor's day-of-month, clamped to the last day
/// of shorter months. A goal anchored on the 31st fires on Apr 30 and on
/// Feb 29/28, never twice in one month.
fn monthly_matches(anchor: NaiveDate, date: NaiveDate) -> bool {
    let clamped = anchor.day().min(last_day_of_month(date.year(), date.month()));
    date.day() == clamped
}

/// Returns the number of days in the given month.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> u32 {
    // Day 28 exists in every month; probe upward for the real month end.
    (29..=31)
        .take_while(|day| NaiveDate::from_ymd_opt(year, month, *day).is_some())
        .last()
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::last_day_of_month;

    #[test]
    fn month_lengths_cover_leap_years() {
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2023, 2), 28);
        assert_eq!(last_day_of_month(2024, 4), 30);
        assert_eq!(last_day_of_month(2024, 12), 31);
    }
}
