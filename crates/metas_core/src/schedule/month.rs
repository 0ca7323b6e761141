//! Month projection: one key per calendar day, active goals as values.

use crate::model::goal::Goal;
use crate::schedule::occurrence::{last_day_of_month, occurs_on};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Formats a date as the ISO `YYYY-MM-DD` key used by calendar views.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Enumerates every day of the month containing `reference`, in order.
pub fn month_days(reference: NaiveDate) -> Vec<NaiveDate> {
    let year = reference.year();
    let month = reference.month();
    (1..=last_day_of_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .collect()
}

/// Builds the `date -> active goals` index for the month of `reference`.
///
/// Every day of the month gets a key, including days with no active goal;
/// values borrow from `goals` and preserve collection order. Pure function
/// of its inputs — callers recompute when the month or goal set changes.
pub fn goals_by_date(reference: NaiveDate, goals: &[Goal]) -> BTreeMap<String, Vec<&Goal>> {
    let mut index = BTreeMap::new();
    for date in month_days(reference) {
        let active: Vec<&Goal> = goals.iter().filter(|goal| occurs_on(goal, date)).collect();
        index.insert(iso_date(date), active);
    }
    index
}
