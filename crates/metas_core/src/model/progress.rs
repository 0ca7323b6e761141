//! Per-date completion records and the date-keyed lookup index.
//!
//! # Invariants
//! - At most one record exists per `(goal, date)` pair.
//! - A missing record renders like `completed = false` but is distinct for
//!   persistence: only explicit records are stored.

use crate::model::goal::GoalId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Completion state of one goal on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub goal: GoalId,
    /// Day granularity, no time component.
    pub date: NaiveDate,
    pub completed: bool,
    /// Optional numeric progress toward the goal's `target_value`.
    pub value: Option<f64>,
}

/// Explicit `(goal, date)` lookup index over loaded progress records.
///
/// Built once per load instead of scanning record lists inside rendering,
/// keeping day-view composition pure and independently testable.
#[derive(Debug, Clone, Default)]
pub struct ProgressIndex {
    records: HashMap<(GoalId, NaiveDate), ProgressRecord>,
}

impl ProgressIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a freshly loaded record collection.
    ///
    /// Later duplicates win, matching last-write-wins storage semantics.
    pub fn from_records(records: Vec<ProgressRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.apply(record);
        }
        index
    }

    /// Inserts or replaces the record for its `(goal, date)` pair.
    pub fn apply(&mut self, record: ProgressRecord) {
        self.records.insert((record.goal, record.date), record);
    }

    /// Returns the record for `(goal, date)`, or `None` when the day was
    /// never acted upon.
    pub fn get(&self, goal: GoalId, date: NaiveDate) -> Option<&ProgressRecord> {
        self.records.get(&(goal, date))
    }

    /// Display-oriented completion lookup: no record reads as incomplete.
    pub fn is_completed(&self, goal: GoalId, date: NaiveDate) -> bool {
        self.get(goal, date).is_some_and(|record| record.completed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
