//! Goal domain model.
//!
//! # Responsibility
//! - Define the canonical goal record shared by projection and persistence.
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another goal.
//! - `is_deleted` is the source of truth for tombstone state.
//! - `Recurrence::Weekly` must carry a non-empty weekday set at creation;
//!   an empty set read back from storage degrades to "never active".

use chrono::{Local, NaiveDate, NaiveDateTime, Weekday};
use serde::de::{Deserializer, Error as DeError};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a goal.
pub type GoalId = Uuid;

/// Identifier of the authenticated user owning goals and progress.
pub type OwnerId = Uuid;

/// Compact set of weekday indices, 0=Sunday .. 6=Saturday.
///
/// The index convention follows the stored schema (`days_of_week`), which in
/// turn follows JavaScript's `Date.getDay()` numbering used by the calendar
/// front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set. A weekly goal with no days is never active.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from weekday indices; out-of-range indices are ignored.
    pub fn from_indices(indices: &[u8]) -> Self {
        let mut set = Self::EMPTY;
        for &index in indices {
            if index <= 6 {
                set.0 |= 1 << index;
            }
        }
        set
    }

    /// Adds one weekday to the set.
    pub fn insert(&mut self, weekday: Weekday) {
        self.0 |= 1 << weekday.num_days_from_sunday();
    }

    /// Returns whether the given weekday is a member.
    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_sunday()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns member indices in ascending order (0=Sunday .. 6=Saturday).
    pub fn indices(self) -> Vec<u8> {
        (0u8..=6).filter(|index| self.0 & (1 << index) != 0).collect()
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let indices = self.indices();
        let mut seq = serializer.serialize_seq(Some(indices.len()))?;
        for index in indices {
            seq.serialize_element(&index)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let indices = Vec::<u8>::deserialize(deserializer)?;
        if indices.iter().any(|index| *index > 6) {
            return Err(D::Error::custom("weekday index out of range 0..=6"));
        }
        Ok(Self::from_indices(&indices))
    }
}

/// Rule determining which calendar dates a goal is due.
///
/// Closed sum type on purpose: adding a recurrence kind must force every
/// match site to be revisited at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// Due only on the goal's creation day.
    Once,
    /// Due every day.
    Daily,
    /// Due on the listed weekdays.
    Weekly(WeekdaySet),
    /// Due once per month on the creation day-of-month, clamped to the last
    /// day of shorter months.
    Monthly,
}

/// Validation failure raised before a goal write is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyName,
    EmptyDescription,
    WeeklyWithoutDays,
}

impl Display for GoalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "goal name must not be empty"),
            Self::EmptyDescription => write!(f, "goal description must not be empty"),
            Self::WeeklyWithoutDays => {
                write!(f, "weekly goal must list at least one weekday")
            }
        }
    }
}

impl Error for GoalValidationError {}

/// A user-defined recurring or one-off intention tracked for completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Stable global ID.
    pub uuid: GoalId,
    /// Owning user; every goal belongs to exactly one owner.
    pub owner: OwnerId,
    pub name: String,
    pub description: String,
    pub recurrence: Recurrence,
    /// Optional numeric target; `None` means the goal is binary done/not-done.
    pub target_value: Option<f64>,
    /// Creation timestamp; its date is the anchor for `Once` and `Monthly`.
    pub created_at: NaiveDateTime,
    /// Soft delete tombstone. Deleted goals never project onto the calendar.
    pub is_deleted: bool,
}

impl Goal {
    /// Creates a new goal anchored at the current local time.
    pub fn new(
        owner: OwnerId,
        name: impl Into<String>,
        description: impl Into<String>,
        recurrence: Recurrence,
    ) -> Self {
        Self::with_id(
            Uuid::new_v4(),
            owner,
            name,
            description,
            recurrence,
            Local::now().naive_local(),
        )
    }

    /// Creates a goal with caller-provided identity and anchor timestamp.
    ///
    /// Used by load paths where identity already exists in storage, and by
    /// tests that need deterministic anchors.
    pub fn with_id(
        uuid: GoalId,
        owner: OwnerId,
        name: impl Into<String>,
        description: impl Into<String>,
        recurrence: Recurrence,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            uuid,
            owner,
            name: name.into(),
            description: description.into(),
            recurrence,
            target_value: None,
            created_at,
            is_deleted: false,
        }
    }

    /// Calendar day anchoring `Once` and `Monthly` recurrences.
    pub fn anchor_date(&self) -> NaiveDate {
        self.created_at.date()
    }

    /// Checks invariants required before persisting a goal.
    ///
    /// Name and description are required (the entry form rejects blanks) and
    /// a weekly goal must name at least one weekday.
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.name.trim().is_empty() {
            return Err(GoalValidationError::EmptyName);
        }
        if self.description.trim().is_empty() {
            return Err(GoalValidationError::EmptyDescription);
        }
        if let Recurrence::Weekly(days) = &self.recurrence {
            if days.is_empty() {
                return Err(GoalValidationError::WeeklyWithoutDays);
            }
        }
        Ok(())
    }

    /// Marks this goal as softly deleted (tombstoned).
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Returns whether this goal should be considered visible/active.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}
