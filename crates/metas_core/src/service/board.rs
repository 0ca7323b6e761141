//! View-session state over loaded goals and progress.
//!
//! # Responsibility
//! - Hold the in-memory goal collection and progress index for one view
//!   session (one signed-in owner, one window).
//! - Compose the month projection and per-day view models.
//! - Gate toggles so one `(goal, date)` pair has at most one outstanding
//!   mutation; the pending window spans from `begin_toggle` to
//!   `complete_toggle` and is held open by embeddings that persist
//!   asynchronously.
//!
//! # Invariants
//! - Board state changes only after a repository write succeeds; a failed
//!   toggle leaves goals, index and pending set exactly as before.
//! - State is owned by this session; other sessions converge only through
//!   `reload`.

use crate::model::goal::{Goal, GoalId};
use crate::model::progress::{ProgressIndex, ProgressRecord};
use crate::repo::goal_repo::GoalRepository;
use crate::repo::progress_repo::ProgressRepository;
use crate::schedule::month::goals_by_date;
use crate::schedule::occurrence::occurs_on;
use crate::service::goal_service::{GoalService, ServiceError, ServiceResult};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// Display state for one goal on the selected day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGoalView {
    pub goal: GoalId,
    pub name: String,
    pub description: String,
    /// Missing record and explicit `completed = false` both render false.
    pub completed: bool,
    pub value: Option<f64>,
    pub target_value: Option<f64>,
    /// True while a toggle for this pair is outstanding; the control should
    /// be disabled to avoid duplicate submissions.
    pub pending: bool,
}

/// In-memory state of the goals screen for one view session.
#[derive(Debug, Default)]
pub struct GoalBoard {
    goals: Vec<Goal>,
    progress: ProgressIndex,
    pending: HashSet<(GoalId, NaiveDate)>,
}

impl GoalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces board state with freshly loaded collections.
    ///
    /// Clears the pending set: outstanding mutations from before a reload
    /// are stale and their results must be discarded.
    pub fn reload<G: GoalRepository, P: ProgressRepository>(
        &mut self,
        service: &GoalService<G, P>,
    ) -> ServiceResult<()> {
        let goals = service.list_goals()?;
        let records = service.list_progress()?;
        self.goals = goals;
        self.progress = ProgressIndex::from_records(records);
        self.pending.clear();
        Ok(())
    }

    /// The loaded goal collection in creation order.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Month projection over the loaded goals (see `schedule::month`).
    pub fn month_view(&self, reference: NaiveDate) -> BTreeMap<String, Vec<&Goal>> {
        goals_by_date(reference, &self.goals)
    }

    /// Per-day active-goal counts for calendar markers.
    pub fn month_markers(&self, reference: NaiveDate) -> BTreeMap<String, usize> {
        self.month_view(reference)
            .into_iter()
            .map(|(date, active)| (date, active.len()))
            .collect()
    }

    /// Day selection view model: the owner's goals active on `date`, each
    /// joined with its current progress state. Pure composition, no I/O.
    pub fn day_view(&self, date: NaiveDate) -> Vec<DayGoalView> {
        self.goals
            .iter()
            .filter(|goal| occurs_on(goal, date))
            .map(|goal| DayGoalView {
                goal: goal.uuid,
                name: goal.name.clone(),
                description: goal.description.clone(),
                completed: self.progress.is_completed(goal.uuid, date),
                value: self.progress.get(goal.uuid, date).and_then(|r| r.value),
                target_value: goal.target_value,
                pending: self.is_pending(goal.uuid, date),
            })
            .collect()
    }

    /// Whether a toggle for `(goal, date)` is currently outstanding.
    pub fn is_pending(&self, goal: GoalId, date: NaiveDate) -> bool {
        self.pending.contains(&(goal, date))
    }

    /// Marks `(goal, date)` pending before its mutation is issued.
    ///
    /// A second begin for the same pair while the first is outstanding is
    /// rejected with `ToggleInFlight`. Embeddings that drive persistence
    /// asynchronously call this before the write and settle the pair with
    /// `complete_toggle` once the outcome arrives; while pending,
    /// `day_view` renders the pair with `pending = true` so the control
    /// can be disabled.
    pub fn begin_toggle(&mut self, goal: GoalId, date: NaiveDate) -> ServiceResult<()> {
        if !self.pending.insert((goal, date)) {
            return Err(ServiceError::ToggleInFlight { goal, date });
        }
        Ok(())
    }

    /// Settles a pending `(goal, date)` pair with its persistence outcome.
    ///
    /// The index is updated only from a persisted record; an error clears
    /// the pending mark and leaves the rest of the board untouched.
    pub fn complete_toggle(
        &mut self,
        goal: GoalId,
        date: NaiveDate,
        outcome: ServiceResult<ProgressRecord>,
    ) -> ServiceResult<ProgressRecord> {
        self.pending.remove(&(goal, date));
        let record = outcome?;
        self.progress.apply(record.clone());
        Ok(record)
    }

    /// Toggles completion of `(goal, date)` through the service.
    ///
    /// Convenience wrapper pairing `begin_toggle` and `complete_toggle`
    /// around a synchronous service call.
    pub fn toggle<G: GoalRepository, P: ProgressRepository>(
        &mut self,
        service: &GoalService<G, P>,
        goal: GoalId,
        date: NaiveDate,
    ) -> ServiceResult<ProgressRecord> {
        self.begin_toggle(goal, date)?;
        let result = service.toggle(goal, date);
        self.complete_toggle(goal, date, result)
    }
}
