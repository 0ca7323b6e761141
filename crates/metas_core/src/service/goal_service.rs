//! Owner-scoped goal use cases: create/list/delete goals, query and toggle
//! per-day progress.
//!
//! # Responsibility
//! - Bind every operation to the session owner taken at construction.
//! - Delegate persistence to repository implementations without retry.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Another owner's goal is indistinguishable from a missing one
//!   (`NotFound`), mirroring row-level-security visibility.
//! - Failed mutations leave no in-memory state behind; callers apply
//!   returned records only on success.

use crate::model::goal::{Goal, GoalId, GoalValidationError, Recurrence};
use crate::model::progress::ProgressRecord;
use crate::model::session::Session;
use crate::repo::goal_repo::GoalRepository;
use crate::repo::progress_repo::ProgressRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error surfaced to view layers; remote-call failures pass through
/// unchanged with no retry or backoff.
#[derive(Debug)]
pub enum ServiceError {
    Validation(GoalValidationError),
    Repo(RepoError),
    /// A mutation for this `(goal, date)` pair is already outstanding.
    ToggleInFlight { goal: GoalId, date: NaiveDate },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::ToggleInFlight { goal, date } => {
                write!(f, "toggle already in flight for goal {goal} on {date}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ToggleInFlight { .. } => None,
        }
    }
}

impl From<GoalValidationError> for ServiceError {
    fn from(value: GoalValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Request model for creating a goal from form input.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub name: String,
    pub description: String,
    pub recurrence: Recurrence,
    /// Optional numeric target; `None` keeps the goal binary.
    pub target_value: Option<f64>,
}

/// Use-case service bound to one authenticated owner.
pub struct GoalService<G: GoalRepository, P: ProgressRepository> {
    session: Session,
    goals: G,
    progress: P,
}

impl<G: GoalRepository, P: ProgressRepository> GoalService<G, P> {
    /// Creates a service for the given session and repositories.
    pub fn new(session: Session, goals: G, progress: P) -> Self {
        Self {
            session,
            goals,
            progress,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Creates a goal owned by the session owner.
    ///
    /// # Contract
    /// - Rejects blank name/description and weekly drafts without days
    ///   before touching storage.
    pub fn create_goal(&self, draft: &GoalDraft) -> ServiceResult<Goal> {
        let mut goal = Goal::new(
            self.session.owner(),
            draft.name.clone(),
            draft.description.clone(),
            draft.recurrence.clone(),
        );
        goal.target_value = draft.target_value;
        goal.validate()?;

        self.goals.create_goal(&goal)?;
        info!(
            "event=goal_create module=service status=ok goal={} recurrence={:?}",
            goal.uuid, goal.recurrence
        );
        Ok(goal)
    }

    /// Lists the owner's visible goals in creation order.
    pub fn list_goals(&self) -> ServiceResult<Vec<Goal>> {
        Ok(self.goals.list_goals(self.session.owner())?)
    }

    /// Soft-deletes one of the owner's goals.
    ///
    /// Progress rows stay behind; owner-level queries and the month
    /// projection exclude them from then on.
    pub fn delete_goal(&self, id: GoalId) -> ServiceResult<()> {
        self.resolve_owned(id)?;
        self.goals.delete_goal(id)?;
        info!("event=goal_delete module=service status=ok goal={id}");
        Ok(())
    }

    /// Returns the progress record for one of the owner's goals on `date`,
    /// or `None` when the day was never acted upon.
    pub fn get_progress(
        &self,
        goal: GoalId,
        date: NaiveDate,
    ) -> ServiceResult<Option<ProgressRecord>> {
        self.resolve_owned(goal)?;
        Ok(self.progress.get_progress(goal, date)?)
    }

    /// Lists all progress records of the owner's visible goals.
    pub fn list_progress(&self) -> ServiceResult<Vec<ProgressRecord>> {
        Ok(self.progress.list_progress(self.session.owner())?)
    }

    /// Toggles completion of `(goal, date)`.
    ///
    /// No record yet -> creates one with `completed = true`. An existing
    /// record flips its flag and keeps `value` untouched. The write goes
    /// through the repository before any state is reported back, so a
    /// failed persistence call changes nothing.
    pub fn toggle(&self, goal: GoalId, date: NaiveDate) -> ServiceResult<ProgressRecord> {
        self.resolve_owned(goal)?;

        let (completed, value) = match self.progress.get_progress(goal, date)? {
            None => (true, None),
            Some(existing) => (!existing.completed, existing.value),
        };

        let record = self.progress.upsert_progress(goal, date, completed, value)?;
        info!(
            "event=progress_toggle module=service status=ok goal={goal} date={date} completed={completed}"
        );
        Ok(record)
    }

    /// Resolves a goal id to a visible goal of the session owner.
    ///
    /// Tombstoned goals and goals of other owners both report `NotFound`.
    fn resolve_owned(&self, id: GoalId) -> ServiceResult<Goal> {
        match self.goals.get_goal(id, false)? {
            Some(goal) if goal.owner == self.session.owner() => Ok(goal),
            _ => Err(ServiceError::Repo(RepoError::NotFound(id))),
        }
    }
}
