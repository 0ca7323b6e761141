//! Core domain logic for Metas, a recurring-goal tracker.
//! This crate is the single source of truth for business invariants:
//! which goals are due on which days, and how per-day completion is
//! recorded.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::goal::{Goal, GoalId, GoalValidationError, OwnerId, Recurrence, WeekdaySet};
pub use model::progress::{ProgressIndex, ProgressRecord};
pub use model::session::Session;
pub use repo::goal_repo::{GoalRepository, SqliteGoalRepository};
pub use repo::progress_repo::{ProgressRepository, SqliteProgressRepository};
pub use repo::{RepoError, RepoResult};
pub use schedule::month::{goals_by_date, iso_date, month_days};
pub use schedule::occurrence::occurs_on;
pub use service::board::{DayGoalView, GoalBoard};
pub use service::goal_service::{GoalDraft, GoalService, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
