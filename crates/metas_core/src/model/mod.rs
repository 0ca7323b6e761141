//! Domain model for recurring goals and per-day progress.
//!
//! # Responsibility
//! - Define the canonical data structures used by projection and services.
//! - Keep recurrence a closed sum type so new kinds are compile-checked.
//!
//! # Invariants
//! - Every goal is identified by a stable `GoalId` and owned by one owner.
//! - Deletion is represented by soft-delete tombstones, not hard delete.
//! - At most one progress record exists per `(goal, date)` pair.

pub mod goal;
pub mod progress;
pub mod session;
