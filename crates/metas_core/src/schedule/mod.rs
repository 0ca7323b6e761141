//! Calendar projection of recurring goals.
//!
//! # Responsibility
//! - Decide which goals are active on a given calendar day.
//! - Build the per-month `date -> active goals` index consumed by views.
//!
//! All functions here are pure over already-loaded data; recomputation on
//! month or goal-set change is the caller's concern.

pub mod month;
pub mod occurrence;
