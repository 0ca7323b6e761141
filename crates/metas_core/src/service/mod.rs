//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into owner-scoped use cases.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod board;
pub mod goal_service;
