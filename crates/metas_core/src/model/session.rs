//! Explicit owner session context.
//!
//! The original behavior read the ambient "current user" through scattered
//! async lookups; here the authenticated owner is a value constructed once
//! at sign-in and handed to the service layer. Code that lacks a `Session`
//! cannot reach any owner-scoped operation.

use crate::model::goal::OwnerId;

/// Authenticated owner context for one view session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    owner: OwnerId,
}

impl Session {
    /// Wraps an already-authenticated owner id.
    ///
    /// Authentication itself (token/cookie handling) happens outside the
    /// core; callers must only construct a session for a verified owner.
    pub fn new(owner: OwnerId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }
}
