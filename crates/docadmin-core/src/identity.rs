//! Identity collaborator contract
//!
//! Authentication itself happens elsewhere; the panel only asks who is
//! signed in.

use docadmin_schema::Document;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated user as seen by the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// Any further profile fields
    #[serde(flatten)]
    pub attributes: Document,
}

impl UserRecord {
    /// Create user with no extra attributes
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            attributes: Document::new(),
        }
    }
}

/// Supplies the currently authenticated user, if any
pub trait IdentityProvider: Send + Sync + fmt::Debug {
    fn current_user(&self) -> Option<UserRecord>;
}

/// Session-backed identity
///
/// Holds at most one signed-in user; [`login`](Self::login) and
/// [`logout`](Self::logout) mirror a cookie session.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    user: RwLock<Option<UserRecord>>,
}

impl SessionIdentity {
    /// Create signed-out session
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create session with a user already signed in
    #[must_use]
    pub fn signed_in(user: UserRecord) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    /// Mark `user` as authenticated
    pub fn login(&self, user: UserRecord) {
        tracing::info!(username = %user.username, "session login");
        *self.user.write() = Some(user);
    }

    /// Clear the authenticated user
    pub fn logout(&self) {
        if let Some(user) = self.user.write().take() {
            tracing::info!(username = %user.username, "session logout");
        }
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<UserRecord> {
        self.user.read().clone()
    }
}
