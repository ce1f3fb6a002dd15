use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{RoleSet, UserProfile};

/// An authenticated client session.
///
/// The token is opaque to the client; validity is judged only by presence
/// and by the optional expiry the server handed out at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,

    pub user: UserProfile,

    /// Issued-at timestamp, when the server reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,

    /// Expiration timestamp, when the server reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionWindowError {
    #[error("session token is empty")]
    MissingToken,

    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: token.into(),
            user,
            issued_at: None,
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    pub fn roles(&self) -> &RoleSet {
        &self.user.role_set
    }

    /// Whether this session counts as logged in at `now`.
    pub fn is_logged_in_at(&self, now: DateTime<Utc>) -> bool {
        validate_window(self, now).is_ok()
    }

    /// Roles usable for authorization at `now`.
    ///
    /// A session that is not logged in holds no permissions, whatever its
    /// profile says.
    pub fn roles_at(&self, now: DateTime<Utc>) -> Option<&RoleSet> {
        self.is_logged_in_at(now).then_some(&self.user.role_set)
    }
}

/// Deterministically validate a session's token and time window.
///
/// Missing timestamps are not an error: a session without an expiry stays
/// valid until the server rejects its token.
pub fn validate_window(session: &Session, now: DateTime<Utc>) -> Result<(), SessionWindowError> {
    if session.token.trim().is_empty() {
        return Err(SessionWindowError::MissingToken);
    }
    if let (Some(issued_at), Some(expires_at)) = (session.issued_at, session.expires_at) {
        if expires_at <= issued_at {
            return Err(SessionWindowError::InvalidTimeWindow);
        }
    }
    if let Some(issued_at) = session.issued_at {
        if now < issued_at {
            return Err(SessionWindowError::NotYetValid);
        }
    }
    if let Some(expires_at) = session.expires_at {
        if now >= expires_at {
            return Err(SessionWindowError::Expired);
        }
    }
    Ok(())
}
