//! Single source of truth for the signed-in session.
//!
//! Every consumer (gates, menus, interceptor) reads through [`SessionStore`];
//! nothing else touches the persisted keys.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use scholar_auth::{Session, UserProfile};

use crate::storage::{ClientStorage, StorageError};

pub const TOKEN_KEY: &str = "token";
pub const USER_DATA_KEY: &str = "userData";
pub const ISSUED_AT_KEY: &str = "issuedAt";
pub const EXPIRES_AT_KEY: &str = "expiresAt";

/// Shared handle to the current session.
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn ClientStorage>,
    state: watch::Sender<Option<Session>>,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

impl SessionStore {
    /// Build a store and load whatever session the storage holds.
    pub fn hydrate(storage: Arc<dyn ClientStorage>) -> Self {
        let initial = read_persisted(storage.as_ref());
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner { storage, state }),
        }
    }

    /// Re-read persisted state, e.g. after another process wrote it.
    pub fn reload(&self) {
        let fresh = read_persisted(self.inner.storage.as_ref());
        self.inner.state.send_if_modified(|current| {
            if *current == fresh {
                false
            } else {
                *current = fresh;
                true
            }
        });
    }

    /// Snapshot of the current session, if any.
    pub fn current(&self) -> Option<Session> {
        self.inner.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in_at(Utc::now())
    }

    pub fn is_logged_in_at(&self, now: DateTime<Utc>) -> bool {
        self.inner
            .state
            .borrow()
            .as_ref()
            .is_some_and(|s| s.is_logged_in_at(now))
    }

    /// Receive a notification on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.state.subscribe()
    }

    /// Persist a freshly issued session and publish it.
    pub fn login(&self, session: Session) -> Result<(), StorageError> {
        let storage = self.inner.storage.as_ref();
        storage.set(TOKEN_KEY, &session.token)?;
        storage.set(USER_DATA_KEY, &serde_json::to_string(&session.user)?)?;
        for (key, at) in [
            (ISSUED_AT_KEY, session.issued_at),
            (EXPIRES_AT_KEY, session.expires_at),
        ] {
            match at {
                Some(at) => storage.set(key, &at.to_rfc3339())?,
                None => storage.remove(key)?,
            }
        }

        tracing::info!(user = %session.user.name, "session started");
        self.inner.state.send_replace(Some(session));
        Ok(())
    }

    /// Replace the profile snapshot of the current session.
    ///
    /// Returns `false` when there is no session to update.
    pub fn update_profile(&self, profile: UserProfile) -> Result<bool, StorageError> {
        if self.inner.state.borrow().is_none() {
            return Ok(false);
        }

        self.inner
            .storage
            .set(USER_DATA_KEY, &serde_json::to_string(&profile)?)?;

        let updated = self.inner.state.send_if_modified(|current| match current {
            Some(session) => {
                session.user = profile;
                true
            }
            None => false,
        });
        Ok(updated)
    }

    /// Drop the session, persisted and in memory.
    ///
    /// Storage failures are logged; the in-memory session is cleared regardless.
    pub fn clear(&self) -> Option<Session> {
        self.remove_persisted();
        let previous = self.inner.state.send_replace(None);
        if previous.is_some() {
            tracing::info!("session cleared");
        }
        previous
    }

    /// Clear the session only if it is currently logged in.
    ///
    /// The check and the clear happen under one lock, so concurrent callers
    /// see exactly one `Some`.
    pub fn end_if_logged_in(&self) -> Option<Session> {
        let now = Utc::now();
        let mut ended = None;
        self.inner.state.send_if_modified(|current| {
            if current.as_ref().is_some_and(|s| s.is_logged_in_at(now)) {
                ended = current.take();
                true
            } else {
                false
            }
        });

        if ended.is_some() {
            self.remove_persisted();
        }
        ended
    }

    fn remove_persisted(&self) {
        for key in [TOKEN_KEY, USER_DATA_KEY, ISSUED_AT_KEY, EXPIRES_AT_KEY] {
            if let Err(err) = self.inner.storage.remove(key) {
                tracing::warn!(key, error = %err, "failed to remove persisted session key");
            }
        }
    }
}

/// Load the persisted session; anything absent or unparseable is no session.
fn read_persisted(storage: &dyn ClientStorage) -> Option<Session> {
    let token = match storage.get(TOKEN_KEY) {
        Ok(Some(token)) if !token.trim().is_empty() => token,
        Ok(_) => return None,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read persisted token");
            return None;
        }
    };

    let raw_user = match storage.get(USER_DATA_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::warn!("persisted token has no user data; ignoring session");
            return None;
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to read persisted user data");
            return None;
        }
    };

    let user: UserProfile = match serde_json::from_str(&raw_user) {
        Ok(user) => user,
        Err(err) => {
            tracing::warn!(error = %err, "persisted user data is malformed; ignoring session");
            return None;
        }
    };

    let mut session = Session::new(token, user);
    session.issued_at = read_timestamp(storage, ISSUED_AT_KEY)?;
    session.expires_at = read_timestamp(storage, EXPIRES_AT_KEY)?;
    Some(session)
}

/// `Some(None)` when the key is absent; `None` when it cannot be trusted.
fn read_timestamp(storage: &dyn ClientStorage, key: &str) -> Option<Option<DateTime<Utc>>> {
    match storage.get(key) {
        Ok(Some(raw)) => match DateTime::parse_from_rfc3339(&raw) {
            Ok(dt) => Some(Some(dt.with_timezone(&Utc))),
            Err(err) => {
                tracing::warn!(key, error = %err, "persisted timestamp is malformed; ignoring session");
                None
            }
        },
        Ok(None) => Some(None),
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read persisted timestamp");
            None
        }
    }
}
