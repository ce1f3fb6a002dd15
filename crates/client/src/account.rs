//! Sign-in / sign-out flows shared by views and the interceptor.

use std::sync::Arc;

use scholar_auth::Session;

use crate::config::GuardConfig;
use crate::navigation::Navigator;
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::storage::StorageError;

#[derive(Clone)]
pub struct AccountFlow {
    session: SessionStore,
    config: GuardConfig,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl AccountFlow {
    pub fn new(
        session: SessionStore,
        config: GuardConfig,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            config,
            navigator,
            notifier,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Store a new session and land on the area matching the user's roles.
    pub fn sign_in(&self, session: Session) -> Result<(), StorageError> {
        let elevated = session
            .roles()
            .intersects(self.config.elevated_roles.iter().map(String::as_str));
        let greeting = format!("Welcome back, {}", session.user.name);

        self.session.login(session)?;
        self.notifier.show_success(&greeting);
        self.navigator.navigate(if elevated {
            &self.config.admin_home_path
        } else {
            &self.config.home_path
        });
        Ok(())
    }

    /// User-initiated logout.
    pub fn sign_out(&self) {
        if self.session.clear().is_some() {
            self.notifier.show_success("Signed out");
        }
        self.navigator.navigate(&self.config.login_path);
    }

    /// Tear down a session the server no longer accepts.
    ///
    /// Only the first caller for a logged-in session gets `true`; later
    /// callers find nothing to tear down and have no side effects.
    pub fn force_logout(&self, message: &str) -> bool {
        match self.session.end_if_logged_in() {
            Some(ended) => {
                tracing::info!(user = %ended.user.name, %message, "session rejected by server; logging out");
                self.notifier.show_warning(message);
                self.navigator.navigate(&self.config.login_path);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use scholar_auth::UserProfile;

    use super::*;
    use crate::storage::MemoryStorage;
    use crate::testing::{RecordingNavigator, RecordingNotifier};

    fn flow() -> (AccountFlow, Arc<RecordingNavigator>, Arc<RecordingNotifier>) {
        let store = SessionStore::hydrate(Arc::new(MemoryStorage::new()));
        let navigator = Arc::new(RecordingNavigator::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let flow = AccountFlow::new(
            store,
            GuardConfig::default(),
            navigator.clone(),
            notifier.clone(),
        );
        (flow, navigator, notifier)
    }

    #[test]
    fn sign_in_lands_in_matching_area() {
        let (flow, navigator, notifier) = flow();
        let admin = UserProfile::new("Root", ["admin"].into_iter().collect());
        flow.sign_in(Session::new("a", admin)).unwrap();

        let teacher = UserProfile::new("Tess", ["teacher"].into_iter().collect());
        flow.sign_in(Session::new("b", teacher)).unwrap();

        assert_eq!(navigator.paths(), vec!["/admin".to_string(), "/dashboard".to_string()]);
        assert_eq!(notifier.successes().len(), 2);
        assert_eq!(flow.session().token().as_deref(), Some("b"));
    }

    #[test]
    fn force_logout_runs_once() {
        let (flow, navigator, notifier) = flow();
        flow.sign_in(Session::new("tok", UserProfile::default())).unwrap();

        assert!(flow.force_logout("Session expired"));
        assert!(!flow.force_logout("Session expired"));

        assert_eq!(notifier.warnings(), vec!["Session expired".to_string()]);
        assert_eq!(
            navigator.paths(),
            vec!["/dashboard".to_string(), "/login".to_string()]
        );
        assert!(!flow.session().is_logged_in());
    }

    #[test]
    fn sign_out_without_session_still_redirects() {
        let (flow, navigator, notifier) = flow();
        flow.sign_out();
        assert_eq!(navigator.paths(), vec!["/login".to_string()]);
        assert!(notifier.successes().is_empty());
    }
}
