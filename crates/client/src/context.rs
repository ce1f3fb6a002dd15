//! One-stop wiring of the access layer for a host application.

use std::sync::Arc;

use chrono::Utc;
use scholar_auth::Session;

use crate::account::AccountFlow;
use crate::busy::{BusyIndicator, InFlightTracker};
use crate::config::ClientConfig;
use crate::guards::GuardRunner;
use crate::interceptor::InterceptorLayer;
use crate::menu::{Menu, MenuEntry};
use crate::navigation::Navigator;
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::storage::ClientStorage;
#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Host collaborators the access layer talks to.
#[derive(Clone)]
pub struct HostPorts {
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub indicator: Arc<dyn BusyIndicator>,
}

/// Session store, gates, account flow and interceptor sharing one session.
#[derive(Clone)]
pub struct ClientContext {
    config: ClientConfig,
    session: SessionStore,
    account: AccountFlow,
    guards: GuardRunner,
    tracker: InFlightTracker,
}

impl ClientContext {
    pub fn new(config: ClientConfig, storage: Arc<dyn ClientStorage>, ports: HostPorts) -> Self {
        let session = SessionStore::hydrate(storage);
        let account = AccountFlow::new(
            session.clone(),
            config.guards.clone(),
            ports.navigator.clone(),
            ports.notifier.clone(),
        );
        let guards = GuardRunner::new(
            session.clone(),
            config.guards.clone(),
            ports.navigator,
            ports.notifier,
        );
        let tracker = InFlightTracker::new(ports.indicator, config.interceptor.busy_exclusions.clone());

        tracing::debug!(logged_in = session.is_logged_in(), "client context ready");

        Self {
            config,
            session,
            account,
            guards,
            tracker,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn account(&self) -> &AccountFlow {
        &self.account
    }

    pub fn guards(&self) -> &GuardRunner {
        &self.guards
    }

    pub fn tracker(&self) -> &InFlightTracker {
        &self.tracker
    }

    /// Layer to wrap the host's transport with.
    pub fn interceptor(&self) -> InterceptorLayer {
        InterceptorLayer::new(
            self.account.clone(),
            self.tracker.clone(),
            self.config.interceptor.clone(),
        )
    }

    /// HTTP transport aimed at the configured API base URL.
    ///
    /// Wrap it with [`ClientContext::interceptor`] before sending requests.
    #[cfg(feature = "http")]
    pub fn transport(&self) -> HttpTransport {
        HttpTransport::new(&self.config.api_base_url)
    }

    /// Menu entries visible to the current session.
    pub fn visible_menu(&self, menu: &Menu) -> Vec<MenuEntry> {
        let session: Option<Session> = self.session.current();
        menu.visible_for(session.as_ref(), Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use scholar_auth::UserProfile;

    use super::*;
    use crate::guards::{GateKind, RouteConfig};
    use crate::storage::MemoryStorage;
    use crate::testing::{RecordingIndicator, RecordingNavigator, RecordingNotifier};

    #[test]
    fn shares_one_session_across_components() {
        let navigator = Arc::new(RecordingNavigator::default());
        let ctx = ClientContext::new(
            ClientConfig::default(),
            Arc::new(MemoryStorage::new()),
            HostPorts {
                navigator: navigator.clone(),
                notifier: Arc::new(RecordingNotifier::default()),
                indicator: Arc::new(RecordingIndicator::default()),
            },
        );

        let route = RouteConfig::new("/dashboard")
            .gated_by([GateKind::Authentication, GateKind::AreaRedirect]);
        assert!(!ctx.guards().can_activate(&route));

        let user = UserProfile::new("Tess", ["teacher"].into_iter().collect()).completed();
        ctx.account().sign_in(Session::new("tok", user)).unwrap();
        assert!(ctx.guards().can_activate(&route));

        let menu = Menu::new(vec![
            MenuEntry::link("Dashboard", "/dashboard"),
            MenuEntry::link("Schools", "/admin/schools").requires(["admin"].into_iter().collect()),
        ]);
        assert_eq!(ctx.visible_menu(&menu).len(), 1);

        ctx.account().sign_out();
        assert!(!ctx.session().is_logged_in());
        assert_eq!(
            navigator.paths(),
            vec!["/login".to_string(), "/dashboard".to_string(), "/login".to_string()]
        );
    }

    #[cfg(feature = "http")]
    #[test]
    fn transport_targets_configured_api() {
        let config = ClientConfig {
            api_base_url: "https://api.scholar.test/".to_string(),
            ..Default::default()
        };
        let ctx = ClientContext::new(
            config,
            Arc::new(MemoryStorage::new()),
            HostPorts {
                navigator: Arc::new(RecordingNavigator::default()),
                notifier: Arc::new(RecordingNotifier::default()),
                indicator: Arc::new(RecordingIndicator::default()),
            },
        );
        assert_eq!(ctx.transport().base_url(), "https://api.scholar.test");
    }
}
