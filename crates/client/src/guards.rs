//! Route gates.
//!
//! Each gate is a pure function over the current session and the route's
//! static configuration. [`GuardRunner`] is the thin adapter that applies
//! the resulting redirects and warnings through the host's collaborators.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scholar_auth::{
    PermissionRequirement, RoleSet, Session, SessionWindowError, explain_evaluation, validate_window,
};

use crate::config::GuardConfig;
use crate::navigation::Navigator;
use crate::notify::Notifier;
use crate::session::SessionStore;

/// Gates a route can declare, run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    Authentication,
    Permission,
    ProfileCompletion,
    AreaRedirect,
}

/// Static per-route configuration supplied by the navigation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub path: String,

    #[serde(default)]
    pub required_permissions: PermissionRequirement,

    #[serde(default)]
    pub gates: Vec<GateKind>,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required_permissions: PermissionRequirement::open(),
            gates: Vec::new(),
        }
    }

    pub fn requires(mut self, permissions: PermissionRequirement) -> Self {
        self.required_permissions = permissions;
        self
    }

    pub fn gated_by(mut self, gates: impl IntoIterator<Item = GateKind>) -> Self {
        self.gates = gates.into_iter().collect();
        self
    }
}

/// Why a gate refused entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// No logged-in session.
    Unauthenticated,
    /// Logged in, but lacking every required permission.
    Unauthorized,
    /// Logged in, but the profile is not completed yet.
    IncompleteProfile,
    /// Elevated user entering the standard area.
    ElevatedArea,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Proceed,
    /// Deny without redirecting; the caller picks the fallback UI.
    Block(Denial),
    /// Redirect, optionally warn, then deny.
    Redirect {
        denial: Denial,
        to: String,
        warning: Option<String>,
    },
}

impl GateOutcome {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateOutcome::Proceed)
    }

    pub fn denial(&self) -> Option<Denial> {
        match self {
            GateOutcome::Proceed => None,
            GateOutcome::Block(denial) | GateOutcome::Redirect { denial, .. } => Some(*denial),
        }
    }
}

/// Roles of a logged-in session; anything else holds none.
fn roles_of(session: Option<&Session>, now: DateTime<Utc>) -> RoleSet {
    session
        .and_then(|s| s.roles_at(now))
        .cloned()
        .unwrap_or_default()
}

/// Proceed iff a session exists and is logged in; otherwise go to login.
pub fn authentication_gate(
    session: Option<&Session>,
    config: &GuardConfig,
    now: DateTime<Utc>,
) -> GateOutcome {
    let window = match session {
        Some(session) => validate_window(session, now),
        None => Err(SessionWindowError::MissingToken),
    };

    match window {
        Ok(()) => GateOutcome::Proceed,
        Err(reason) => {
            tracing::debug!(%reason, "authentication gate denied");
            GateOutcome::Redirect {
                denial: Denial::Unauthenticated,
                to: config.login_path.clone(),
                warning: None,
            }
        }
    }
}

/// Proceed iff the route's requirement is met by the session's roles.
pub fn permission_gate(
    session: Option<&Session>,
    route: &RouteConfig,
    now: DateTime<Utc>,
) -> GateOutcome {
    let roles = roles_of(session, now);
    let explanation = explain_evaluation(&route.required_permissions, &roles);
    if explanation.granted {
        GateOutcome::Proceed
    } else {
        tracing::debug!(route = %route.path, reason = %explanation.reason, "permission gate denied");
        GateOutcome::Block(Denial::Unauthorized)
    }
}

/// Proceed iff the profile is completed; otherwise warn and go to the profile form.
pub fn profile_completion_gate(session: Option<&Session>, config: &GuardConfig) -> GateOutcome {
    if session.is_some_and(|s| s.user.is_profile_completed) {
        GateOutcome::Proceed
    } else {
        GateOutcome::Redirect {
            denial: Denial::IncompleteProfile,
            to: config.profile_path.clone(),
            warning: Some(config.profile_incomplete_message.clone()),
        }
    }
}

/// Send elevated users to the admin area instead of the standard area.
pub fn area_redirect_gate(
    session: Option<&Session>,
    config: &GuardConfig,
    now: DateTime<Utc>,
) -> GateOutcome {
    let roles = roles_of(session, now);
    if roles.intersects(config.elevated_roles.iter().map(String::as_str)) {
        GateOutcome::Redirect {
            denial: Denial::ElevatedArea,
            to: config.admin_home_path.clone(),
            warning: None,
        }
    } else {
        GateOutcome::Proceed
    }
}

/// Run one gate.
pub fn run_gate(
    gate: GateKind,
    session: Option<&Session>,
    route: &RouteConfig,
    config: &GuardConfig,
    now: DateTime<Utc>,
) -> GateOutcome {
    match gate {
        GateKind::Authentication => authentication_gate(session, config, now),
        GateKind::Permission => permission_gate(session, route, now),
        GateKind::ProfileCompletion => profile_completion_gate(session, config),
        GateKind::AreaRedirect => area_redirect_gate(session, config, now),
    }
}

/// Result of running a route's gates, before any side effect is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationDecision {
    /// The gate that stopped navigation, if any.
    pub stopped_by: Option<GateKind>,
    pub outcome: GateOutcome,
}

impl NavigationDecision {
    pub fn allowed(&self) -> bool {
        self.outcome.is_proceed()
    }
}

/// Run a route's gates in order, stopping at the first refusal.
pub fn decide(
    route: &RouteConfig,
    session: Option<&Session>,
    config: &GuardConfig,
    now: DateTime<Utc>,
) -> NavigationDecision {
    for gate in &route.gates {
        let outcome = run_gate(*gate, session, route, config, now);
        if !outcome.is_proceed() {
            return NavigationDecision {
                stopped_by: Some(*gate),
                outcome,
            };
        }
    }
    NavigationDecision {
        stopped_by: None,
        outcome: GateOutcome::Proceed,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Framework adapter
// ─────────────────────────────────────────────────────────────────────────────

/// Applies gate outcomes through the host's navigator and notifier.
#[derive(Clone)]
pub struct GuardRunner {
    session: SessionStore,
    config: GuardConfig,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl GuardRunner {
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

    /// `true` to proceed, `false` to block (after any redirect was issued).
    pub fn can_activate(&self, route: &RouteConfig) -> bool {
        let session = self.session.current();
        let decision = decide(route, session.as_ref(), &self.config, Utc::now());
        self.apply(route, decision)
    }

    /// Run a single gate regardless of what the route declares.
    pub fn check(&self, gate: GateKind, route: &RouteConfig) -> bool {
        let session = self.session.current();
        let outcome = run_gate(gate, session.as_ref(), route, &self.config, Utc::now());
        self.apply(
            route,
            NavigationDecision {
                stopped_by: (!outcome.is_proceed()).then_some(gate),
                outcome,
            },
        )
    }

    fn apply(&self, route: &RouteConfig, decision: NavigationDecision) -> bool {
        match decision.outcome {
            GateOutcome::Proceed => true,
            GateOutcome::Block(denial) => {
                tracing::debug!(route = %route.path, gate = ?decision.stopped_by, ?denial, "navigation blocked");
                false
            }
            GateOutcome::Redirect { denial, to, warning } => {
                tracing::debug!(
                    route = %route.path,
                    gate = ?decision.stopped_by,
                    ?denial,
                    redirect = %to,
                    "navigation redirected"
                );
                if let Some(message) = warning {
                    self.notifier.show_warning(&message);
                }
                self.navigator.navigate(&to);
                false
            }
        }
    }
}
