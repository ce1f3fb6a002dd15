//! `scholar-client`
//!
//! **Responsibility:** client-side access layer of the scholar web client.
//!
//! This crate provides:
//! - The session store shared by every consumer
//! - Route gates and a thin navigation adapter
//! - Menu visibility derived from permissions
//! - A request interceptor (auth header, busy indicator, forced logout on 401)
//!
//! Host UI concerns (routing, toasts, spinners) are reached through the
//! [`Navigator`], [`Notifier`] and [`BusyIndicator`] traits.

pub mod account;
pub mod busy;
pub mod config;
pub mod context;
pub mod guards;
pub mod interceptor;
pub mod menu;
pub mod navigation;
pub mod notify;
pub mod session;
pub mod storage;
pub mod testing;
pub mod transport;

pub use account::AccountFlow;
pub use busy::{BusyIndicator, InFlightGuard, InFlightTracker, NoopIndicator};
pub use config::{ClientConfig, ConfigError, GuardConfig, InterceptorConfig};
pub use context::{ClientContext, HostPorts};
pub use guards::{Denial, GateKind, GateOutcome, GuardRunner, NavigationDecision, RouteConfig};
pub use interceptor::{InterceptorLayer, InterceptorService};
pub use menu::{Menu, MenuEntry, MenuError, visible_menu};
pub use navigation::Navigator;
pub use notify::{Notifier, TracingNotifier};
pub use session::SessionStore;
pub use storage::{ClientStorage, FileStorage, MemoryStorage, StorageError};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::TransportError;
