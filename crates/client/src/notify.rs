//! Fire-and-forget user notifications.

/// Notification surface of the host UI (toasts, snackbars, ...).
pub trait Notifier: Send + Sync {
    fn show_warning(&self, message: &str);
    fn show_success(&self, message: &str);
}

/// Notifier for headless hosts: notifications become log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show_warning(&self, message: &str) {
        tracing::warn!(target: "scholar::notify", "{message}");
    }

    fn show_success(&self, message: &str) {
        tracing::info!(target: "scholar::notify", "{message}");
    }
}
