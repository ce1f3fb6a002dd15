//! Recording doubles for the host collaborators.
//!
//! Useful for hosts testing their own wiring without a UI: every call is
//! captured and can be inspected afterwards.

use std::sync::Mutex;

use crate::busy::BusyIndicator;
use crate::navigation::Navigator;
use crate::notify::Notifier;

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Records every path it is asked to navigate to.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        lock(&self.paths).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        lock(&self.paths).push(path.to_string());
    }
}

/// Records warnings and successes separately.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    warnings: Mutex<Vec<String>>,
    successes: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn warnings(&self) -> Vec<String> {
        lock(&self.warnings).clone()
    }

    pub fn successes(&self) -> Vec<String> {
        lock(&self.successes).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_warning(&self, message: &str) {
        lock(&self.warnings).push(message.to_string());
    }

    fn show_success(&self, message: &str) {
        lock(&self.successes).push(message.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyEvent {
    Shown,
    Hidden,
}

/// Records show/hide transitions in order.
#[derive(Debug, Default)]
pub struct RecordingIndicator {
    events: Mutex<Vec<BusyEvent>>,
}

impl RecordingIndicator {
    pub fn events(&self) -> Vec<BusyEvent> {
        lock(&self.events).clone()
    }

    pub fn shown(&self) -> usize {
        self.count(BusyEvent::Shown)
    }

    pub fn hidden(&self) -> usize {
        self.count(BusyEvent::Hidden)
    }

    fn count(&self, kind: BusyEvent) -> usize {
        lock(&self.events).iter().filter(|e| **e == kind).count()
    }
}

impl BusyIndicator for RecordingIndicator {
    fn show(&self) {
        lock(&self.events).push(BusyEvent::Shown);
    }

    fn hide(&self) {
        lock(&self.events).push(BusyEvent::Hidden);
    }
}
