//! In-flight request bookkeeping for the global busy indicator.
//!
//! Every request holds an [`InFlightGuard`] for its lifetime. Releasing the
//! slot happens in `Drop`, so success, failure and cancellation all release.

use std::sync::{Arc, Mutex};

/// Host UI element shown while requests are outstanding.
pub trait BusyIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Indicator for hosts without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl BusyIndicator for NoopIndicator {
    fn show(&self) {}
    fn hide(&self) {}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counts {
    /// Every outstanding request.
    total: usize,
    /// Outstanding requests that drive the indicator.
    visible: usize,
}

struct Tracker {
    counts: Mutex<Counts>,
    indicator: Arc<dyn BusyIndicator>,
    exclusions: Vec<String>,
}

impl Tracker {
    // Indicator callbacks run under the lock so show/hide stay ordered.
    // They must not call back into the tracker.
    fn adjust<F: FnOnce(&mut Counts)>(&self, f: F) {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        let before = counts.visible;
        f(&mut counts);
        match (before, counts.visible) {
            (0, 1) => self.indicator.show(),
            (1, 0) => self.indicator.hide(),
            _ => {}
        }
    }
}

/// Reference-counted tracker of outstanding requests.
///
/// Cloning is cheap; all clones share one counter.
#[derive(Clone)]
pub struct InFlightTracker {
    inner: Arc<Tracker>,
}

impl core::fmt::Debug for InFlightTracker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InFlightTracker")
            .field("in_flight", &self.in_flight())
            .field("visible", &self.visible())
            .field("exclusions", &self.inner.exclusions)
            .finish()
    }
}

impl InFlightTracker {
    pub fn new(indicator: Arc<dyn BusyIndicator>, exclusions: Vec<String>) -> Self {
        Self {
            inner: Arc::new(Tracker {
                counts: Mutex::new(Counts::default()),
                indicator,
                exclusions,
            }),
        }
    }

    /// Whether requests to `url` are kept off the indicator.
    pub fn is_excluded(&self, url: &str) -> bool {
        self.inner
            .exclusions
            .iter()
            .any(|fragment| !fragment.is_empty() && url.contains(fragment.as_str()))
    }

    /// Take a slot for a request to `url`, released when the guard drops.
    pub fn acquire(&self, url: &str) -> InFlightGuard {
        let visible = !self.is_excluded(url);
        self.inner.adjust(|c| {
            c.total += 1;
            if visible {
                c.visible += 1;
            }
        });
        InFlightGuard {
            tracker: Arc::clone(&self.inner),
            visible,
        }
    }

    /// All outstanding requests, excluded ones included.
    pub fn in_flight(&self) -> usize {
        self.snapshot().total
    }

    /// Outstanding requests that count toward the indicator.
    pub fn visible(&self) -> usize {
        self.snapshot().visible
    }

    pub fn is_busy(&self) -> bool {
        self.visible() > 0
    }

    fn snapshot(&self) -> Counts {
        *self.inner.counts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One outstanding request. Dropping it releases the slot.
#[must_use = "dropping the guard immediately releases the in-flight slot"]
pub struct InFlightGuard {
    tracker: Arc<Tracker>,
    visible: bool,
}

impl InFlightGuard {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl core::fmt::Debug for InFlightGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InFlightGuard")
            .field("visible", &self.visible)
            .finish()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let visible = self.visible;
        self.tracker.adjust(|c| {
            c.total = c.total.saturating_sub(1);
            if visible {
                c.visible = c.visible.saturating_sub(1);
            }
        });
    }
}
