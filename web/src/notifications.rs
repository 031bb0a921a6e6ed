// Transient toast notifications.
//
// Each notification is a `div.notification.notification-<kind>` appended to the body.
// It becomes visible shortly after creation, starts hiding once the display period
// (counted from the call) is over, and is removed after the exit transition.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use platform::clock::Scheduler;
use platform::config::settings::NotificationSettings;
use platform::notify::Notifier;
use shared::models::NotificationKind;

use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Pending,
    Visible,
    Hiding,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTimings {
    pub enter_delay: Duration,
    pub display: Duration,
    pub exit: Duration,
}

impl Default for NotificationTimings {
    fn default() -> Self {
        Self::from(&NotificationSettings::default())
    }
}

impl From<&NotificationSettings> for NotificationTimings {
    fn from(settings: &NotificationSettings) -> Self {
        Self {
            enter_delay: settings.enter_delay(),
            display: settings.display(),
            exit: settings.exit(),
        }
    }
}

struct LiveNotification {
    node: NodeId,
    phase: NotificationPhase,
}

struct CenterInner {
    document: Arc<dyn Document>,
    scheduler: Arc<dyn Scheduler>,
    timings: NotificationTimings,
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, LiveNotification>>,
}

#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<CenterInner>,
}

impl NotificationCenter {
    pub fn new(
        document: Arc<dyn Document>,
        scheduler: Arc<dyn Scheduler>,
        timings: NotificationTimings,
    ) -> Self {
        Self {
            inner: Arc::new(CenterInner {
                document,
                scheduler,
                timings,
                next_id: AtomicU64::new(1),
                live: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn timings(&self) -> NotificationTimings {
        self.inner.timings
    }

    pub fn show(&self, message: &str, kind: NotificationKind) -> NotificationId {
        let inner = &self.inner;
        let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
        let node = inner.document.create_element("div");
        let attached = inner
            .document
            .set_attribute(node, "class", &format!("notification notification-{}", kind))
            .and_then(|_| inner.document.set_text_content(node, message))
            .and_then(|_| inner.document.append_child(inner.document.body(), node));
        if let Err(e) = attached {
            tracing::warn!(id, error = %e, "Could not attach notification");
        }
        tracing::debug!(id, kind = kind.as_str(), message, "Showing notification");

        inner.live().insert(
            id,
            LiveNotification {
                node,
                phase: NotificationPhase::Pending,
            },
        );

        let entering = Arc::clone(inner);
        inner
            .scheduler
            .schedule(inner.timings.enter_delay, Box::new(move || entering.enter(id)));
        let hiding = Arc::clone(inner);
        inner
            .scheduler
            .schedule(inner.timings.display, Box::new(move || hiding.hide(id)));

        NotificationId(id)
    }

    /// Current phase of `id`. Ids this center never issued are reported as `None`.
    pub fn phase(&self, id: NotificationId) -> Option<NotificationPhase> {
        if id.0 == 0 || id.0 >= self.inner.next_id.load(Ordering::Relaxed) {
            return None;
        }
        Some(
            self.inner
                .live()
                .get(&id.0)
                .map_or(NotificationPhase::Removed, |n| n.phase),
        )
    }

    /// Notifications still attached to the document.
    pub fn active_count(&self) -> usize {
        self.inner.live().len()
    }

    pub fn element(&self, id: NotificationId) -> Option<NodeId> {
        self.inner.live().get(&id.0).map(|n| n.node)
    }
}

impl CenterInner {
    fn live(&self) -> MutexGuard<'_, HashMap<u64, LiveNotification>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, id: u64) {
        let mut live = self.live();
        let Some(entry) = live.get_mut(&id) else { return };
        // The hide timer wins when the display period is shorter than the enter delay.
        if entry.phase != NotificationPhase::Pending {
            return;
        }
        entry.phase = NotificationPhase::Visible;
        if let Err(e) = self.document.add_class(entry.node, "show") {
            tracing::warn!(id, error = %e, "Could not show notification");
        }
    }

    fn hide(self: Arc<Self>, id: u64) {
        {
            let mut live = self.live();
            let Some(entry) = live.get_mut(&id) else { return };
            entry.phase = NotificationPhase::Hiding;
            if let Err(e) = self.document.remove_class(entry.node, "show") {
                tracing::warn!(id, error = %e, "Could not hide notification");
            }
        }
        let removing = Arc::clone(&self);
        self.scheduler
            .schedule(self.timings.exit, Box::new(move || removing.remove(id)));
    }

    fn remove(&self, id: u64) {
        let Some(entry) = self.live().remove(&id) else { return };
        if let Err(e) = self.document.remove(entry.node) {
            tracing::warn!(id, error = %e, "Could not remove notification");
        }
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, message: &str, kind: NotificationKind) {
        self.show(message, kind);
    }
}
