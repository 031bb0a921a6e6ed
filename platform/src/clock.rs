// Timer scheduling behind a trait so that notifications and debounced calls can run on
// tokio in production and on a manually advanced virtual clock in tests.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Deferred unit of work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Fire-and-forget timers.
pub trait Scheduler: Send + Sync {
    /// Runs `task` once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task) -> TimerId;

    /// Drops a pending timer. Returns false if it already fired or was cancelled.
    fn cancel(&self, id: TimerId) -> bool;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// --- Virtual clock ---

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Task>,
    due_by_id: HashMap<u64, Duration>,
}

/// Deterministic scheduler: nothing fires until `advance` moves time forward.
///
/// Timers fire in due order; timers due at the same instant fire in scheduling order.
/// Tasks run without the clock lock held, so they may schedule or cancel other timers.
#[derive(Default)]
pub struct VirtualClock {
    state: Mutex<ClockState>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time since creation.
    pub fn now(&self) -> Duration {
        lock(&self.state).now
    }

    pub fn pending(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// Moves time forward by `by`, running every timer that comes due on the way.
    /// Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = lock(&self.state).now + by;
        let mut fired = 0;
        loop {
            let task = {
                let mut state = lock(&self.state);
                let next_key = match state.queue.keys().next() {
                    Some(key) if key.0 <= target => *key,
                    _ => break,
                };
                state.now = next_key.0;
                state.due_by_id.remove(&next_key.1);
                state.queue.remove(&next_key)
            };
            if let Some(task) = task {
                task();
                fired += 1;
            }
        }
        let mut state = lock(&self.state);
        if state.now < target {
            state.now = target;
        }
        fired
    }
}

impl Scheduler for VirtualClock {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now + delay;
        state.queue.insert((due, id), task);
        state.due_by_id.insert(id, due);
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut state = lock(&self.state);
        match state.due_by_id.remove(&id.0) {
            Some(due) => state.queue.remove(&(due, id.0)).is_some(),
            None => false,
        }
    }
}

// --- Tokio scheduler ---

/// Scheduler backed by tokio: one sleeping task per timer, aborted on cancel.
pub struct TokioScheduler {
    handle: Handle,
    next_id: AtomicU64,
    timers: Arc<Mutex<HashMap<u64, AbortHandle>>>,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            next_id: AtomicU64::new(0),
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Uses the runtime of the calling context. Panics outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    pub fn pending(&self) -> usize {
        lock(&self.timers).len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let timers = Arc::clone(&self.timers);
        // Held across spawn so the timer cannot fire before it is registered.
        let mut registry = lock(&self.timers);
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let live = lock(&timers).remove(&id).is_some();
            if live {
                task();
            }
        });
        registry.insert(id, join.abort_handle());
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) -> bool {
        match lock(&self.timers).remove(&id.0) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}
