// Debounced callbacks for search boxes and similar bursty input.
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::clock::{Scheduler, TimerId};

type Callback<A> = Box<dyn Fn(A) + Send + Sync + 'static>;

#[derive(Default)]
struct PendingCall {
    timer: Option<TimerId>,
    generation: u64,
}

struct DebounceInner<A> {
    scheduler: Arc<dyn Scheduler>,
    wait: Duration,
    callback: Callback<A>,
    pending: Mutex<PendingCall>,
}

/// Collapses a burst of calls into one call made `wait` after the latest invocation.
///
/// Only the arguments of the most recent call reach the callback. Cloning shares the
/// same pending state.
pub struct Debouncer<A> {
    inner: Arc<DebounceInner<A>>,
}

impl<A> Clone for Debouncer<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(scheduler: Arc<dyn Scheduler>, wait: Duration, callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(DebounceInner {
                scheduler,
                wait,
                callback: Box::new(callback),
                pending: Mutex::new(PendingCall::default()),
            }),
        }
    }

    pub fn wait(&self) -> Duration {
        self.inner.wait
    }

    /// Restarts the quiet period with `args` as the payload.
    pub fn call(&self, args: A) {
        let mut pending = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.timer.take() {
            self.inner.scheduler.cancel(timer);
        }
        pending.generation = pending.generation.wrapping_add(1);
        let generation = pending.generation;

        let inner = Arc::clone(&self.inner);
        let timer = self.inner.scheduler.schedule(
            self.inner.wait,
            Box::new(move || inner.fire(generation, args)),
        );
        pending.timer = Some(timer);
    }

    pub fn is_pending(&self) -> bool {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .timer
            .is_some()
    }

    /// Drops the pending call, if any. Returns whether one was dropped.
    pub fn cancel(&self) -> bool {
        let mut pending = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.generation = pending.generation.wrapping_add(1);
        match pending.timer.take() {
            Some(timer) => self.inner.scheduler.cancel(timer),
            None => false,
        }
    }
}

impl<A> DebounceInner<A> {
    fn fire(&self, generation: u64, args: A) {
        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            // A newer call superseded this one after its timer had already started.
            if pending.generation != generation {
                return;
            }
            pending.timer = None;
        }
        (self.callback)(args);
    }
}

/// Wraps `callback` in a [`Debouncer`].
pub fn debounce<A, F>(scheduler: Arc<dyn Scheduler>, wait: Duration, callback: F) -> Debouncer<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debouncer::new(scheduler, wait, callback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;

    fn setup() -> (Arc<VirtualClock>, Arc<Mutex<Vec<String>>>, Debouncer<String>) {
        let clock = Arc::new(VirtualClock::new());
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debouncer = debounce(
            clock.clone() as Arc<dyn Scheduler>,
            Duration::from_millis(100),
            move |query: String| sink.lock().unwrap().push(query),
        );
        (clock, calls, debouncer)
    }

    #[test]
    fn test_burst_collapses_to_last_call() {
        let (clock, calls, debouncer) = setup();
        debouncer.call("c".to_string());
        clock.advance(Duration::from_millis(50));
        debouncer.call("cl".to_string());
        clock.advance(Duration::from_millis(50));
        debouncer.call("cli".to_string());
        assert!(calls.lock().unwrap().is_empty());

        clock.advance(Duration::from_millis(99));
        assert!(calls.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        clock.advance(Duration::from_millis(1));
        assert_eq!(*calls.lock().unwrap(), vec!["cli".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_separate_quiet_periods_fire_separately() {
        let (clock, calls, debouncer) = setup();
        debouncer.call("first".to_string());
        clock.advance(Duration::from_millis(150));
        debouncer.call("second".to_string());
        clock.advance(Duration::from_millis(150));
        assert_eq!(*calls.lock().unwrap(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_cancel_drops_pending_call() {
        let (clock, calls, debouncer) = setup();
        debouncer.call("draft".to_string());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        clock.advance(Duration::from_secs(1));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_clones_share_pending_state() {
        let (clock, calls, debouncer) = setup();
        let other = debouncer.clone();
        debouncer.call("from-a".to_string());
        other.call("from-b".to_string());
        clock.advance(Duration::from_millis(100));
        assert_eq!(*calls.lock().unwrap(), vec!["from-b".to_string()]);
    }
}
