use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A deferred one-shot callback.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs callbacks after a delay.
///
/// Scheduled callbacks cannot be cancelled. Callers must make the callback
/// itself safe to run after the state it was scheduled for has moved on.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task);

    /// Number of callbacks scheduled but not yet fired.
    fn pending(&self) -> usize;
}

/// Fires callbacks on the ambient tokio runtime.
///
/// Under a paused tokio clock (`#[tokio::test(start_paused = true)]`) the
/// delays elapse in virtual time.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    pending: Arc<AtomicUsize>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "No tokio runtime, dropping deferred task");
                return;
            }
        };

        let guard = PendingGuard::new(self.pending.clone());
        handle.spawn(async move {
            let _guard = guard;
            tokio::time::sleep(delay).await;
            task();
        });
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

/// Counts a spawned task as pending until the task is dropped, including
/// when it panics.
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn new(pending: Arc<AtomicUsize>) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self(pending)
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Deterministic virtual-clock scheduler.
///
/// Nothing fires until [`advance`](Self::advance) or
/// [`run_until_idle`](Self::run_until_idle) is called. Callbacks due at the
/// same instant fire in the order they were scheduled.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), Task>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().expect("scheduler lock poisoned").now
    }

    /// Move the clock forward, firing every callback that falls due.
    ///
    /// Callbacks scheduled by fired callbacks also run if they fall due
    /// before the new time. Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let mut fired = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            fired += 1;
        }
        self.state.lock().expect("scheduler lock poisoned").now = target;
        fired
    }

    /// Fire callbacks until none remain, advancing the clock as needed.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while let Some(task) = self.pop_due(Duration::MAX) {
            task();
            fired += 1;
        }
        fired
    }

    /// Remove the earliest callback due at or before `deadline`, moving the
    /// clock to its due time. The lock is released before the callback runs
    /// so it may schedule more work.
    fn pop_due(&self, deadline: Duration) -> Option<Task> {
        let mut state = self.state.lock().expect("scheduler lock poisoned");
        let (&(due, seq), _) = state.queue.iter().next()?;
        if due > deadline {
            return None;
        }
        state.now = due;
        state.queue.remove(&(due, seq))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut state = self.state.lock().expect("scheduler lock poisoned");
        let due = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.queue.insert((due, seq), task);
    }

    fn pending(&self) -> usize {
        self.state.lock().expect("scheduler lock poisoned").queue.len()
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().expect("scheduler lock poisoned");
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |label: &'static str| -> Task {
            let log = log_clone.clone();
            Box::new(move || log.lock().unwrap().push(label))
        };
        (log, make)
    }

    #[test]
    fn fires_only_due_callbacks() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule(Duration::from_millis(10), task("early"));
        scheduler.schedule(Duration::from_millis(30), task("late"));

        assert_eq!(scheduler.advance(Duration::from_millis(20)), 1);
        assert_eq!(*log.lock().unwrap(), vec!["early"]);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
    }

    #[test]
    fn same_deadline_fires_in_insertion_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule(Duration::from_millis(5), task("a"));
        scheduler.schedule(Duration::from_millis(5), task("b"));
        scheduler.schedule(Duration::from_millis(5), task("c"));

        scheduler.advance(Duration::from_millis(5));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn run_until_idle_drains_chained_callbacks() {
        let scheduler = Arc::new(ManualScheduler::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let inner_hits = hits.clone();
        let inner_scheduler = scheduler.clone();
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                inner_hits.fetch_add(1, Ordering::SeqCst);
                let hits = inner_hits.clone();
                inner_scheduler.schedule(
                    Duration::from_millis(10),
                    Box::new(move || {
                        hits.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );

        assert_eq!(scheduler.run_until_idle(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_fires_after_delay() {
        let scheduler = TokioScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let task_hits = hits.clone();
        scheduler.schedule(
            Duration::from_millis(100),
            Box::new(move || {
                task_hits.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_releases_pending_when_task_panics() {
        let scheduler = TokioScheduler::new();
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(|| panic!("task blew up")),
        );
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn advance_saturates_instead_of_overflowing() {
        let scheduler = ManualScheduler::new();
        scheduler.advance(Duration::from_millis(5));
        scheduler.advance(Duration::MAX);
        assert_eq!(scheduler.now(), Duration::MAX);
    }

    #[test]
    fn tokio_scheduler_without_runtime_drops_task() {
        let scheduler = TokioScheduler::new();
        scheduler.schedule(Duration::from_millis(1), Box::new(|| {}));
        assert_eq!(scheduler.pending(), 0);
    }
}
