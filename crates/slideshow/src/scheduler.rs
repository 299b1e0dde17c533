//! Timer capability used by the page controllers.
//!
//! A scheduler never calls back into its owner. Each firing is delivered as a
//! [`TimerHandle`] into the host's ordered event queue, and the owner decides
//! whether the handle is still current when it is dispatched.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Shortest period a repeating timer runs at; a zero period is raised to it.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

pub trait Scheduler {
    fn schedule_repeating(&self, period: Duration) -> TimerHandle;
    fn schedule_once(&self, delay: Duration) -> TimerHandle;
    fn cancel(&self, handle: TimerHandle);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct TaskRegistry {
    tasks: Mutex<HashMap<TimerHandle, JoinHandle<()>>>,
}

impl Drop for TaskRegistry {
    fn drop(&mut self) {
        for (_, task) in lock(&self.tasks).drain() {
            task.abort();
        }
    }
}

/// Scheduler backed by tokio timers.
///
/// Clones share the same handle space and task registry. Dropping the last
/// clone aborts every outstanding timer.
pub struct TokioScheduler<E = TimerHandle> {
    sink: mpsc::UnboundedSender<E>,
    wrap: fn(TimerHandle) -> E,
    next_id: Arc<AtomicU64>,
    registry: Arc<TaskRegistry>,
}

impl<E> Clone for TokioScheduler<E> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
            wrap: self.wrap,
            next_id: Arc::clone(&self.next_id),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl TokioScheduler<TimerHandle> {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerHandle>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::with_sink(tx, std::convert::identity), rx)
    }
}

impl<E: Send + 'static> TokioScheduler<E> {
    /// Delivers firings into an existing event queue, wrapped by `wrap`.
    pub fn with_sink(sink: mpsc::UnboundedSender<E>, wrap: fn(TimerHandle) -> E) -> Self {
        Self {
            sink,
            wrap,
            next_id: Arc::new(AtomicU64::new(1)),
            registry: Arc::new(TaskRegistry {
                tasks: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn allocate(&self) -> TimerHandle {
        TimerHandle(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn pending(&self) -> usize {
        lock(&self.registry.tasks)
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }
}

impl<E: Send + 'static> Scheduler for TokioScheduler<E> {
    fn schedule_repeating(&self, period: Duration) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        let handle = self.allocate();
        let sink = self.sink.clone();
        let wrap = self.wrap;
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if sink.send(wrap(handle)).is_err() {
                    break;
                }
            }
        });
        lock(&self.registry.tasks).insert(handle, task);
        trace!(timer = handle.0, period_ms = period.as_millis() as u64, "repeating timer scheduled");
        handle
    }

    fn schedule_once(&self, delay: Duration) -> TimerHandle {
        let handle = self.allocate();
        let sink = self.sink.clone();
        let wrap = self.wrap;
        let registry = Arc::downgrade(&self.registry);
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = sink.send(wrap(handle));
            if let Some(registry) = registry.upgrade() {
                lock(&registry.tasks).remove(&handle);
            }
        });
        lock(&self.registry.tasks).insert(handle, task);
        trace!(timer = handle.0, delay_ms = delay.as_millis() as u64, "one-shot timer scheduled");
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(task) = lock(&self.registry.tasks).remove(&handle) {
            task.abort();
            trace!(timer = handle.0, "timer cancelled");
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct VirtualTimer {
    due: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
struct VirtualState {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerHandle, VirtualTimer>,
}

/// Deterministic scheduler over a virtual clock.
///
/// Nothing fires until [`VirtualScheduler::advance`] is called; firings are
/// returned in due order, ties broken by scheduling order.
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    state: Arc<Mutex<VirtualState>>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        lock(&self.state).now
    }

    pub fn pending(&self) -> usize {
        lock(&self.state).timers.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        lock(&self.state).timers.contains_key(&handle)
    }

    pub fn advance(&self, by: Duration) -> Vec<TimerHandle> {
        let mut state = lock(&self.state);
        let target = state.now + by;
        let mut fired = Vec::new();

        loop {
            let next_due = state
                .timers
                .iter()
                .filter(|(_, timer)| timer.due <= target)
                .min_by_key(|(handle, timer)| (timer.due, **handle))
                .map(|(handle, timer)| (*handle, *timer));

            let Some((handle, timer)) = next_due else {
                break;
            };

            state.now = timer.due;
            fired.push(handle);
            match timer.period {
                Some(period) => {
                    if let Some(entry) = state.timers.get_mut(&handle) {
                        entry.due += period;
                    }
                }
                None => {
                    state.timers.remove(&handle);
                }
            }
        }

        state.now = target;
        fired
    }

    fn insert(&self, delay: Duration, period: Option<Duration>) -> TimerHandle {
        let mut state = lock(&self.state);
        state.next_id += 1;
        let handle = TimerHandle(state.next_id);
        let due = state.now + delay;
        state.timers.insert(handle, VirtualTimer { due, period });
        handle
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule_repeating(&self, period: Duration) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.insert(period, Some(period))
    }

    fn schedule_once(&self, delay: Duration) -> TimerHandle {
        self.insert(delay, None)
    }

    fn cancel(&self, handle: TimerHandle) {
        lock(&self.state).timers.remove(&handle);
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
