//! Definition of [`TimerService`].

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use chrono::Local;
use log::trace;
use tokio::{runtime::Handle, task::JoinHandle, time::sleep};

use crate::{event::Event, queue::EventSender};

use super::clock;

/// Timers with a shorter delay fire immediately.
const MIN_DELAY: Duration = Duration::from_millis(1);

type TimerTable = Arc<Mutex<HashMap<u32, JoinHandle<()>>>>;

fn lock(table: &TimerTable) -> MutexGuard<'_, HashMap<u32, JoinHandle<()>>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Responsible for setting and cancelling guest timers and alarms.
///
/// Every timer is a task on the runtime which sleeps and then enqueues its event
/// through the interrupt-context entry point, the way a hardware timer callback would.
/// Timers and alarms share one id counter.
#[derive(Clone)]
pub struct TimerService {
    runtime: Handle,
    events: EventSender,
    next_id: Arc<AtomicU32>,
    pending: TimerTable,
}

impl TimerService {
    /// Creates service spawning timer tasks on `runtime` and firing into `events`.
    pub fn new(runtime: Handle, events: EventSender) -> Self {
        Self {
            runtime,
            events,
            next_id: Arc::new(AtomicU32::new(0)),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts timer firing `timer` after `seconds`.
    ///
    /// Returns `None` for a negative, non-finite or unrepresentably long delay.
    pub fn start_timer(&self, seconds: f64) -> Option<u32> {
        let delay = Duration::try_from_secs_f64(seconds).ok()?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.schedule(id, delay, Event::Timer { id });
        Some(id)
    }

    /// Sets alarm firing `alarm` the next time the local clock shows `hour`.
    ///
    /// Returns `None` if `hour` is outside `0.0..24.0`.
    pub fn set_alarm(&self, hour: f64) -> Option<u32> {
        if !(0.0..24.0).contains(&hour) {
            return None;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let delay = clock::until_time_of_day(hour, &Local::now().time());
        self.schedule(id, delay, Event::Alarm { id });
        Some(id)
    }

    /// Cancels timer or alarm `id`. Returns `false` if it already fired or never existed.
    pub fn cancel(&self, id: u32) -> bool {
        match lock(&self.pending).remove(&id) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Cancels every pending timer and alarm, returning how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let mut pending = lock(&self.pending);
        let cancelled = pending.len();
        for (_, task) in pending.drain() {
            task.abort();
        }
        cancelled
    }

    /// Number of timers and alarms which have not fired yet.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    fn schedule(&self, id: u32, delay: Duration, event: Event) {
        if delay < MIN_DELAY {
            trace!("Firing '{}' {} immediately", event.name(), id);
            self.events.enqueue(event);
            return;
        }

        // Held until the task is registered, so the task can not remove itself first.
        let mut pending = lock(&self.pending);

        let events = self.events.clone();
        let table = self.pending.clone();
        let task = self.runtime.spawn(async move {
            sleep(delay).await;

            lock(&table).remove(&id);

            if events.enqueue_from_interrupt(event) {
                tokio::task::yield_now().await;
            }
        });

        pending.insert(id, task);
    }
}
