//! Services behind the guest `os` API: timers, alarms, custom events, clocks and identity.

pub mod clock;
mod timer;

#[cfg(test)]
mod tests;

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use crate::{
    event::{Event, Value},
    queue::EventSender,
};

pub use clock::Locale;
pub use timer::TimerService;

/// Machine-wide state shared by the guest API.
///
/// The computer label lives for one session only. Every machine starts from the label in
/// its [`MachineConfig`][`crate::MachineConfig`]; set it there to keep it across runs.
#[derive(Clone)]
pub struct OsServices {
    events: EventSender,
    timers: TimerService,
    started: Instant,
    computer_id: u32,
    label: Arc<Mutex<Option<String>>>,
}

impl OsServices {
    /// Creates services for a machine with `computer_id` and an optional initial `label`.
    pub fn new(
        events: EventSender,
        timers: TimerService,
        computer_id: u32,
        label: Option<String>,
    ) -> Self {
        Self {
            events,
            timers,
            started: Instant::now(),
            computer_id,
            label: Arc::new(Mutex::new(label)),
        }
    }

    /// Producer handle of the machine event queue.
    pub fn events(&self) -> &EventSender {
        &self.events
    }

    /// Timer and alarm service.
    pub fn timers(&self) -> &TimerService {
        &self.timers
    }

    /// Queues a custom event behind everything already queued.
    /// Returns `false` if the queue was full and the event was dropped.
    pub fn queue_event(&self, name: &str, args: Vec<Value>) -> bool {
        self.events.enqueue(Event::Custom {
            name: name.to_owned(),
            args,
        })
    }

    /// Seconds since the services were created.
    pub fn clock(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    #[allow(missing_docs)]
    pub fn computer_id(&self) -> u32 {
        self.computer_id
    }

    #[allow(missing_docs)]
    pub fn computer_label(&self) -> Option<String> {
        self.label
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sets or, with `None`, clears the computer label for the rest of the session.
    pub fn set_computer_label(&self, label: Option<&str>) {
        *self.label.lock().unwrap_or_else(PoisonError::into_inner) = label.map(str::to_owned);
    }
}
