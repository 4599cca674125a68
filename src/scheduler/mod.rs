//! Definition of [`Scheduler`], the loop which drives the guest with events.

mod host;
mod pending;


use log::{debug, error, info, trace};

use crate::{event::Value, queue::EventQueue};

pub use host::{GuestHost, Resumption};
pub use pending::PendingEvents;

/// Reason the scheduler stopped. Both cases are terminal for the session.
#[derive(Clone, Debug, PartialEq)]
pub enum Halt {
    /// Guest program returned. The top-level program is not supposed to.
    Completed,
    /// Guest program failed with the message.
    Errored(String),
    /// Guest program powered the computer off.
    Shutdown,
    /// Guest program asked for a restart. The owner of the session decides how to boot again.
    Reboot,
}

impl Halt {
    /// Lines of the halt screen. Power requests leave the screen blank.
    pub fn screen(&self) -> Vec<String> {
        match self {
            Halt::Completed => vec![
                "Computer halted".to_owned(),
                "The startup program has exited".to_owned(),
            ],
            Halt::Errored(message) => vec![
                "Error running computer".to_owned(),
                message.clone(),
                "ComputerCraft may be installed incorrectly".to_owned(),
            ],
            Halt::Shutdown | Halt::Reboot => Vec::new(),
        }
    }
}

/// Renders the halt screen once the scheduler has stopped.
pub trait HaltDisplay {
    /// Shows `halt` to the user.
    fn show_halt(&mut self, halt: &Halt);
}

/// Single consumer of the [`EventQueue`], resuming the guest with one event at a time.
///
/// Events the guest is not waiting for are kept in the [`PendingEvents`] list, so a later
/// wait with another filter (or none) still sees them in their original order.
pub struct Scheduler<'q> {
    queue: &'q mut EventQueue,
    pending: PendingEvents,
}

impl<'q> Scheduler<'q> {
    /// Creates scheduler consuming `queue`.
    pub fn new(queue: &'q mut EventQueue) -> Self {
        Self {
            queue,
            pending: PendingEvents::default(),
        }
    }

    /// Returns the resume arguments of the oldest event satisfying `filter`.
    ///
    /// Pending events are examined first. If none matches, events are taken from the queue,
    /// blocking when it is empty, and each non-matching one is appended to the pending list.
    /// The returned event is removed for good: its payload is materialized here, exactly once.
    ///
    /// An empty filter is the same as no filter; terminate satisfies any filter.
    pub fn next_event(&mut self, filter: Option<&str>) -> Vec<Value> {
        let filter = filter.filter(|filter| !filter.is_empty());

        let from_pending = if self.pending.is_empty() {
            None
        } else {
            self.pending.take_matching(filter)
        };
        if let Some(event) = from_pending {
            trace!(
                "Delivering pending '{}' event, {} left pending",
                event.name(),
                self.pending.len()
            );
            return event.into_args();
        }

        // Nothing pending matches, so only events newer than all of them can.
        loop {
            let event = self.queue.dequeue_blocking();
            if event.matches(filter) {
                trace!("Delivering '{}' event", event.name());
                return event.into_args();
            }

            trace!(
                "Deferring '{}' event while waiting for '{}'",
                event.name(),
                filter.unwrap_or_default()
            );
            self.pending.push(event);
        }
    }

    /// Number of events waiting in the pending list.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drives `host` until the guest completes or fails, then tears down.
    ///
    /// The host is resumed first with no arguments, then with the event matching each
    /// filter it yields. On halt the host is dropped, pending events are released and the
    /// queue is flushed. Consuming `self` makes a halted scheduler unusable.
    pub fn run<H: GuestHost>(mut self, mut host: H) -> Halt {
        info!("Running guest program");

        let mut args = Vec::new();
        let halt = loop {
            match host.resume(args) {
                Resumption::Yielded(filter) => {
                    args = self.next_event(filter.as_deref());
                }
                Resumption::Completed => break Halt::Completed,
                Resumption::Errored(message) => break Halt::Errored(message),
                Resumption::Shutdown => break Halt::Shutdown,
                Resumption::Reboot => break Halt::Reboot,
            }
        };

        match &halt {
            Halt::Completed => info!("Guest program completed"),
            Halt::Errored(message) => error!("Guest program errored: {}", message),
            Halt::Shutdown => info!("Guest program shut the computer down"),
            Halt::Reboot => info!("Guest program requested reboot"),
        }

        drop(host);
        self.teardown();

        halt
    }

    fn teardown(&mut self) {
        let pending = self.pending.clear();
        let queued = self.queue.reset();
        debug!(
            "Session closed, released {} pending and {} queued events",
            pending, queued
        );
    }
}

/// Runs `host` on `queue` to completion and shows the halt screen on `display`.
///
/// Takes ownership of the host: one host per run. Returns only when the guest has halted.
pub fn run_scheduler<H: GuestHost>(
    queue: &mut EventQueue,
    host: H,
    display: &mut dyn HaltDisplay,
) -> Halt {
    let halt = Scheduler::new(queue).run(host);
    display.show_halt(&halt);
    halt
}
