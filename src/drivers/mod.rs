//! Producers which feed the machine [event queue][`crate::queue::EventQueue`].
//!
//! Every driver runs as a task on the machine runtime and only ever talks to the
//! queue through its own [`EventSender`].

mod console;
mod signal;


use async_trait::async_trait;

use crate::queue::EventSender;

pub use console::{key_code, keystrokes, ConsoleKeyboard, ENTER};
pub use signal::TerminateSignal;

/// Specifies source of events running alongside the guest.
#[async_trait]
pub trait Driver: Send + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Produces events into `events` until the source is exhausted or the runtime stops.
    async fn run(&mut self, events: EventSender);
}
