//! Boundary between the scheduler and the guest script host.

use crate::event::Value;

/// Result of resuming the guest.
#[derive(Clone, Debug, PartialEq)]
pub enum Resumption {
    /// Guest is waiting for the next event, optionally only for the one with this kind-name.
    Yielded(Option<String>),
    /// Guest finished normally.
    Completed,
    /// Guest failed with a message.
    Errored(String),
    /// Guest asked to power the computer off.
    Shutdown,
    /// Guest asked to restart the computer.
    Reboot,
}

/// Suspendable execution context running the guest program.
///
/// The scheduler only relies on this resume/yield contract, never on the
/// host's internal state. One host serves exactly one scheduler run.
pub trait GuestHost {
    /// Resumes the guest with `args` and runs it until it yields or stops.
    ///
    /// The first call of a run passes no arguments.
    fn resume(&mut self, args: Vec<Value>) -> Resumption;
}

impl<H: GuestHost + ?Sized> GuestHost for Box<H> {
    fn resume(&mut self, args: Vec<Value>) -> Resumption {
        (**self).resume(args)
    }
}
