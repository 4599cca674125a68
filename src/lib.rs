//! Event-driven host runtime for a CraftOS-compatible virtual computer.
//!
//! Hardware and software producers push [events][`event::Event`] into one bounded
//! [queue][`queue::EventQueue`]; a single [scheduler][`scheduler::Scheduler`] pulls them out
//! and resumes the guest program with their payload, honoring the event filter the guest
//! yielded with.

// Add warnings for missing public documentation.
#![warn(missing_docs)]

pub mod drivers;

pub mod event;

pub mod host;

pub mod machine;

pub mod os;

pub mod programs;

pub mod queue;

pub mod scheduler;

pub use event::{Event, EventKind, Value};
pub use host::{Os, Program, ProgramHost, ProgramWrapper};
pub use machine::{Machine, MachineConfig};
pub use queue::{EventQueue, EventSender};
pub use scheduler::{run_scheduler, GuestHost, Halt, HaltDisplay, Resumption, Scheduler};
