//! Definition of [`ProgramHost`], a [`GuestHost`] running a [`Program`] as a coroutine.
//!
//! The program runs on its own thread and is only ever active while the scheduler is
//! blocked in [`GuestHost::resume`], so at any moment exactly one of them makes progress.

mod os;


use std::{
    any::Any,
    io,
    ops::Deref,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
};

use log::{debug, trace};
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::{
    event::Value,
    os::OsServices,
    scheduler::{GuestHost, Resumption},
};

pub use os::Os;

/// Represents requirements for every guest program.
///
/// The program talks to the machine through [`Os`]: it waits for events with
/// [`Os::pull_event`] and uses the OS services in between.
/// Returning from [`Program::run`] halts the computer.
pub trait Program: Send + 'static {
    /// Runs the program until it finishes.
    fn run(&mut self, os: &mut Os) -> Result<(), String>;
}

impl<F> Program for F
where
    F: FnMut(&mut Os) -> Result<(), String> + Send + 'static,
{
    fn run(&mut self, os: &mut Os) -> Result<(), String> {
        self(os)
    }
}

/// Wrapper around a guest program, returned to the user when the program is passed to a host.
///
/// Gives read access to the program state, typically after the run.
/// While the program is running its state is locked by the guest thread.
pub struct ProgramWrapper<P: Program> {
    program_ref: Arc<Mutex<P>>,
}

impl<P: Program> Clone for ProgramWrapper<P> {
    fn clone(&self) -> Self {
        Self {
            program_ref: self.program_ref.clone(),
        }
    }
}

/// Guard for read access to a guest program.
pub struct ProgramGuard<'a, P: Program> {
    inner: MutexGuard<'a, P>,
}

impl<P: Program> Deref for ProgramGuard<'_, P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<P: Program> ProgramWrapper<P> {
    /// Returns guard for read access to the program.
    /// Blocks while the program is running.
    ///
    /// A program which panicked can still be read.
    pub fn read(&self) -> ProgramGuard<'_, P> {
        ProgramGuard {
            inner: self
                .program_ref
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// What the guest thread hands back to the host.
#[derive(Debug)]
pub(crate) enum GuestMessage {
    Yield(Option<String>),
    Finished(Result<(), String>),
    Power { reboot: bool },
}

type Launch = Box<dyn FnOnce() -> io::Result<JoinHandle<()>> + Send>;

/// Runs a guest [`Program`] on a dedicated thread, one resumption at a time.
///
/// The first [`resume`][`GuestHost::resume`] starts the program. Every later one hands the
/// event arguments to the program and blocks until it yields again or finishes.
///
/// Dropping the host releases the guest: a program blocked waiting for an event
/// gets an error and is expected to unwind.
pub struct ProgramHost {
    launch: Option<Launch>,
    to_guest: Option<Sender<Vec<Value>>>,
    from_guest: Receiver<GuestMessage>,
    thread: Option<JoinHandle<()>>,
}

impl ProgramHost {
    /// Creates host for `program` using `services`.
    /// The program does not start until the host is first resumed.
    pub fn new<P: Program>(program: P, services: OsServices) -> (Self, ProgramWrapper<P>) {
        let program_ref = Arc::new(Mutex::new(program));

        let (to_guest, from_host) = mpsc::channel(1);
        let (to_host, from_guest) = mpsc::channel(1);

        let guest_ref = program_ref.clone();
        let launch: Launch = Box::new(move || {
            thread::Builder::new()
                .name("guest".to_owned())
                .spawn(move || {
                    let mut os = Os::new(services, to_host, from_host);
                    let result = guest_ref
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .run(&mut os);
                    os.finish(result);
                })
        });

        let host = Self {
            launch: Some(launch),
            to_guest: Some(to_guest),
            from_guest,
            thread: None,
        };

        (host, ProgramWrapper { program_ref })
    }

    fn join(&mut self) -> Option<Box<dyn Any + Send>> {
        self.thread.take().and_then(|thread| thread.join().err())
    }

    /// Called when the guest thread went away without saying why.
    fn guest_lost(&mut self) -> Resumption {
        self.to_guest.take();

        let message = match self.join() {
            Some(panic) => format!("Guest program panicked: {}", panic_message(panic.as_ref())),
            None => "Guest program stopped unexpectedly".to_owned(),
        };

        Resumption::Errored(message)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

impl GuestHost for ProgramHost {
    fn resume(&mut self, args: Vec<Value>) -> Resumption {
        if let Some(launch) = self.launch.take() {
            match launch() {
                Ok(thread) => {
                    debug!("Started guest thread");
                    self.thread = Some(thread);
                }
                Err(err) => {
                    return Resumption::Errored(format!("Can not start guest thread: {}", err));
                }
            }
        } else {
            let delivered = self
                .to_guest
                .as_ref()
                .map_or(false, |to_guest| to_guest.blocking_send(args).is_ok());
            if !delivered {
                return self.guest_lost();
            }
        }

        match self.from_guest.blocking_recv() {
            Some(GuestMessage::Yield(filter)) => {
                trace!("Guest yielded with filter {:?}", filter);
                Resumption::Yielded(filter)
            }
            Some(GuestMessage::Finished(result)) => {
                self.to_guest.take();
                self.join();
                match result {
                    Ok(()) => Resumption::Completed,
                    Err(message) => Resumption::Errored(message),
                }
            }
            Some(GuestMessage::Power { reboot }) => {
                debug!("Guest requested {}", if reboot { "reboot" } else { "shutdown" });
                // Releases the guest, which unwinds with an error nobody waits for.
                self.to_guest.take();
                if reboot {
                    Resumption::Reboot
                } else {
                    Resumption::Shutdown
                }
            }
            None => self.guest_lost(),
        }
    }
}
