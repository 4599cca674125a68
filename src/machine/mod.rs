//! Definition of [`Machine`], which puts the queue, drivers, timers and scheduler together.

mod config;
mod terminal;

#[cfg(test)]
mod tests;

use log::{debug, info};
use tokio::runtime::{self, Runtime};

use crate::{
    drivers::Driver,
    host::{Program, ProgramHost, ProgramWrapper},
    os::{OsServices, TimerService},
    queue::{EventQueue, EventSender},
    scheduler::{run_scheduler, Halt, HaltDisplay},
};

pub use config::MachineConfig;
pub use terminal::ConsoleHaltDisplay;

/// Represents one computer session.
///
/// The machine owns a runtime for drivers and timers, while the scheduler runs on the
/// thread calling [`Machine::run`]. A machine runs once: it is consumed by the run.
pub struct Machine {
    config: MachineConfig,
    runtime: Runtime,
    queue: EventQueue,
    timers: TimerService,
    drivers: Vec<Box<dyn Driver>>,
    host: Option<ProgramHost>,
}

impl Machine {
    /// Creates new instance of [`Machine`] from [`MachineConfig`].
    pub fn new(config: MachineConfig) -> Result<Self, String> {
        config.validate()?;

        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads())
            .thread_name("craftos-worker")
            .enable_all()
            .build()
            .map_err(|e| format!("Can not create runtime: {}", e))?;

        let queue = EventQueue::new(config.event_queue_capacity());
        let timers = TimerService::new(runtime.handle().clone(), queue.sender());

        Ok(Self {
            config,
            runtime,
            queue,
            timers,
            drivers: Vec::new(),
            host: None,
        })
    }

    /// Configuration the machine was created with.
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Returns new producer handle for the machine event queue.
    pub fn events(&self) -> EventSender {
        self.queue.sender()
    }

    /// Registers `driver`. It is started when the machine runs.
    pub fn add_driver<D: Driver>(&mut self, driver: D) {
        self.drivers.push(Box::new(driver));
    }

    /// Builds the OS services for a guest of this machine.
    pub fn services(&self) -> OsServices {
        OsServices::new(
            self.queue.sender(),
            self.timers.clone(),
            self.config.computer_id(),
            self.config.label().map(str::to_owned),
        )
    }

    /// Loads the startup `program`.
    ///
    /// # Returns
    ///
    /// - [`Ok(ProgramWrapper)`][`ProgramWrapper`] giving read access to the program after the run.
    /// - [`Err(String)`][`Err`] if a program has already been loaded.
    pub fn load<P: Program>(&mut self, program: P) -> Result<ProgramWrapper<P>, String> {
        if self.host.is_some() {
            return Err("Startup program is already loaded".to_owned());
        }

        let (host, wrapper) = ProgramHost::new(program, self.services());
        self.host = Some(host);
        Ok(wrapper)
    }

    /// Runs the startup program until it halts, then shows the halt screen on `display`.
    ///
    /// Drivers are started first. After the halt every pending timer is cancelled and
    /// the runtime is shut down without waiting for the drivers.
    pub fn run(mut self, display: &mut dyn HaltDisplay) -> Result<Halt, String> {
        let host = self
            .host
            .take()
            .ok_or_else(|| "No startup program loaded".to_owned())?;

        for mut driver in self.drivers.drain(..) {
            let events = self.queue.sender();
            let name = driver.name();
            info!("Starting driver '{}'", name);
            self.runtime.spawn(async move {
                driver.run(events).await;
                debug!("Driver '{}' finished", name);
            });
        }

        let halt = run_scheduler(&mut self.queue, host, display);

        let cancelled = self.timers.cancel_all();
        debug!("Cancelled {} pending timers", cancelled);

        self.runtime.shutdown_background();

        Ok(halt)
    }
}
