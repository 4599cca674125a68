//! Definition of [`Os`], the API a guest program sees.

use tokio::sync::mpsc::{Receiver, Sender};

use crate::{
    event::{EventKind, Value},
    os::{clock, Locale, OsServices},
};

use super::GuestMessage;

const HOST_GONE: &str = "Host has stopped";

/// Guest side of the host boundary.
///
/// Blocking calls ([`Os::pull_event`], [`Os::sleep`]) suspend the program and let the
/// scheduler run; everything else returns immediately.
pub struct Os {
    services: OsServices,
    to_host: Sender<GuestMessage>,
    from_host: Receiver<Vec<Value>>,
}

impl Os {
    pub(crate) fn new(
        services: OsServices,
        to_host: Sender<GuestMessage>,
        from_host: Receiver<Vec<Value>>,
    ) -> Self {
        Self {
            services,
            to_host,
            from_host,
        }
    }

    /// Waits for the next event satisfying `filter` and returns its arguments,
    /// starting with the kind name. `terminate` is returned like any other event.
    ///
    /// Fails only if the host has stopped.
    pub fn pull_event_raw(&mut self, filter: Option<&str>) -> Result<Vec<Value>, String> {
        self.to_host
            .blocking_send(GuestMessage::Yield(filter.map(str::to_owned)))
            .map_err(|_| HOST_GONE.to_owned())?;

        self.from_host
            .blocking_recv()
            .ok_or_else(|| HOST_GONE.to_owned())
    }

    /// Same as [`Os::pull_event_raw`], but a delivered `terminate` fails with `"Terminated"`.
    pub fn pull_event(&mut self, filter: Option<&str>) -> Result<Vec<Value>, String> {
        let args = self.pull_event_raw(filter)?;
        if args.first().and_then(Value::as_str) == Some(EventKind::Terminate.name()) {
            return Err("Terminated".to_owned());
        }
        Ok(args)
    }

    /// Powers the computer off. Never returns `Ok`: once the host has stopped the program,
    /// the error tells it to unwind.
    pub fn shutdown(&mut self) -> Result<(), String> {
        self.request_power(false)
    }

    /// Restarts the computer. Like [`Os::shutdown`], returns only an error to unwind with.
    pub fn reboot(&mut self) -> Result<(), String> {
        self.request_power(true)
    }

    fn request_power(&mut self, reboot: bool) -> Result<(), String> {
        self.to_host
            .blocking_send(GuestMessage::Power { reboot })
            .map_err(|_| HOST_GONE.to_owned())?;

        // Nothing is sent back: the host closes the channel.
        while self.from_host.blocking_recv().is_some() {}
        Err(HOST_GONE.to_owned())
    }

    /// Starts timer firing `timer` with the returned id after `seconds`.
    pub fn start_timer(&self, seconds: f64) -> Option<u32> {
        self.services.timers().start_timer(seconds)
    }

    /// Cancels timer `id`. Unknown or fired ids are ignored.
    pub fn cancel_timer(&self, id: u32) {
        self.services.timers().cancel(id);
    }

    /// Sets alarm firing `alarm` at the next local time of day `hour`.
    pub fn set_alarm(&self, hour: f64) -> Option<u32> {
        self.services.timers().set_alarm(hour)
    }

    /// Cancels alarm `id`. Unknown or fired ids are ignored.
    pub fn cancel_alarm(&self, id: u32) {
        self.services.timers().cancel(id);
    }

    /// Suspends the program for `seconds`.
    ///
    /// Timer events for other ids arriving meanwhile are consumed; any other events stay
    /// pending for later waits.
    pub fn sleep(&mut self, seconds: f64) -> Result<(), String> {
        let id = self
            .start_timer(seconds)
            .ok_or_else(|| format!("Invalid sleep duration {}", seconds))?;

        loop {
            let args = self.pull_event(Some(EventKind::Timer.name()))?;
            if args.get(1).and_then(Value::as_integer) == Some(i64::from(id)) {
                return Ok(());
            }
        }
    }

    /// Queues custom event `name` with `args`. Returns `false` if it was dropped.
    pub fn queue_event(&self, name: &str, args: Vec<Value>) -> bool {
        self.services.queue_event(name, args)
    }

    /// Seconds since the machine started.
    pub fn clock(&self) -> f64 {
        self.services.clock()
    }

    /// Time of day in hours on the `locale` clock.
    pub fn time(&self, locale: Locale) -> f64 {
        clock::time(locale)
    }

    /// Milliseconds since the epoch of the `locale` clock.
    pub fn epoch(&self, locale: Locale) -> i64 {
        clock::epoch(locale)
    }

    /// Day number on the `locale` clock.
    pub fn day(&self, locale: Locale) -> i64 {
        clock::day(locale)
    }

    #[allow(missing_docs)]
    pub fn computer_id(&self) -> u32 {
        self.services.computer_id()
    }

    #[allow(missing_docs)]
    pub fn computer_label(&self) -> Option<String> {
        self.services.computer_label()
    }

    /// Sets or clears the computer label.
    pub fn set_computer_label(&self, label: Option<&str>) {
        self.services.set_computer_label(label)
    }

    /// Services shared with the rest of the machine.
    pub fn services(&self) -> &OsServices {
        &self.services
    }

    pub(crate) fn finish(self, result: Result<(), String>) {
        // Host may already be gone, nobody is left to tell then.
        let _ = self.to_host.blocking_send(GuestMessage::Finished(result));
    }
}
