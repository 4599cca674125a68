//! Bundled guest programs.


use log::info;

use crate::{
    drivers::ENTER,
    event::{EventKind, Value},
    host::{Os, Program},
};

/// Echoes typed lines back until `exit` is typed.
#[derive(Default)]
pub struct Echo {
    /// Lines typed so far, without the final `exit`.
    pub lines: Vec<String>,
    print: bool,
}

impl Echo {
    /// Echo printing every line to the standard output.
    pub fn printing() -> Self {
        Self {
            lines: Vec::new(),
            print: true,
        }
    }

    fn end_line(&mut self, line: String) {
        if self.print {
            println!("{}", line);
        }
        self.lines.push(line);
    }
}

impl Program for Echo {
    fn run(&mut self, os: &mut Os) -> Result<(), String> {
        let mut line = String::new();

        loop {
            let args = os.pull_event(None)?;
            let kind = args
                .first()
                .and_then(Value::as_str)
                .and_then(EventKind::from_name);

            match kind {
                Some(EventKind::Char) | Some(EventKind::Paste) => {
                    if let Some(text) = args.get(1).and_then(Value::as_str) {
                        line.push_str(text);
                    }
                }
                Some(EventKind::Key)
                    if args.get(1).and_then(Value::as_integer) == Some(ENTER.into()) =>
                {
                    if line == "exit" {
                        return Ok(());
                    }
                    self.end_line(std::mem::take(&mut line));
                }
                _ => {}
            }
        }
    }
}

/// Counts down with timers and returns.
pub struct Countdown {
    /// Number of ticks to wait for.
    pub ticks: u32,
    /// Seconds between ticks.
    pub interval: f64,
    /// Ticks fired so far.
    pub fired: u32,
}

impl Countdown {
    #[allow(missing_docs)]
    pub fn new(ticks: u32, interval: f64) -> Self {
        Self {
            ticks,
            interval,
            fired: 0,
        }
    }
}

impl Program for Countdown {
    fn run(&mut self, os: &mut Os) -> Result<(), String> {
        while self.fired < self.ticks {
            let id = os
                .start_timer(self.interval)
                .ok_or_else(|| format!("Invalid interval {}", self.interval))?;

            loop {
                let args = os.pull_event(Some(EventKind::Timer.name()))?;
                if args.get(1).and_then(Value::as_integer) == Some(id.into()) {
                    break;
                }
            }

            self.fired += 1;
            info!("{} ticks left", self.ticks - self.fired);
        }

        Ok(())
    }
}

/// Records the name of every event until `terminate` arrives.
#[derive(Default)]
pub struct EventLog {
    /// Event names in delivery order, including the final `terminate`.
    pub names: Vec<String>,
}

impl Program for EventLog {
    fn run(&mut self, os: &mut Os) -> Result<(), String> {
        loop {
            let args = os.pull_event_raw(None)?;
            let name = args
                .first()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            info!("Event '{}' with {} arguments", name, args.len() - 1);

            let terminated = name == EventKind::Terminate.name();
            self.names.push(name);
            if terminated {
                return Ok(());
            }
        }
    }
}
