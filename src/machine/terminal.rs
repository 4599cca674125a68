//! Definition of [`ConsoleHaltDisplay`].

use std::io::{self, Stdout, Write};

use log::warn;

use crate::scheduler::{Halt, HaltDisplay};

/// Writes the halt screen as plain lines.
pub struct ConsoleHaltDisplay<W: Write> {
    out: W,
}

impl ConsoleHaltDisplay<Stdout> {
    /// Display printing to the standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleHaltDisplay<W> {
    /// Display writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> HaltDisplay for ConsoleHaltDisplay<W> {
    fn show_halt(&mut self, halt: &Halt) {
        let written = halt
            .screen()
            .iter()
            .try_for_each(|line| writeln!(self.out, "{}", line))
            .and_then(|()| self.out.flush());

        if let Err(err) = written {
            warn!("Can not show halt screen: {}", err);
        }
    }
}
