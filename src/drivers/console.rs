//! Definition of [`ConsoleKeyboard`].

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use crate::{event::Event, queue::EventSender};

use super::Driver;

/// Key code of Enter.
pub const ENTER: u8 = 28;

const PASTE_PREFIX: &str = "/paste ";
const TERMINATE_COMMAND: &str = "/terminate";

fn row_code(row: &str, first: u8, c: char) -> Option<u8> {
    row.chars()
        .position(|key| key == c)
        .and_then(|offset| u8::try_from(offset).ok())
        .map(|offset| first + offset)
}

/// Key code of the physical key typing `c`, if there is one.
pub fn key_code(c: char) -> Option<u8> {
    let c = c.to_ascii_lowercase();
    match c {
        '0' => Some(11),
        '1'..='9' => row_code("123456789", 2, c),
        '-' => Some(12),
        '=' => Some(13),
        ' ' => Some(57),
        _ => row_code("qwertyuiop", 16, c)
            .or_else(|| row_code("asdfghjkl", 30, c))
            .or_else(|| row_code("zxcvbnm", 44, c)),
    }
}

/// Events produced by typing `line` and pressing Enter.
///
/// `/paste TEXT` pastes `TEXT` in one event and `/terminate` holds Ctrl-T.
pub fn keystrokes(line: &str) -> Vec<Event> {
    if line.trim() == TERMINATE_COMMAND {
        return vec![Event::Terminate];
    }
    if let Some(text) = line.strip_prefix(PASTE_PREFIX) {
        return vec![Event::Paste(text.to_owned())];
    }

    let mut events = Vec::with_capacity(line.len() * 3 + 2);
    for c in line.chars() {
        let code = key_code(c);
        if let Some(code) = code {
            events.push(Event::Key {
                code,
                repeat: false,
            });
        }
        events.push(Event::Char(c));
        if let Some(code) = code {
            events.push(Event::KeyUp { code });
        }
    }
    events.push(Event::Key {
        code: ENTER,
        repeat: false,
    });
    events.push(Event::KeyUp { code: ENTER });
    events
}

/// Keyboard reading lines from the standard input.
#[derive(Default)]
pub struct ConsoleKeyboard {}

#[async_trait]
impl Driver for ConsoleKeyboard {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn run(&mut self, events: EventSender) {
        let mut lines = BufReader::new(io::stdin()).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let dropped = keystrokes(&line)
                        .into_iter()
                        .map(|event| events.enqueue(event))
                        .filter(|sent| !sent)
                        .count();
                    if dropped > 0 {
                        warn!("Dropped {} keystrokes, event queue is full", dropped);
                    }
                }
                Ok(None) => {
                    debug!("Console input closed");
                    break;
                }
                Err(err) => {
                    warn!("Can not read console input: {}", err);
                    break;
                }
            }
        }
    }
}
