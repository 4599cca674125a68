//! Definition of [`TerminateSignal`].

use async_trait::async_trait;
use log::{info, warn};
use tokio::signal;

use crate::{event::Event, queue::EventSender};

use super::Driver;

/// Turns Ctrl-C into `terminate` events, so the guest can stop itself gracefully.
#[derive(Default)]
pub struct TerminateSignal {}

#[async_trait]
impl Driver for TerminateSignal {
    fn name(&self) -> &'static str {
        "signal"
    }

    async fn run(&mut self, events: EventSender) {
        loop {
            if let Err(err) = signal::ctrl_c().await {
                warn!("Can not listen for interrupt: {}", err);
                break;
            }

            info!("Interrupt received, terminating guest");
            events.enqueue(Event::Terminate);
        }
    }
}
