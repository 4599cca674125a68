//! Definition of [`EventQueue`] and [`EventSender`].
//!
//! The queue is the only state shared between producers (drivers, timer tasks,
//! interrupt-like callbacks) and the scheduler. It is a bounded
//! [multi-producer channel][`tokio::sync::mpsc::channel`]: producers never block,
//! and an event sent to a full queue is dropped.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::debug;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};

use crate::event::Event;

#[cfg(test)]
mod tests;

/// Producer end of the [`EventQueue`]. Cheap to clone and safe to move to any thread.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: Sender<Event>,
    /// Set while the consumer is blocked waiting for an event.
    consumer_parked: Arc<AtomicBool>,
}

impl EventSender {
    /// Enqueues `event` from task context without blocking.
    ///
    /// Returns `false` if the event was dropped because the queue is full.
    /// Callers are expected to ignore the loss.
    pub fn enqueue(&self, event: Event) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                debug!("Event queue is full, dropping '{}' event", event.name());
                false
            }
            // Receiver is gone, which means the machine has been shut down.
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Enqueues `event` from interrupt context without blocking, logging or waiting on a lock.
    ///
    /// Returns `true` if the consumer was parked waiting for an event and should be
    /// switched to as soon as possible. A dropped event never requests a switch.
    ///
    /// Not allocation-free: the channel may allocate a new internal block on send,
    /// so this is only safe from contexts which may allocate, such as timer tasks.
    pub fn enqueue_from_interrupt(&self, event: Event) -> bool {
        // Sampled before sending: once the event is in, the consumer may wake and clear the flag.
        let parked = self.consumer_parked.load(Ordering::Acquire);
        self.sender.try_send(event).is_ok() && parked
    }

    /// Checks if the consumer is currently blocked waiting for an event.
    pub fn is_consumer_parked(&self) -> bool {
        self.consumer_parked.load(Ordering::Acquire)
    }
}

/// Bounded FIFO of [events][`Event`] with a single consumer.
///
/// Constructed once per machine session and passed by reference: producers get
/// [`EventSender`] handles from [`EventQueue::sender`], the scheduler borrows the
/// queue mutably to dequeue.
pub struct EventQueue {
    sender: EventSender,
    receiver: Receiver<Event>,
    capacity: usize,
}

impl EventQueue {
    /// Capacity used by the firmware.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates queue holding at most `capacity` events.
    ///
    /// # Panics
    ///
    /// - If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Event queue capacity can not be 0");

        let (sender, receiver) = mpsc::channel(capacity);

        Self {
            sender: EventSender {
                sender,
                consumer_parked: Arc::new(AtomicBool::new(false)),
            },
            receiver,
            capacity,
        }
    }

    /// Returns a new producer handle.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// See [`EventSender::enqueue`].
    pub fn enqueue(&self, event: Event) -> bool {
        self.sender.enqueue(event)
    }

    /// See [`EventSender::enqueue_from_interrupt`].
    pub fn enqueue_from_interrupt(&self, event: Event) -> bool {
        self.sender.enqueue_from_interrupt(event)
    }

    /// Removes the oldest event, blocking the current thread until one is available.
    ///
    /// There is no timeout. Must not be called from inside an asynchronous runtime.
    pub fn dequeue_blocking(&mut self) -> Event {
        if let Some(event) = self.try_dequeue() {
            return event;
        }

        self.sender.consumer_parked.store(true, Ordering::Release);

        // The queue holds a sender itself, so the channel never closes while it is alive.
        let event = self
            .receiver
            .blocking_recv()
            .expect("Event queue closed while holding a sender");

        self.sender.consumer_parked.store(false, Ordering::Release);

        event
    }

    /// Removes the oldest event if there is one.
    pub fn try_dequeue(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Discards every queued event and returns how many were discarded.
    ///
    /// Deferred payloads of discarded events are released without being materialized.
    pub fn reset(&mut self) -> usize {
        let mut discarded = 0;
        while self.try_dequeue().is_some() {
            discarded += 1;
        }
        discarded
    }

    /// Returns the number of queued events.
    pub fn len(&self) -> usize {
        self.capacity - self.sender.sender.capacity()
    }

    /// Checks if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of queued events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
