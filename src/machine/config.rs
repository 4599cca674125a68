//! Definition of [`MachineConfig`].

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::queue::EventQueue;

/// Represents configuration of [`Machine`][`super::Machine`].
///
/// Can be read from JSON, where every field is optional:
///
/// ```json
/// { "event_queue_capacity": 256, "worker_threads": 1, "computer_id": 3, "label": "miner" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Max number of events waiting in the queue. Newer events are dropped when it is full.
    event_queue_capacity: usize,

    /// Number of runtime threads running drivers and timers.
    worker_threads: usize,

    /// Id of the computer reported to the guest.
    computer_id: u32,

    /// Initial label of the computer.
    label: Option<String>,
}

impl MachineConfig {
    /// Default capacity of the event queue.
    pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = EventQueue::DEFAULT_CAPACITY;

    /// Default number of runtime threads.
    pub const DEFAULT_WORKER_THREADS: usize = 1;

    /// Creates new instance of [`MachineConfig`].
    ///
    /// * `event_queue_capacity` - Max number of pending events. Must be greater than zero.
    /// * `worker_threads` - Number of runtime threads. Must be greater than zero.
    pub fn new(event_queue_capacity: usize, worker_threads: usize) -> Result<Self, String> {
        let config = Self {
            event_queue_capacity,
            worker_threads,
            computer_id: 0,
            label: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from JSON file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Can not read config '{}': {}", path.display(), e))?;
        Self::from_json(&text)
    }

    /// Parses configuration from JSON `text`.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| format!("Invalid config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values are usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.event_queue_capacity == 0 {
            Err("Event queue capacity can not be 0".to_owned())
        } else if self.worker_threads == 0 {
            Err("Worker threads can not be 0".to_owned())
        } else {
            Ok(())
        }
    }

    /// Sets id of the computer.
    pub fn with_computer_id(mut self, computer_id: u32) -> Self {
        self.computer_id = computer_id;
        self
    }

    /// Sets initial label of the computer.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[allow(missing_docs)]
    pub fn event_queue_capacity(&self) -> usize {
        self.event_queue_capacity
    }

    #[allow(missing_docs)]
    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    #[allow(missing_docs)]
    pub fn computer_id(&self) -> u32 {
        self.computer_id
    }

    #[allow(missing_docs)]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: Self::DEFAULT_EVENT_QUEUE_CAPACITY,
            worker_threads: Self::DEFAULT_WORKER_THREADS,
            computer_id: 0,
            label: None,
        }
    }
}
