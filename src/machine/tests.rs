use std::{env, fs, process};

use async_trait::async_trait;

use crate::{
    drivers::Driver,
    event::{Event, Value},
    host::{Os, Program},
    queue::EventSender,
    scheduler::{Halt, HaltDisplay},
};

use super::{ConsoleHaltDisplay, Machine, MachineConfig};

#[test]
fn config_validation() {
    assert!(MachineConfig::new(0, 1).is_err());
    assert!(MachineConfig::new(16, 0).is_err());

    let config = MachineConfig::new(16, 2).expect("Valid config rejected");
    assert_eq!(config.event_queue_capacity(), 16);
    assert_eq!(config.worker_threads(), 2);
    assert_eq!(config.computer_id(), 0);
    assert_eq!(config.label(), None);

    let default = MachineConfig::default();
    assert_eq!(default.event_queue_capacity(), 256);
    assert_eq!(default.worker_threads(), 1);
}

#[test]
fn config_from_json() {
    let config = MachineConfig::from_json(r#"{ "computer_id": 5, "label": "miner" }"#)
        .expect("Valid config rejected");
    assert_eq!(
        config,
        MachineConfig::default()
            .with_computer_id(5)
            .with_label("miner")
    );

    assert!(MachineConfig::from_json(r#"{ "event_queue_capacity": 0 }"#).is_err());
    assert!(MachineConfig::from_json("[1, 2]").is_err());
}

#[test]
fn config_from_file() {
    let path = env::temp_dir().join(format!("craftos-config-{}.json", process::id()));
    fs::write(&path, r#"{ "event_queue_capacity": 32, "worker_threads": 2 }"#)
        .expect("Can not write config");

    let config = MachineConfig::from_file(&path);
    fs::remove_file(&path).expect("Can not remove config");

    let config = config.expect("Valid config rejected");
    assert_eq!(config.event_queue_capacity(), 32);
    assert_eq!(config.worker_threads(), 2);

    assert!(MachineConfig::from_file(env::temp_dir().join("craftos-missing.json")).is_err());
}

#[test]
fn halt_screen_written_to_display() {
    let mut display = ConsoleHaltDisplay::new(Vec::new());
    display.show_halt(&Halt::Errored("boom".to_owned()));

    let text = String::from_utf8(display.into_inner()).expect("Display wrote invalid text");
    assert_eq!(
        text,
        "Error running computer\nboom\nComputerCraft may be installed incorrectly\n"
    );
}

#[test]
fn run_requires_program() {
    let machine = Machine::new(MachineConfig::default()).expect("Can not create machine");
    let mut display = ConsoleHaltDisplay::new(Vec::new());
    assert!(machine.run(&mut display).is_err());
}

#[test]
fn program_loaded_once() {
    let mut machine = Machine::new(MachineConfig::default()).expect("Can not create machine");
    machine
        .load(|_: &mut Os| -> Result<(), String> { Ok(()) })
        .expect("First program rejected");
    assert!(machine
        .load(|_: &mut Os| -> Result<(), String> { Ok(()) })
        .is_err());
}

struct Doorbell {
    rings: u32,
}

#[async_trait]
impl Driver for Doorbell {
    fn name(&self) -> &'static str {
        "doorbell"
    }

    async fn run(&mut self, events: EventSender) {
        for ring in 0..self.rings {
            events.enqueue(Event::Custom {
                name: "doorbell".to_owned(),
                args: vec![Value::from(ring)],
            });
        }
    }
}

#[derive(Default)]
struct Porter {
    rings: Vec<Value>,
    label: Option<String>,
    computer_id: u32,
}

impl Program for Porter {
    fn run(&mut self, os: &mut Os) -> Result<(), String> {
        self.label = os.computer_label();
        self.computer_id = os.computer_id();
        while self.rings.len() < 3 {
            let args = os.pull_event(Some("doorbell"))?;
            self.rings.push(args[1].clone());
        }
        Ok(())
    }
}

#[test]
fn drivers_feed_program() {
    let config = MachineConfig::default()
        .with_computer_id(9)
        .with_label("lobby");
    let mut machine = Machine::new(config).expect("Can not create machine");
    machine.add_driver(Doorbell { rings: 3 });
    let porter = machine.load(Porter::default()).expect("Program rejected");

    let mut display = ConsoleHaltDisplay::new(Vec::new());
    let halt = machine.run(&mut display).expect("Machine did not run");

    assert_eq!(halt, Halt::Completed);
    let porter = porter.read();
    assert_eq!(
        porter.rings,
        vec![Value::Integer(0), Value::Integer(1), Value::Integer(2)]
    );
    assert_eq!(porter.label, Some("lobby".to_owned()));
    assert_eq!(porter.computer_id, 9);
}

#[test]
fn timers_cancelled_on_halt() {
    let mut machine = Machine::new(MachineConfig::default()).expect("Can not create machine");
    let timers = machine.services();
    machine
        .load(|os: &mut Os| -> Result<(), String> {
            os.start_timer(60.0).ok_or("Timer rejected")?;
            os.set_alarm(12.0).ok_or("Alarm rejected")?;
            Ok(())
        })
        .expect("Program rejected");

    let mut display = ConsoleHaltDisplay::new(Vec::new());
    assert_eq!(
        machine.run(&mut display).expect("Machine did not run"),
        Halt::Completed
    );
    assert_eq!(timers.timers().pending_count(), 0);
}

#[test]
fn label_changes_last_one_session() {
    let config = MachineConfig::default().with_label("base");

    let mut first = Machine::new(config.clone()).expect("Can not create machine");
    first
        .load(|os: &mut Os| -> Result<(), String> {
            os.set_computer_label(Some("renamed"));
            Ok(())
        })
        .expect("Program rejected");
    let mut display = ConsoleHaltDisplay::new(Vec::new());
    assert_eq!(
        first.run(&mut display).expect("Machine did not run"),
        Halt::Completed
    );

    let second = Machine::new(config).expect("Can not create machine");
    assert_eq!(second.services().computer_label(), Some("base".to_owned()));
}
