use std::{thread, time::Duration};

use chrono::{NaiveDate, NaiveTime};
use tokio::runtime::Runtime;

use crate::{
    event::{Event, Value},
    queue::EventQueue,
};

use super::{clock, Locale, OsServices, TimerService};

fn timer_id(event: Option<Event>) -> u32 {
    match event {
        Some(Event::Timer { id }) => id,
        other => panic!("Expected timer event, got {:?}", other),
    }
}

#[test]
fn locale_parsing() {
    assert_eq!("ingame".parse::<Locale>(), Ok(Locale::Ingame));
    assert_eq!("utc".parse::<Locale>(), Ok(Locale::Utc));
    assert_eq!("local".parse::<Locale>(), Ok(Locale::Local));
    assert!("UTC".parse::<Locale>().is_err());
    assert_eq!(Locale::default(), Locale::Ingame);
}

#[test]
fn clock_arithmetic() {
    let half_past_six = NaiveTime::from_hms_opt(6, 30, 0).expect("Invalid time");
    assert_eq!(clock::hours(&half_past_six), 6.5);

    assert_eq!(
        clock::until_time_of_day(7.0, &half_past_six),
        Duration::from_secs(30 * 60)
    );
    assert_eq!(
        clock::until_time_of_day(6.0, &half_past_six),
        Duration::from_secs(23 * 3600 + 30 * 60)
    );
    assert_eq!(
        clock::until_time_of_day(6.5, &half_past_six),
        Duration::from_secs(24 * 3600)
    );

    let second_day = NaiveDate::from_ymd_opt(2024, 1, 2)
        .expect("Invalid date")
        .and_hms_opt(1, 0, 0)
        .expect("Invalid time");
    assert_eq!(clock::ingame_millis(&second_day), 86_400_000 + 3_600_000);

    let epoch_next_day = NaiveDate::from_ymd_opt(1970, 1, 2)
        .expect("Invalid date")
        .and_hms_opt(0, 0, 0)
        .expect("Invalid time");
    assert_eq!(clock::local_millis(&epoch_next_day), 86_400_000);

    let now = clock::time(Locale::Utc);
    assert!((0.0..24.0).contains(&now));
    assert!(clock::day(Locale::Ingame) < 366);
    assert!(clock::epoch(Locale::Utc) > 0);
}

#[test]
fn timers_fire_into_queue() {
    let runtime = Runtime::new().expect("Can not create tokio runtime");
    let mut queue = EventQueue::new(16);
    let timers = TimerService::new(runtime.handle().clone(), queue.sender());

    let delayed = timers.start_timer(0.05).expect("Timer rejected");
    let immediate = timers.start_timer(0.0).expect("Timer rejected");
    assert_ne!(delayed, immediate);

    // Zero delay does not create a task.
    assert_eq!(timers.pending_count(), 1);
    assert_eq!(timer_id(queue.try_dequeue()), immediate);

    assert_eq!(timer_id(Some(queue.dequeue_blocking())), delayed);
    assert_eq!(timers.pending_count(), 0);
}

#[test]
fn cancelled_timer_never_fires() {
    let runtime = Runtime::new().expect("Can not create tokio runtime");
    let mut queue = EventQueue::new(16);
    let timers = TimerService::new(runtime.handle().clone(), queue.sender());

    let id = timers.start_timer(0.05).expect("Timer rejected");
    assert!(timers.cancel(id));
    assert!(!timers.cancel(id));
    assert!(!timers.cancel(12345));

    thread::sleep(Duration::from_millis(150));
    assert!(queue.try_dequeue().is_none());

    for _ in 0..3 {
        timers.start_timer(10.0).expect("Timer rejected");
    }
    assert_eq!(timers.cancel_all(), 3);
    assert_eq!(timers.pending_count(), 0);
}

#[test]
fn invalid_delays_rejected() {
    let runtime = Runtime::new().expect("Can not create tokio runtime");
    let queue = EventQueue::new(16);
    let timers = TimerService::new(runtime.handle().clone(), queue.sender());

    assert_eq!(timers.start_timer(-1.0), None);
    assert_eq!(timers.start_timer(f64::NAN), None);
    assert_eq!(timers.start_timer(f64::INFINITY), None);
    assert_eq!(timers.start_timer(1e20), None);
    assert_eq!(timers.pending_count(), 0);
    assert_eq!(timers.set_alarm(24.0), None);
    assert_eq!(timers.set_alarm(-0.5), None);
    assert!(queue.is_empty());
}

#[test]
fn timers_and_alarms_share_ids() {
    let runtime = Runtime::new().expect("Can not create tokio runtime");
    let queue = EventQueue::new(16);
    let timers = TimerService::new(runtime.handle().clone(), queue.sender());

    let first = timers.start_timer(10.0).expect("Timer rejected");
    let alarm = timers.set_alarm(12.0).expect("Alarm rejected");
    let second = timers.start_timer(10.0).expect("Timer rejected");

    assert_eq!(alarm, first + 1);
    assert_eq!(second, alarm + 1);
    assert_eq!(timers.pending_count(), 3);

    assert!(timers.cancel(alarm));
    assert_eq!(timers.cancel_all(), 2);
}

#[test]
fn services_queue_custom_events_and_keep_label() {
    let runtime = Runtime::new().expect("Can not create tokio runtime");
    let mut queue = EventQueue::new(16);
    let timers = TimerService::new(runtime.handle().clone(), queue.sender());
    let services = OsServices::new(queue.sender(), timers, 7, Some("turtle".to_owned()));

    assert!(services.queue_event("ready", vec![Value::Integer(1)]));
    assert_eq!(
        queue.dequeue_blocking().into_args(),
        vec![Value::from("ready"), Value::Integer(1)]
    );

    assert_eq!(services.computer_id(), 7);
    assert_eq!(services.computer_label(), Some("turtle".to_owned()));

    let shared = services.clone();
    shared.set_computer_label(Some("miner"));
    assert_eq!(services.computer_label(), Some("miner".to_owned()));
    services.set_computer_label(None);
    assert_eq!(shared.computer_label(), None);

    assert!(services.clock() >= 0.0);
}
