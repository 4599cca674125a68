use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use crate::event::{Deferred, Event, Value};

use super::EventQueue;

fn timer_id(event: Event) -> u32 {
    match event {
        Event::Timer { id } => id,
        other => panic!("Expected timer event, got {:?}", other),
    }
}

#[test]
fn fifo_across_entry_points() {
    let mut queue = EventQueue::new(16);
    let sender = queue.sender();

    for id in 0..10 {
        let event = Event::Timer { id };
        if id % 2 == 0 {
            assert!(sender.enqueue(event));
        } else {
            // Nobody waits yet, so there is no one to switch to.
            assert!(!sender.enqueue_from_interrupt(event));
        }
    }

    assert_eq!(queue.len(), 10);

    let order = (0..10)
        .map(|_| timer_id(queue.dequeue_blocking()))
        .collect::<Vec<_>>();
    assert_eq!(order, (0..10).collect::<Vec<_>>());
    assert!(queue.is_empty());
}

#[test]
fn full_queue_drops_newest() {
    let mut queue = EventQueue::new(EventQueue::DEFAULT_CAPACITY);

    for id in 0..EventQueue::DEFAULT_CAPACITY as u32 {
        assert!(queue.enqueue(Event::Timer { id }));
    }
    assert!(!queue.enqueue(Event::Timer { id: 9999 }));
    assert!(!queue.enqueue_from_interrupt(Event::Timer { id: 9999 }));

    assert_eq!(queue.len(), EventQueue::DEFAULT_CAPACITY);

    let mut received = 0;
    while let Some(event) = queue.try_dequeue() {
        assert_ne!(timer_id(event), 9999);
        received += 1;
    }
    assert_eq!(received, EventQueue::DEFAULT_CAPACITY);
}

#[test]
fn dropped_event_releases_payload() {
    let released = Arc::new(AtomicUsize::new(0));

    struct Guard(Arc<AtomicUsize>);
    impl Drop for Guard {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let queue = EventQueue::new(1);
    assert!(queue.enqueue(Event::Redstone));

    let guard = Guard(released.clone());
    let accepted = queue.enqueue(Event::WebsocketMessage {
        url: "ws://example.com".to_owned(),
        payload: Deferred::new(move |args: &mut Vec<Value>| {
            let _keep = &guard;
            args.push(Value::Nil);
        }),
    });

    assert!(!accepted);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn reset_discards_everything() {
    let mut queue = EventQueue::new(8);
    queue.enqueue(Event::Disk);
    queue.enqueue(Event::DiskEject);
    queue.enqueue(Event::Redstone);

    assert_eq!(queue.reset(), 3);
    assert!(queue.is_empty());
    assert!(queue.try_dequeue().is_none());

    // Queue stays usable after reset.
    queue.enqueue(Event::Terminate);
    assert!(matches!(queue.dequeue_blocking(), Event::Terminate));
}

#[test]
fn blocking_dequeue_waits_for_producer() {
    let mut queue = EventQueue::new(4);
    let sender = queue.sender();

    let consumer = thread::spawn(move || {
        let event = queue.dequeue_blocking();
        (timer_id(event), queue)
    });

    // Wait until the consumer is parked inside the dequeue.
    while !sender.is_consumer_parked() {
        thread::sleep(Duration::from_millis(1));
    }

    assert!(sender.enqueue_from_interrupt(Event::Timer { id: 42 }));

    let (id, queue) = consumer.join().expect("Consumer thread panicked");
    assert_eq!(id, 42);
    assert!(!queue.sender().is_consumer_parked());
}

#[test]
fn producers_on_many_threads() {
    let mut queue = EventQueue::new(1024);

    let producers = (0..4u32)
        .map(|producer| {
            let sender = queue.sender();
            thread::spawn(move || {
                for i in 0..100 {
                    assert!(sender.enqueue(Event::Timer {
                        id: producer * 1000 + i,
                    }));
                }
            })
        })
        .collect::<Vec<_>>();

    for producer in producers {
        producer.join().expect("Producer thread panicked");
    }

    let mut last_seen = [None::<u32>; 4];
    for _ in 0..400 {
        let id = timer_id(queue.dequeue_blocking());
        let producer = (id / 1000) as usize;
        // Events of one producer keep their order.
        if let Some(last) = last_seen[producer] {
            assert!(id > last);
        }
        last_seen[producer] = Some(id);
    }
    assert!(queue.is_empty());
}
