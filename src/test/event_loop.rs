use crate::dispatch::{Event, EventLoop, EventTime, World};
use std::any::Any;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CountingWorld {
    ticks: usize,
}

impl World for CountingWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, _ev_loop: &mut EventLoop) {
        self.ticks = self.ticks.saturating_add(1);
    }
}

struct Record {
    id: u32,
    log: Arc<Mutex<Vec<u32>>>,
}

impl Event for Record {
    fn execute(self: Box<Self>, _ev_loop: &mut EventLoop, _world: &mut dyn World) {
        let Record { id, log } = *self;
        log.lock().expect("log lock").push(id);
    }
}

struct RecordThenFollowUp {
    id: u32,
    follow_up: u32,
    log: Arc<Mutex<Vec<u32>>>,
}

impl Event for RecordThenFollowUp {
    fn execute(self: Box<Self>, ev_loop: &mut EventLoop, _world: &mut dyn World) {
        let RecordThenFollowUp { id, follow_up, log } = *self;
        log.lock().expect("log lock").push(id);
        ev_loop.schedule(ev_loop.now(), Record { id: follow_up, log });
    }
}

fn record(id: u32, log: &Arc<Mutex<Vec<u32>>>) -> Record {
    Record {
        id,
        log: Arc::clone(log),
    }
}

#[test]
fn events_run_in_time_order_then_delivery_order() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut ev_loop = EventLoop::default();
    ev_loop.schedule(EventTime(10), record(1, &log));
    ev_loop.schedule(EventTime(5), record(2, &log));
    ev_loop.schedule(EventTime(10), record(3, &log));
    assert_eq!(ev_loop.pending(), 3);

    let mut world = CountingWorld::default();
    let executed = ev_loop.run(&mut world);

    assert_eq!(executed, 3);
    assert_eq!(&*log.lock().expect("log lock"), &[2, 1, 3]);
    assert_eq!(world.ticks, 3);
    assert_eq!(ev_loop.now(), EventTime(10));
}

#[test]
fn event_delivered_from_inside_a_handler_runs_after_it() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut ev_loop = EventLoop::default();
    ev_loop.schedule(
        EventTime::ZERO,
        RecordThenFollowUp {
            id: 1,
            follow_up: 2,
            log: Arc::clone(&log),
        },
    );
    ev_loop.schedule(EventTime::ZERO, record(3, &log));

    let mut world = CountingWorld::default();
    ev_loop.run(&mut world);

    // The follow-up is queued behind the already pending event at the same time.
    assert_eq!(&*log.lock().expect("log lock"), &[1, 3, 2]);
    assert_eq!(world.ticks, 3);
}

#[test]
fn run_until_stops_before_later_events_and_advances_time() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut ev_loop = EventLoop::default();
    ev_loop.schedule(EventTime::ZERO, record(1, &log));
    ev_loop.schedule(EventTime(5), record(2, &log));
    ev_loop.schedule(EventTime(10), record(3, &log));

    let mut world = CountingWorld::default();
    ev_loop.run_until(EventTime(5), &mut world);

    assert_eq!(&*log.lock().expect("log lock"), &[1, 2]);
    assert_eq!(ev_loop.now(), EventTime(5));
    assert_eq!(ev_loop.pending(), 1);

    ev_loop.run(&mut world);
    assert_eq!(&*log.lock().expect("log lock"), &[1, 2, 3]);
    assert_eq!(world.ticks, 3);
}

#[test]
fn run_until_on_empty_queue_only_moves_time() {
    let mut ev_loop = EventLoop::default();
    let mut world = CountingWorld::default();

    ev_loop.run_until(EventTime(7), &mut world);
    assert_eq!(ev_loop.now(), EventTime(7));
    assert_eq!(world.ticks, 0);
}

#[test]
fn event_time_unit_conversions_saturate() {
    assert_eq!(EventTime::from_micros(1), EventTime(1_000));
    assert_eq!(EventTime::from_millis(1), EventTime(1_000_000));
    assert_eq!(EventTime::from_millis(u64::MAX), EventTime(u64::MAX));
    assert_eq!(EventTime::from_micros(3).as_nanos(), 3_000);
}
