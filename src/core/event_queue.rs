//=========================================================================
// Event Queue
//=========================================================================
//
// Host → core event transport with batch-atomic pushes and snapshot drains.
//
// Architecture:
// ```text
//   EventSender (any thread) ──Vec<AppEvent>──► crossbeam channel
//   EventQueue::push_*  ───────┘                      │
//                                                     ▼
//                          EventQueue::drain() (frame-tick thread)
// ```
//
// Each push sends one batch, so a batch is either entirely visible to a
// drain or not at all. `drain()` takes exactly the batches present when it
// is called; anything pushed concurrently waits for the next drain.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::warn;

//=== Internal Dependencies ===============================================

use super::assets::AssetEvent;
use super::input::binding::{ActionId, AxisId};
use super::input::event::{ButtonState, RawInputEvent};

const BACKLOG_WARN_THRESHOLD: usize = 4096;

//=== AppEvent ============================================================

/// Entry of the event queue.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Input(RawInputEvent),
    Asset(AssetEvent),
}

impl From<RawInputEvent> for AppEvent {
    fn from(event: RawInputEvent) -> Self {
        Self::Input(event)
    }
}

impl From<AssetEvent> for AppEvent {
    fn from(event: AssetEvent) -> Self {
        Self::Asset(event)
    }
}

//=== EventSender =========================================================

/// Cloneable producer handle for pushing from other threads.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<Vec<AppEvent>>,
    pending: Arc<AtomicUsize>,
}

impl EventSender {
    /// Pushes `events` as one batch. Empty batches are ignored.
    pub fn push_batch(&self, events: Vec<AppEvent>) {
        if events.is_empty() {
            return;
        }
        let count = events.len();
        self.pending.fetch_add(count, Ordering::AcqRel);

        if self.sender.send(events).is_err() {
            self.pending.fetch_sub(count, Ordering::AcqRel);
            warn!(target: "core", "Event queue dropped: discarded {} events", count);
        }
    }

    pub fn push(&self, event: impl Into<AppEvent>) {
        self.push_batch(vec![event.into()]);
    }

    pub fn push_action(&self, id: ActionId, state: ButtonState) {
        self.push(RawInputEvent::action(id, state));
    }

    pub fn push_action_named(&self, name: impl Into<String>, state: ButtonState) {
        self.push(RawInputEvent::action_named(name, state));
    }

    pub fn push_axis(&self, id: AxisId, value: f32) {
        self.push(RawInputEvent::axis(id, value));
    }

    pub fn push_axis_named(&self, name: impl Into<String>, value: f32) {
        self.push(RawInputEvent::axis_named(name, value));
    }

    pub fn push_cursor_move(&self, dx: f32, dy: f32) {
        self.push(RawInputEvent::cursor_move(dx, dy));
    }

    pub fn push_cursor_position(&self, x: f32, y: f32, viewport_width: u32, viewport_height: u32) {
        self.push(RawInputEvent::cursor_position(x, y, viewport_width, viewport_height));
    }

    pub fn push_close_requested(&self) {
        self.push(RawInputEvent::CloseRequested);
    }
}

//=== EventQueue ==========================================================

/// Ordered, never-blocking queue drained once per frame.
pub struct EventQueue {
    producer: EventSender,
    receiver: Receiver<Vec<AppEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            producer: EventSender {
                sender,
                pending: Arc::new(AtomicUsize::new(0)),
            },
            receiver,
        }
    }

    /// Returns a producer handle feeding this queue.
    pub fn sender(&self) -> EventSender {
        self.producer.clone()
    }

    //--- Push -------------------------------------------------------------

    pub fn push_batch(&self, events: Vec<AppEvent>) {
        self.producer.push_batch(events);
    }

    pub fn push(&self, event: impl Into<AppEvent>) {
        self.producer.push(event);
    }

    pub fn push_action(&self, id: ActionId, state: ButtonState) {
        self.producer.push_action(id, state);
    }

    pub fn push_action_named(&self, name: impl Into<String>, state: ButtonState) {
        self.producer.push_action_named(name, state);
    }

    pub fn push_axis(&self, id: AxisId, value: f32) {
        self.producer.push_axis(id, value);
    }

    pub fn push_axis_named(&self, name: impl Into<String>, value: f32) {
        self.producer.push_axis_named(name, value);
    }

    pub fn push_cursor_move(&self, dx: f32, dy: f32) {
        self.producer.push_cursor_move(dx, dy);
    }

    pub fn push_cursor_position(&self, x: f32, y: f32, viewport_width: u32, viewport_height: u32) {
        self.producer.push_cursor_position(x, y, viewport_width, viewport_height);
    }

    pub fn push_close_requested(&self) {
        self.producer.push_close_requested();
    }

    //--- Drain ------------------------------------------------------------

    /// Takes every event pushed before this call, in push order.
    pub fn drain(&self) -> Vec<AppEvent> {
        let batches = self.receiver.len();
        let mut events = Vec::new();

        for _ in 0..batches {
            match self.receiver.try_recv() {
                Ok(batch) => events.extend(batch),
                Err(_) => break,
            }
        }

        self.producer.pending.fetch_sub(events.len(), Ordering::AcqRel);

        if events.len() >= BACKLOG_WARN_THRESHOLD {
            warn!(target: "core", "Event queue backlog: drained {} events this frame", events.len());
        }

        events
    }

    /// Number of events waiting to be drained.
    pub fn len(&self) -> usize {
        self.producer.pending.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drain_returns_all_pushes_in_order_exactly_once() {
        let queue = EventQueue::new();

        queue.push_action_named("jump", ButtonState::Pressed);
        queue.push_axis(AxisId::from_name("move_x"), 0.5);
        queue.push_cursor_move(1.0, 2.0);
        queue.push_close_requested();
        assert_eq!(queue.len(), 4);

        let events = queue.drain();

        assert_eq!(
            events,
            vec![
                AppEvent::Input(RawInputEvent::action_named("jump", ButtonState::Pressed)),
                AppEvent::Input(RawInputEvent::axis(AxisId::from_name("move_x"), 0.5)),
                AppEvent::Input(RawInputEvent::cursor_move(1.0, 2.0)),
                AppEvent::Input(RawInputEvent::CloseRequested),
            ]
        );
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn batches_are_delivered_whole() {
        let queue = EventQueue::new();

        queue.push_batch(vec![
            RawInputEvent::cursor_move(1.0, 0.0).into(),
            RawInputEvent::cursor_move(2.0, 0.0).into(),
        ]);
        queue.push_batch(Vec::new());

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain().len(), 2);
    }

    #[test]
    fn sender_feeds_the_same_queue() {
        let queue = EventQueue::new();
        let sender = queue.sender();

        sender.push_action(ActionId::from_name("fire"), ButtonState::Released);

        assert_eq!(
            queue.drain(),
            vec![AppEvent::Input(RawInputEvent::action(ActionId::from_name("fire"), ButtonState::Released))]
        );
    }

    #[test]
    fn concurrent_producers_lose_nothing_and_keep_per_thread_order() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 1000;

        let queue = EventQueue::new();

        let producers: Vec<_> = (0..THREADS)
            .map(|t| {
                let sender = queue.sender();
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        sender.push_cursor_move(t as f32, i as f32);
                    }
                })
            })
            .collect();

        let mut received = Vec::new();
        while received.len() < THREADS * PER_THREAD {
            received.extend(queue.drain());
            thread::yield_now();
        }
        for producer in producers {
            producer.join().unwrap();
        }
        received.extend(queue.drain());

        assert_eq!(received.len(), THREADS * PER_THREAD);

        let mut last = vec![-1.0f32; THREADS];
        for event in received {
            let AppEvent::Input(RawInputEvent::CursorMove { delta: (t, i) }) = event else {
                panic!("unexpected event");
            };
            assert!(i > last[t as usize], "per-producer order broken");
            last[t as usize] = i;
        }
        assert!(queue.is_empty());
    }
}
