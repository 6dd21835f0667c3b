//! Side-effect sinks for store events.
//!
//! The store does not care what a sink does with an event; a mobile shell
//! would vibrate and fire confetti, the CLI prints a banner, tests record.

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::Event;

/// Receives every event the store emits, after the state change is committed.
pub trait FeedbackSink {
    fn notify(&mut self, event: &Event);
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

impl FeedbackSink for NoopFeedback {
    fn notify(&mut self, _event: &Event) {}
}

impl<F> FeedbackSink for F
where
    F: FnMut(&Event),
{
    fn notify(&mut self, event: &Event) {
        self(event)
    }
}

/// Keeps a shared log of events; clones observe the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    events: Rc<RefCell<Vec<Event>>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn level_ups(&self) -> usize {
        self.events.borrow().iter().filter(|e| e.is_level_up()).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl FeedbackSink for RecordingFeedback {
    fn notify(&mut self, event: &Event) {
        self.events.borrow_mut().push(event.clone());
    }
}
