use std::cell::RefCell;

use crate::engine::signal::{Pattern, Signal};

/// Sensory-feedback notifications. Fire-and-forget; never affects state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedbackEvent {
    SignalAppended(Signal),
    SymbolCompleted(char),
    SymbolRejected(Pattern),
}

pub trait FeedbackSink {
    fn notify(&self, event: FeedbackEvent);
}

/// Keeps every event; handy for tests and replay.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    events: RefCell<Vec<FeedbackEvent>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl FeedbackSink for RecordingFeedback {
    fn notify(&self, event: FeedbackEvent) {
        if let Ok(mut events) = self.events.try_borrow_mut() {
            events.push(event);
        }
    }
}
