//! Per-body event queue.
//!
//! A body records events while it works and flushes them once per frame,
//! after the visual mesh has been written. Sinks therefore never run in
//! the middle of a solver step, and see events in recording order.

use crate::events::{EventKind, SimulationEvent};
use crate::sinks::EventSink;

/// Queues events for one soft body and hands them to its sinks on flush.
#[derive(Default)]
pub struct EventBus {
    sinks: Vec<Box<dyn EventSink>>,
    pending: Vec<SimulationEvent>,
}

impl EventBus {
    /// A bus with no sinks. Events recorded on it are discarded on flush.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink, builder style.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Queues an event for `frame`.
    pub fn record(&mut self, frame: u64, kind: EventKind) {
        self.pending.push(SimulationEvent::new(frame, kind));
    }

    /// Number of events waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Hands every queued event to every sink. Returns how many events
    /// were delivered.
    pub fn flush(&mut self) -> usize {
        let delivered = self.pending.len();
        for event in self.pending.drain(..) {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
        }
        delivered
    }

    /// Flushes, then lets every sink finish.
    pub fn finalize(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }
}
