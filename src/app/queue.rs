//! Bounded outgoing-event queue.
//!
//! Fixed-capacity ring over [`heapless::Deque`]: pushing into a full queue
//! evicts the oldest event, so a burst between two drains keeps only the
//! most recent [`TELEMETRY_QUEUE_CAP`] entries. Evicted events are gone;
//! nothing is retried.

use heapless::{Deque, Vec};
use log::debug;

use super::events::TelemetryEvent;

/// Events retained between two drains.
pub const TELEMETRY_QUEUE_CAP: usize = 10;

#[derive(Debug, Default)]
pub struct TelemetryQueue {
    events: Deque<TelemetryEvent, TELEMETRY_QUEUE_CAP>,
    evicted: u32,
}

impl TelemetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, dropping the oldest one when full.
    pub fn push(&mut self, event: TelemetryEvent) {
        if self.events.is_full() {
            if let Some(old) = self.events.pop_front() {
                self.evicted = self.evicted.wrapping_add(1);
                debug!("telemetry queue full, dropped {:?}", old);
            }
        }
        // Cannot fail: a slot was freed above if needed.
        let _ = self.events.push_back(event);
    }

    /// Remove and return everything retained, oldest first.
    pub fn drain(&mut self) -> Vec<TelemetryEvent, TELEMETRY_QUEUE_CAP> {
        let mut out = Vec::new();
        while let Some(event) = self.events.pop_front() {
            let _ = out.push(event);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events dropped to overflow since boot.
    pub fn evicted(&self) -> u32 {
        self.evicted
    }
}
