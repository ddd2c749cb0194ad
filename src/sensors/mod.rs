//! Sensor subsystem: moisture probe drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every probe and produces one [`TelemetryEvent::MoistureReading`]
//! per probe each time the supervisor's publish interval elapses.

pub mod moisture;

use heapless::Vec;

use crate::app::events::TelemetryEvent;
use crate::app::ports::AnalogSource;
use crate::config::MAX_SENSORS;
use moisture::SensorChannel;

/// Aggregates all moisture probes.
pub struct SensorHub<A> {
    channels: Vec<SensorChannel<A>, MAX_SENSORS>,
}

impl<A: AnalogSource> SensorHub<A> {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Add a probe. Returns it back when the hub is full.
    pub fn add(&mut self, channel: SensorChannel<A>) -> Result<(), SensorChannel<A>> {
        self.channels.push(channel)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Sample every probe in configuration order.
    pub fn read_all(&mut self, ts: u64) -> Vec<TelemetryEvent, MAX_SENSORS> {
        let mut out = Vec::new();
        for channel in &mut self.channels {
            let sample = channel.read();
            let _ = out.push(TelemetryEvent::MoistureReading {
                sensor_id: channel.id().clone(),
                value: sample.value,
                ts,
            });
        }
        out
    }
}

impl<A: AnalogSource> Default for SensorHub<A> {
    fn default() -> Self {
        Self::new()
    }
}
