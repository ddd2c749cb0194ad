//! Capacitive soil-moisture probe.
//!
//! Reads one raw 16-bit sample and divides it by a fixed scale
//! (1000.0 on the reference board), giving roughly 0.0 to 65.5.
//! Out-of-range samples are passed through unclamped.

use crate::app::ports::AnalogSource;
use crate::config::ChannelId;

#[derive(Debug, Clone, Copy)]
pub struct MoistureSample {
    pub raw: u16,
    pub value: f32,
}

pub struct SensorChannel<A> {
    id: ChannelId,
    source: A,
    scale: f32,
}

impl<A: AnalogSource> SensorChannel<A> {
    pub fn new(id: ChannelId, source: A, scale: f32) -> Self {
        Self { id, source, scale }
    }

    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    pub fn read(&mut self) -> MoistureSample {
        let raw = self.source.read_raw();
        MoistureSample {
            raw,
            value: f32::from(raw) / self.scale,
        }
    }
}
