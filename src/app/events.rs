//! Outbound telemetry events.
//!
//! Pump events are queued by the [`PumpController`](super::pump::PumpController)
//! and moisture readings are built by the supervisor; both leave the device
//! through [`TelemetryEvent::payload`]. The wire format is plain text:
//!
//! | Event             | Payload                    |
//! |-------------------|----------------------------|
//! | `PumpOn`          | `ON::{id}::{ms}::{ts}`     |
//! | `PumpOff`         | `OFF::{id}::{ts}`          |
//! | `MoistureReading` | decimal float, e.g. `1.0`  |

use core::fmt::Write;

use crate::config::ChannelId;

/// Serialized event text.
pub type Payload = heapless::String<64>;

/// Immutable status record. `ts` is milliseconds since boot.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    PumpOn {
        id: ChannelId,
        duration_ms: u32,
        ts: u64,
    },
    PumpOff {
        id: ChannelId,
        ts: u64,
    },
    MoistureReading {
        sensor_id: ChannelId,
        value: f32,
        ts: u64,
    },
}

impl TelemetryEvent {
    /// Whether this is a pump status event (as opposed to a reading).
    pub fn is_pump_status(&self) -> bool {
        matches!(self, Self::PumpOn { .. } | Self::PumpOff { .. })
    }

    /// Render the wire payload.
    pub fn payload(&self) -> Payload {
        let mut out = Payload::new();
        // The longest rendering stays well under the 64-byte capacity.
        let _ = match self {
            Self::PumpOn { id, duration_ms, ts } => {
                write!(out, "ON::{}::{}::{}", id, duration_ms, ts)
            }
            Self::PumpOff { id, ts } => write!(out, "OFF::{}::{}", id, ts),
            // Debug formatting keeps the fractional part ("1.0", not "1").
            Self::MoistureReading { value, .. } => write!(out, "{:?}", value),
        };
        out
    }
}
