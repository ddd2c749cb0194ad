//! Port traits: the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Supervisor (domain)
//! ```
//!
//! Driven adapters (MQTT client, WiFi station, ADC, clock, restart) implement
//! these traits. The [`Supervisor`](super::supervisor::Supervisor) receives
//! them as generics at each call site, so the core never touches ESP-IDF
//! directly. Output pins use `embedded_hal::digital::OutputPin` and sleeps
//! use `embedded_hal::delay::DelayNs` rather than crate-local traits.

use embedded_hal::delay::DelayNs;

use crate::error::TransportError;

// ───────────────────────────────────────────────────────────────
// Messaging port (driven adapter: domain ↔ broker)
// ───────────────────────────────────────────────────────────────

/// A message delivered on a subscribed topic, still undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: Vec<u8>,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Publish/subscribe transport.
///
/// Every method is non-blocking from the core's point of view except
/// `connect`, which returns once the broker has acknowledged the session.
pub trait MessagingPort {
    /// Open the broker session.
    fn connect(&mut self) -> Result<(), TransportError>;

    /// Subscribe to a topic filter (may contain `+` wildcards).
    fn subscribe(&mut self, filter: &str) -> Result<(), TransportError>;

    /// Publish one payload as an independent transmission.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// Take at most one pending inbound message.
    ///
    /// `Ok(None)` means nothing is waiting; a broken session is an error.
    fn check_msg(&mut self) -> Result<Option<InboundMessage>, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: station interface → domain)
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    /// Whether the network link is currently up.
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source that can also block the caller.
///
/// Every suspension point in the firmware goes through `delay_ms` on this
/// port, so a simulated clock makes the whole control loop deterministic.
pub trait ClockPort: DelayNs {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// System port
// ───────────────────────────────────────────────────────────────

pub trait SystemPort {
    /// Restart the whole firmware, discarding all in-memory state.
    ///
    /// Never returns on hardware. Host implementations return so the
    /// caller can rebuild its state from scratch.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Analog input
// ───────────────────────────────────────────────────────────────

/// Raw sample source for a moisture probe.
pub trait AnalogSource {
    /// One sample, scaled to the full 16-bit range.
    fn read_raw(&mut self) -> u16;
}
