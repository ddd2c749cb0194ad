//! Device identity and MQTT topic layout.
//!
//! ```text
//! subscribe   {control_ns}/{device-id}/+/+
//! inbound     {control_ns}/{device-id}/led/{indicator}
//!             {control_ns}/{device-id}/pump/{pump-id}
//! outbound    {status_ns}/{device-id}/soil-moisture
//!             {status_ns}/{device-id}/pump          (separate_pump_topic)
//! ```

use core::fmt::Write;

use crate::config::SystemConfig;
use crate::error::ValidationError;

/// Rendered topic string.
pub type TopicString = heapless::String<96>;

/// Suffix of the moisture status topic.
pub const MOISTURE_SUFFIX: &str = "soil-moisture";
/// Suffix of the dedicated pump status topic.
pub const PUMP_STATUS_SUFFIX: &str = "pump";

// ───────────────────────────────────────────────────────────────
// Device identity
// ───────────────────────────────────────────────────────────────

/// Immutable per-device identity, fixed at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId {
    bytes: heapless::Vec<u8, 16>,
    hex: heapless::String<32>,
}

impl DeviceId {
    /// Build from the raw unique-id bytes. Bytes beyond 16 are ignored.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut bytes = heapless::Vec::new();
        let mut hex = heapless::String::new();
        for b in raw.iter().take(16) {
            let _ = bytes.push(*b);
            let _ = write!(hex, "{:02x}", b);
        }
        Self { bytes, hex }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex rendering used in topics and as the MQTT client id.
    pub fn as_str(&self) -> &str {
        &self.hex
    }
}

// ───────────────────────────────────────────────────────────────
// Inbound topic
// ───────────────────────────────────────────────────────────────

/// The command families the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Led,
    Pump,
}

impl TopicKind {
    fn from_segment(s: &str) -> Option<Self> {
        match s {
            "led" => Some(Self::Led),
            "pump" => Some(Self::Pump),
            _ => None,
        }
    }
}

/// A split `{root}/{device-id}/{kind}/{target}` topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic<'a> {
    pub root: &'a str,
    pub device_id: &'a str,
    /// `None` for kinds this firmware does not handle.
    pub kind: Option<TopicKind>,
    pub kind_raw: &'a str,
    pub target: &'a str,
}

impl<'a> Topic<'a> {
    /// Split a topic; anything but exactly four segments is rejected.
    pub fn parse(topic: &'a str) -> Result<Self, ValidationError> {
        let mut segments = topic.split('/');
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(root), Some(device_id), Some(kind_raw), Some(target), None) => Ok(Self {
                root,
                device_id,
                kind: TopicKind::from_segment(kind_raw),
                kind_raw,
                target,
            }),
            _ => Err(ValidationError::SegmentCount(topic.split('/').count())),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Topic set
// ───────────────────────────────────────────────────────────────

/// Every topic this device uses, rendered once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    subscribe: TopicString,
    moisture: TopicString,
    pump_status: TopicString,
}

impl Topics {
    pub fn new(config: &SystemConfig, device: &DeviceId) -> Self {
        let mut subscribe = TopicString::new();
        let _ = write!(subscribe, "{}/{}/+/+", config.control_namespace, device.as_str());

        let mut moisture = TopicString::new();
        let _ = write!(
            moisture,
            "{}/{}/{}",
            config.status_namespace,
            device.as_str(),
            MOISTURE_SUFFIX
        );

        let pump_status = if config.separate_pump_topic {
            let mut t = TopicString::new();
            let _ = write!(
                t,
                "{}/{}/{}",
                config.status_namespace,
                device.as_str(),
                PUMP_STATUS_SUFFIX
            );
            t
        } else {
            moisture.clone()
        };

        Self {
            subscribe,
            moisture,
            pump_status,
        }
    }

    /// Wildcard filter for all inbound commands.
    pub fn subscribe(&self) -> &str {
        &self.subscribe
    }

    pub fn moisture(&self) -> &str {
        &self.moisture
    }

    /// Destination of pump ON/OFF events.
    pub fn pump_status(&self) -> &str {
        &self.pump_status
    }
}
