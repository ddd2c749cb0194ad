//! Unified error types for the Habanero firmware.
//!
//! A single `Error` enum that every subsystem converts into, split by how
//! the control loop must react:
//!
//! | Variant        | Scope        | Reaction                              |
//! |----------------|--------------|---------------------------------------|
//! | `Decode`       | one message  | drop message, log, keep looping       |
//! | `Validation`   | one command  | drop command, log, keep looping       |
//! | `Connectivity` | session      | unwind to `start`, full reset         |
//! | `Transport`    | session      | unwind to `start`, full reset         |
//! | `Config`       | boot         | refuse the configuration              |
//!
//! All variants are `Copy` so they can be logged and returned without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Inbound topic or payload could not be decoded.
    Decode(DecodeError),
    /// A decoded command was rejected.
    Validation(ValidationError),
    /// Network link or broker session is gone.
    Connectivity(ConnectivityFault),
    /// The messaging transport failed an I/O operation.
    Transport(TransportError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl Error {
    /// Whether this error ends the current session.
    ///
    /// Only connectivity-class errors may unwind out of the supervisor loop.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Connectivity(_) | Self::Transport(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Validation(e) => write!(f, "validation: {e}"),
            Self::Connectivity(e) => write!(f, "connectivity: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Topic bytes are not valid UTF-8.
    TopicNotUtf8,
    /// Payload bytes are not valid UTF-8.
    PayloadNotUtf8,
    /// Pump payload is not an integer.
    NotAnInteger,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopicNotUtf8 => write!(f, "topic is not UTF-8"),
            Self::PayloadNotUtf8 => write!(f, "payload is not UTF-8"),
            Self::NotAnInteger => write!(f, "payload is not an integer"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Topic does not have exactly four segments.
    SegmentCount(usize),
    /// No pump is configured under the requested id.
    UnknownPump,
    /// Requested run time is below the pump minimum.
    DurationTooShort,
    /// Pump identifier does not fit the id buffer.
    PumpIdTooLong,
    /// Pump is already running.
    PumpBusy,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SegmentCount(n) => write!(f, "expected 4 topic segments, got {n}"),
            Self::UnknownPump => write!(f, "unknown pump id"),
            Self::DurationTooShort => write!(f, "duration below minimum"),
            Self::PumpIdTooLong => write!(f, "pump id too long"),
            Self::PumpBusy => write!(f, "pump already active"),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

// ---------------------------------------------------------------------------
// Connectivity faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityFault {
    /// The station interface reports no association.
    LinkLost,
    /// The broker refused or never acknowledged the session.
    BrokerUnreachable,
}

impl fmt::Display for ConnectivityFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkLost => write!(f, "WiFi connection lost"),
            Self::BrokerUnreachable => write!(f, "MQTT broker unreachable"),
        }
    }
}

impl From<ConnectivityFault> for Error {
    fn from(e: ConnectivityFault) -> Self {
        Self::Connectivity(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    NotConnected,
    SubscribeFailed,
    PublishFailed,
    ReceiveFailed,
    Disconnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "MQTT client not connected"),
            Self::SubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::ReceiveFailed => write!(f, "MQTT receive failed"),
            Self::Disconnected => write!(f, "MQTT session dropped"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
