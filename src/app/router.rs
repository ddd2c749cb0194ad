//! Inbound message decoding.
//!
//! Turns a raw `(topic, payload)` pair into a [`Command`]. Every failure
//! is scoped to the one message: [`route`] logs it and returns `None`, and
//! the control loop carries on.
//!
//! | Topic kind | Payload             | Command                       |
//! |------------|---------------------|-------------------------------|
//! | `led`      | `"ON"` / anything   | `SetIndicator { on }`         |
//! | `pump`     | integer ms          | `FirePump { pump_id, ms }`    |
//! | other      | any                 | ignored                       |

use core::num::IntErrorKind;

use log::{debug, warn};

use crate::config::ChannelId;
use crate::error::{DecodeError, Error, ValidationError};

use super::commands::Command;
use super::topics::{Topic, TopicKind};

/// Decode a message, reporting why it was dropped.
///
/// `Ok(None)` is a well-formed message for a kind this firmware ignores.
pub fn decode(topic: &[u8], payload: &[u8]) -> Result<Option<Command>, Error> {
    let topic = core::str::from_utf8(topic).map_err(|_| DecodeError::TopicNotUtf8)?;
    let payload = core::str::from_utf8(payload).map_err(|_| DecodeError::PayloadNotUtf8)?;

    let parsed = Topic::parse(topic)?;
    let Some(kind) = parsed.kind else {
        debug!("ignoring topic kind '{}' ({})", parsed.kind_raw, topic);
        return Ok(None);
    };

    match kind {
        TopicKind::Led => Ok(Some(Command::SetIndicator {
            on: payload == "ON",
        })),
        TopicKind::Pump => {
            let mut pump_id = ChannelId::new();
            pump_id
                .push_str(parsed.target)
                .map_err(|_| ValidationError::PumpIdTooLong)?;
            let duration_ms = parse_millis(payload)?;
            Ok(Some(Command::FirePump {
                pump_id,
                duration_ms,
            }))
        }
    }
}

/// Decode a message, logging and swallowing per-message errors.
pub fn route(topic: &[u8], payload: &[u8]) -> Option<Command> {
    match decode(topic, payload) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!(
                "dropping message on '{}': {}",
                String::from_utf8_lossy(topic),
                e
            );
            None
        }
    }
}

/// Integer milliseconds. Surrounding whitespace and a sign are accepted;
/// values past the `i64` range saturate so oversized requests still clamp.
fn parse_millis(s: &str) -> Result<i64, DecodeError> {
    match s.trim().parse::<i64>() {
        Ok(v) => Ok(v),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(DecodeError::NotAnInteger),
        },
    }
}
