//! Inbound commands to the control core.
//!
//! Produced only by the [`router`](super::router) from a well-formed topic
//! and payload pair; consumed by the
//! [`Supervisor`](super::supervisor::Supervisor) dispatch.

use crate::config::ChannelId;

/// Commands that arrive over the control topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drive the shared status indicator.
    SetIndicator { on: bool },

    /// Run a pump for the requested time. Limits are applied by the pump.
    FirePump { pump_id: ChannelId, duration_ms: i64 },
}
