//! Per-pump actuation state machine.
//!
//! ```text
//!            FirePump(d), d >= min          now >= deadline
//!   ┌──────┐ ─────────────────────▶ ┌────────────────────┐ ───────┐
//!   │ Idle │                        │ Active { deadline } │        │
//!   └──────┘ ◀───────────────────── └────────────────────┘ ◀──────┘
//!      ▲          channel OFF,                   blink
//!      │          queue PumpOff
//! ```
//!
//! [`begin`](PumpController::begin) and [`poll`](PumpController::poll)
//! are the explicit transitions. [`fire`](PumpController::fire) is the
//! default blocking mode built on top of them: it occupies the caller for
//! the whole run and blinks the indicator as a liveness signal, so no
//! other command is handled until the pump is off again.

use embedded_hal::digital::OutputPin;
use log::{debug, info};

use crate::config::{ChannelId, SystemConfig};
use crate::drivers::pump::ActuationChannel;
use crate::drivers::status_led::Indicator;
use crate::error::ValidationError;

use super::events::TelemetryEvent;
use super::ports::ClockPort;
use super::queue::TelemetryQueue;

/// Run-time bounds shared by all pumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpLimits {
    pub min_ms: u32,
    pub max_ms: u32,
    pub blink_half_period_ms: u32,
}

impl PumpLimits {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            min_ms: config.pump_min_ms,
            max_ms: config.pump_max_ms,
            blink_half_period_ms: config.pump_blink_half_period_ms,
        }
    }

    /// Apply the limits to a requested run time.
    ///
    /// `None` when the request is below the minimum; otherwise the request
    /// clamped to the maximum.
    pub fn effective(&self, requested_ms: i64) -> Option<u32> {
        if requested_ms < i64::from(self.min_ms) {
            return None;
        }
        Some(requested_ms.min(i64::from(self.max_ms)) as u32)
    }
}

impl Default for PumpLimits {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpPhase {
    Idle,
    Active { deadline_ms: u64 },
}

pub struct PumpController<P> {
    id: ChannelId,
    channel: ActuationChannel<P>,
    phase: PumpPhase,
    limits: PumpLimits,
}

impl<P: OutputPin> PumpController<P> {
    pub fn new(id: ChannelId, channel: ActuationChannel<P>, limits: PumpLimits) -> Self {
        Self {
            id,
            channel,
            phase: PumpPhase::Idle,
            limits,
        }
    }

    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    pub fn phase(&self) -> PumpPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, PumpPhase::Active { .. })
    }

    pub fn shutoff_deadline(&self) -> Option<u64> {
        match self.phase {
            PumpPhase::Idle => None,
            PumpPhase::Active { deadline_ms } => Some(deadline_ms),
        }
    }

    pub fn channel(&self) -> &ActuationChannel<P> {
        &self.channel
    }

    /// Idle → Active. Switches the channel on and queues `PumpOn`.
    ///
    /// Returns the shutoff deadline. Requests below the minimum leave the
    /// pump untouched and queue nothing.
    pub fn begin(
        &mut self,
        requested_ms: i64,
        now_ms: u64,
        queue: &mut TelemetryQueue,
    ) -> Result<u64, ValidationError> {
        if self.is_active() {
            return Err(ValidationError::PumpBusy);
        }
        let Some(duration_ms) = self.limits.effective(requested_ms) else {
            debug!(
                "pump {}: {}ms below {}ms minimum, ignored",
                self.id, requested_ms, self.limits.min_ms
            );
            return Err(ValidationError::DurationTooShort);
        };

        info!("Activating pump {} for {} milliseconds", self.id, duration_ms);
        queue.push(TelemetryEvent::PumpOn {
            id: self.id.clone(),
            duration_ms,
            ts: now_ms,
        });
        let deadline_ms = now_ms.saturating_add(u64::from(duration_ms));
        self.channel.set(true);
        self.phase = PumpPhase::Active { deadline_ms };
        Ok(deadline_ms)
    }

    /// Active → Idle once `now_ms` reaches the deadline.
    ///
    /// Returns `true` when this call switched the pump off.
    pub fn poll(&mut self, now_ms: u64, queue: &mut TelemetryQueue) -> bool {
        let PumpPhase::Active { deadline_ms } = self.phase else {
            return false;
        };
        if now_ms < deadline_ms {
            return false;
        }

        self.channel.set(false);
        self.phase = PumpPhase::Idle;
        info!("Pump {} shutoff", self.id);
        queue.push(TelemetryEvent::PumpOff {
            id: self.id.clone(),
            ts: now_ms,
        });
        true
    }

    /// Blocking run: begin, blink until the deadline, then shut off.
    pub fn fire<L: OutputPin>(
        &mut self,
        requested_ms: i64,
        indicator: &mut Indicator<L>,
        clock: &mut impl ClockPort,
        queue: &mut TelemetryQueue,
    ) -> Result<(), ValidationError> {
        let deadline_ms = self.begin(requested_ms, clock.now_ms(), queue)?;
        let half = self.limits.blink_half_period_ms;
        while clock.now_ms() < deadline_ms {
            indicator.set(true);
            clock.delay_ms(half);
            indicator.set(false);
            clock.delay_ms(half);
        }
        self.poll(clock.now_ms(), queue);
        Ok(())
    }
}
