//! Supervisor: the outer control loop.
//!
//! [`Supervisor`] owns every piece of mutable state in the firmware: the
//! pump controllers, the status indicator, the moisture probes, the
//! telemetry queue and the publish timer. Adapters are injected at each
//! call site, keeping the loop testable with a simulated clock.
//!
//! ```text
//!  MessagingPort ──▶ ┌──────────────────────────────┐ ──▶ MessagingPort
//!                    │          Supervisor           │
//!  ConnectivityPort ▶│ route · pumps · probes · queue│◀── ClockPort
//!                    └──────────────────────────────┘
//! ```
//!
//! One cycle:
//!
//! 1. take at most one inbound message, route and dispatch it
//! 2. publish moisture readings if the publish interval elapsed
//! 3. drain the telemetry queue, one publish per event
//! 4. sleep one tick
//! 5. bail out with a fault if the network link is down
//!
//! [`start`] wraps the loop with the boot pattern and the fail-stop reset.

use embedded_hal::digital::OutputPin;
use log::{error, info, warn};

use crate::config::{MAX_PUMPS, SystemConfig};
use crate::drivers::pump::ActuationChannel;
use crate::drivers::status_led::Indicator;
use crate::error::{ConnectivityFault, Error, Result, TransportError, ValidationError};
use crate::sensors::SensorHub;
use crate::sensors::moisture::SensorChannel;

use super::commands::Command;
use super::events::TelemetryEvent;
use super::ports::{AnalogSource, ClockPort, ConnectivityPort, MessagingPort, SystemPort};
use super::pump::{PumpController, PumpLimits};
use super::queue::TelemetryQueue;
use super::router;
use super::topics::Topics;

/// Fixed loop timings, taken from [`SystemConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub publish_interval_ms: u64,
    pub tick_ms: u32,
    pub reset_grace_ms: u32,
    pub boot_blink_count: u8,
    pub boot_blink_ms: u32,
}

impl Cadence {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            publish_interval_ms: config.publish_interval_ms(),
            tick_ms: config.tick_ms(),
            reset_grace_ms: config.reset_grace_ms(),
            boot_blink_count: config.boot_blink_count,
            boot_blink_ms: config.boot_blink_ms,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Supervisor
// ───────────────────────────────────────────────────────────────

pub struct Supervisor<P, L, A> {
    topics: Topics,
    cadence: Cadence,
    pumps: heapless::Vec<PumpController<P>, MAX_PUMPS>,
    indicator: Indicator<L>,
    sensors: SensorHub<A>,
    queue: TelemetryQueue,
    last_publish_ms: u64,
}

impl<P: OutputPin, L: OutputPin, A: AnalogSource> Supervisor<P, L, A> {
    pub fn new(
        topics: Topics,
        cadence: Cadence,
        pumps: heapless::Vec<PumpController<P>, MAX_PUMPS>,
        indicator: Indicator<L>,
        sensors: SensorHub<A>,
    ) -> Self {
        Self {
            topics,
            cadence,
            pumps,
            indicator,
            sensors,
            queue: TelemetryQueue::new(),
            last_publish_ms: 0,
        }
    }

    /// Assemble every pump and probe listed in `config`.
    ///
    /// `pump_pin` and `probe` build the hardware handle for a GPIO number
    /// and an ADC channel respectively.
    pub fn from_config(
        config: &SystemConfig,
        topics: Topics,
        mut pump_pin: impl FnMut(i32) -> P,
        indicator_pin: L,
        mut probe: impl FnMut(u32) -> A,
    ) -> Self {
        let limits = PumpLimits::from_config(config);

        let mut pumps = heapless::Vec::new();
        for p in &config.pumps {
            let channel = ActuationChannel::new(pump_pin(p.gpio));
            // Capacity matches `SystemConfig::pumps`.
            let _ = pumps.push(PumpController::new(p.id.clone(), channel, limits));
        }

        let mut sensors = SensorHub::new();
        for s in &config.sensors {
            let channel = SensorChannel::new(s.id.clone(), probe(s.adc_channel), config.moisture_scale);
            let _ = sensors.add(channel);
        }

        Self::new(
            topics,
            Cadence::from_config(config),
            pumps,
            Indicator::new(indicator_pin),
            sensors,
        )
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Visible boot pattern on the status indicator.
    pub fn boot_indicator(&mut self, clock: &mut impl ClockPort) {
        self.indicator.boot_pattern(
            self.cadence.boot_blink_count,
            self.cadence.boot_blink_ms,
            clock,
        );
    }

    /// Open the broker session and subscribe to the command topics.
    pub fn connect(&mut self, transport: &mut impl MessagingPort) -> Result<()> {
        info!("Subscribe topic: {}", self.topics.subscribe());
        info!("Publish topic: {}", self.topics.moisture());
        info!("Publish topic: {}", self.topics.pump_status());

        transport.connect().map_err(|e| {
            error!("broker connect failed: {}", e);
            Error::Connectivity(ConnectivityFault::BrokerUnreachable)
        })?;
        transport.subscribe(self.topics.subscribe())?;
        info!("Connected to MQTT broker, waiting for commands");
        Ok(())
    }

    /// Run cycles until a session fault occurs, then return it.
    pub fn run(
        &mut self,
        transport: &mut impl MessagingPort,
        net: &impl ConnectivityPort,
        clock: &mut impl ClockPort,
    ) -> Error {
        self.last_publish_ms = clock.now_ms();
        loop {
            if let Err(fault) = self.run_cycle(transport, net, clock) {
                return fault;
            }
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// One full loop iteration. Only session faults are returned.
    pub fn run_cycle(
        &mut self,
        transport: &mut impl MessagingPort,
        net: &impl ConnectivityPort,
        clock: &mut impl ClockPort,
    ) -> Result<()> {
        // 1. Inbound command (non-blocking poll)
        if let Some(msg) = transport.check_msg()? {
            info!(
                "({}, {})",
                String::from_utf8_lossy(&msg.topic),
                String::from_utf8_lossy(&msg.payload)
            );
            if let Some(cmd) = router::route(&msg.topic, &msg.payload) {
                self.dispatch(cmd, clock);
            }
        }

        // 2. Throttled moisture telemetry
        if clock.now_ms().saturating_sub(self.last_publish_ms) >= self.cadence.publish_interval_ms
        {
            self.publish_moisture(transport, clock.now_ms())?;
            self.last_publish_ms = clock.now_ms();
        }

        // 3. Queued pump events
        for event in self.queue.drain() {
            self.publish_event(transport, &event)?;
        }

        // 4. Bound the loop frequency
        clock.delay_ms(self.cadence.tick_ms);

        // 5. Link check
        if !net.is_connected() {
            return Err(ConnectivityFault::LinkLost.into());
        }
        Ok(())
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a routed command. Per-command failures are logged only.
    pub fn dispatch(&mut self, cmd: Command, clock: &mut impl ClockPort) {
        match cmd {
            Command::SetIndicator { on } => self.indicator.set(on),
            Command::FirePump {
                pump_id,
                duration_ms,
            } => {
                let Some(pump) = self.pumps.iter_mut().find(|p| *p.id() == pump_id) else {
                    warn!("pump {}: {}", pump_id, ValidationError::UnknownPump);
                    return;
                };
                match pump.fire(duration_ms, &mut self.indicator, clock, &mut self.queue) {
                    Ok(()) | Err(ValidationError::DurationTooShort) => {}
                    Err(e) => warn!("pump {}: {}", pump_id, e),
                }
            }
        }
    }

    // ── Publishing ────────────────────────────────────────────

    fn publish_moisture(&mut self, transport: &mut impl MessagingPort, ts: u64) -> Result<()> {
        for reading in self.sensors.read_all(ts) {
            self.publish_event(transport, &reading)?;
        }
        Ok(())
    }

    fn publish_event(
        &self,
        transport: &mut impl MessagingPort,
        event: &TelemetryEvent,
    ) -> core::result::Result<(), TransportError> {
        let topic = if event.is_pump_status() {
            self.topics.pump_status()
        } else {
            self.topics.moisture()
        };
        transport.publish(topic, event.payload().as_bytes())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn pumps(&self) -> &[PumpController<P>] {
        &self.pumps
    }

    pub fn pump(&self, id: &str) -> Option<&PumpController<P>> {
        self.pumps.iter().find(|p| p.id().as_str() == id)
    }

    pub fn indicator(&self) -> &Indicator<L> {
        &self.indicator
    }

    pub fn queue(&self) -> &TelemetryQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut TelemetryQueue {
        &mut self.queue
    }

    pub fn last_publish_ms(&self) -> u64 {
        self.last_publish_ms
    }
}

// ───────────────────────────────────────────────────────────────
// Outer wrapper
// ───────────────────────────────────────────────────────────────

/// Boot pattern, connect, loop; on any fault, reset.
///
/// On hardware the reset never returns. Where [`SystemPort::restart`]
/// returns, the fault is handed back and the caller must rebuild all
/// state before starting again.
pub fn start<P, L, A>(
    supervisor: &mut Supervisor<P, L, A>,
    transport: &mut impl MessagingPort,
    net: &impl ConnectivityPort,
    clock: &mut impl ClockPort,
    system: &mut impl SystemPort,
) -> Error
where
    P: OutputPin,
    L: OutputPin,
    A: AnalogSource,
{
    supervisor.boot_indicator(clock);
    let fault = match supervisor.connect(transport) {
        Ok(()) => supervisor.run(transport, net, clock),
        Err(e) => e,
    };
    reset(&fault, supervisor.cadence.reset_grace_ms, clock, system);
    fault
}

/// Fail-stop recovery: log, wait out the grace period, restart.
///
/// Also taken by boot faults raised before a supervisor exists.
pub fn reset(
    fault: &(impl core::fmt::Display + ?Sized),
    grace_ms: u32,
    clock: &mut impl ClockPort,
    system: &mut impl SystemPort,
) {
    error!("Error: {}", fault);
    error!("Resetting in {}ms...", grace_ms);
    clock.delay_ms(grace_ms);
    system.restart();
}
