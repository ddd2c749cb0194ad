//! System configuration parameters
//!
//! All tunable parameters for the Habanero controller. The defaults
//! reproduce the reference device; a JSON override can be baked in at
//! build time through `HABANERO_CONFIG_JSON`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins;

/// Maximum number of pumps a controller can drive.
pub const MAX_PUMPS: usize = 4;
/// Maximum number of moisture probes a controller can sample.
pub const MAX_SENSORS: usize = 4;

/// Short identifier for a pump or sensor (`"1"`, `"2"`, ...).
pub type ChannelId = heapless::String<8>;

/// Build a bounded string, truncating on overflow.
pub(crate) fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// One pump relay output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpChannelConfig {
    pub id: ChannelId,
    pub gpio: i32,
}

/// One soil-moisture probe input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorChannelConfig {
    pub id: ChannelId,
    pub adc_channel: u32,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Messaging ---
    /// MQTT broker host name
    pub broker_host: heapless::String<64>,
    pub broker_port: u16,
    /// MQTT keepalive (seconds)
    pub keepalive_secs: u16,
    /// Root of inbound command topics
    pub control_namespace: heapless::String<32>,
    /// Root of outbound status topics
    pub status_namespace: heapless::String<32>,
    /// Publish pump ON/OFF events on `.../pump` instead of the moisture topic
    pub separate_pump_topic: bool,

    // --- Hardware ---
    pub indicator_gpio: i32,
    pub pumps: heapless::Vec<PumpChannelConfig, MAX_PUMPS>,
    pub sensors: heapless::Vec<SensorChannelConfig, MAX_SENSORS>,
    /// Divisor applied to raw 16-bit moisture samples
    pub moisture_scale: f32,

    // --- Pump limits ---
    /// Shorter requests are ignored (milliseconds)
    pub pump_min_ms: u32,
    /// Longer requests are clamped (milliseconds)
    pub pump_max_ms: u32,
    /// Half period of the liveness blink while a pump runs (milliseconds)
    pub pump_blink_half_period_ms: u32,

    // --- Timing ---
    /// Moisture publish interval (seconds)
    pub publish_interval_secs: u32,
    /// Command-processing tick (seconds)
    pub tick_secs: u32,
    /// Wait before restarting after a fault (seconds)
    pub reset_grace_secs: u32,
    /// Indicator steps shown at boot
    pub boot_blink_count: u8,
    /// Duration of each boot step (milliseconds)
    pub boot_blink_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut pumps = heapless::Vec::new();
        for (id, gpio) in [
            ("1", pins::PUMP_1_GPIO),
            ("2", pins::PUMP_2_GPIO),
            ("3", pins::PUMP_3_GPIO),
        ] {
            let _ = pumps.push(PumpChannelConfig { id: bounded(id), gpio });
        }

        // The reference device only samples the first probe.
        let mut sensors = heapless::Vec::new();
        let _ = sensors.push(SensorChannelConfig {
            id: bounded("1"),
            adc_channel: pins::MOISTURE_1_ADC_CHANNEL,
        });

        Self {
            // Messaging
            broker_host: bounded("mqtt.stag9.com"),
            broker_port: 1883,
            keepalive_secs: 60,
            control_namespace: bounded("habanero-controls"),
            status_namespace: bounded("habanero-status"),
            separate_pump_topic: false,

            // Hardware
            indicator_gpio: pins::STATUS_LED_GPIO,
            pumps,
            sensors,
            moisture_scale: 1000.0,

            // Pump limits
            pump_min_ms: 50,
            pump_max_ms: 60_000, // 1 minute
            pump_blink_half_period_ms: 125,

            // Timing
            publish_interval_secs: 5,
            tick_secs: 1,
            reset_grace_secs: 5,
            boot_blink_count: 5,
            boot_blink_ms: 250,
        }
    }
}

impl SystemConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control loop cannot run with.
    ///
    /// Out-of-range values are refused, never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.broker_host.is_empty() {
            return Err(Error::Config("broker_host is empty"));
        }
        if self.keepalive_secs == 0 {
            return Err(Error::Config("keepalive_secs must be > 0"));
        }
        if self.control_namespace.is_empty() || self.control_namespace.contains('/') {
            return Err(Error::Config("control_namespace must be one topic segment"));
        }
        if self.status_namespace.is_empty() || self.status_namespace.contains('/') {
            return Err(Error::Config("status_namespace must be one topic segment"));
        }
        if self.pumps.is_empty() {
            return Err(Error::Config("at least one pump is required"));
        }
        for (i, pump) in self.pumps.iter().enumerate() {
            if pump.id.is_empty() || pump.id.contains('/') {
                return Err(Error::Config("pump id must be one topic segment"));
            }
            if self.pumps[..i].iter().any(|p| p.id == pump.id) {
                return Err(Error::Config("duplicate pump id"));
            }
            if !(0..=pins::MAX_GPIO).contains(&pump.gpio) {
                return Err(Error::Config("pump gpio out of range"));
            }
            let shared = pump.gpio == self.indicator_gpio
                || self.pumps[..i].iter().any(|p| p.gpio == pump.gpio);
            if shared {
                return Err(Error::Config("output gpio assigned twice"));
            }
        }
        if !(0..=pins::MAX_GPIO).contains(&self.indicator_gpio) {
            return Err(Error::Config("indicator_gpio out of range"));
        }
        for sensor in &self.sensors {
            if sensor.adc_channel >= pins::ADC1_CHANNEL_COUNT {
                return Err(Error::Config("sensor adc_channel out of range"));
            }
        }
        if !(self.moisture_scale.is_finite() && self.moisture_scale > 0.0) {
            return Err(Error::Config("moisture_scale must be positive"));
        }
        if self.pump_min_ms > self.pump_max_ms {
            return Err(Error::Config("pump_min_ms exceeds pump_max_ms"));
        }
        if self.pump_blink_half_period_ms == 0 {
            return Err(Error::Config("pump_blink_half_period_ms must be > 0"));
        }
        if self.publish_interval_secs == 0 || self.tick_secs == 0 {
            return Err(Error::Config("intervals must be > 0"));
        }
        Ok(())
    }

    pub fn publish_interval_ms(&self) -> u64 {
        u64::from(self.publish_interval_secs) * 1000
    }

    pub fn tick_ms(&self) -> u32 {
        self.tick_secs.saturating_mul(1000)
    }

    pub fn reset_grace_ms(&self) -> u32 {
        self.reset_grace_secs.saturating_mul(1000)
    }
}
