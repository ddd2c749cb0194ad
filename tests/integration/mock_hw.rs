//! Mock hardware and a test rig for integration tests.
//!
//! Pins record every level written, the clock only moves when the code
//! under test sleeps, and the messaging/restart/WiFi adapters are the
//! crate's own host simulations.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use habanero::adapters::mqtt::{MqttAdapter, SessionParams};
use habanero::adapters::system::SystemAdapter;
use habanero::adapters::wifi::{LinkHandle, WifiAdapter, WifiCredentials};
use habanero::app::ports::{AnalogSource, ClockPort, ConnectivityPort};
use habanero::app::supervisor::Supervisor;
use habanero::app::topics::{DeviceId, Topics};
use habanero::config::SystemConfig;
use habanero::error::Error;

// ── MockPin ───────────────────────────────────────────────────

/// Output pin whose clones share one write log.
#[derive(Debug, Clone, Default)]
pub struct MockPin {
    writes: Rc<RefCell<Vec<bool>>>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn writes(&self) -> Vec<bool> {
        self.writes.borrow().clone()
    }

    pub fn level(&self) -> bool {
        self.writes.borrow().last().copied().unwrap_or(false)
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.writes.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.writes.borrow_mut().push(true);
        Ok(())
    }
}

// ── MockAdc ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MockAdc {
    raw: Rc<Cell<u16>>,
}

impl MockAdc {
    pub fn set(&self, raw: u16) {
        self.raw.set(raw);
    }
}

impl AnalogSource for MockAdc {
    fn read_raw(&mut self) -> u16 {
        self.raw.get()
    }
}

// ── SimClock ──────────────────────────────────────────────────

/// Deterministic clock: time advances only through `delay_*`.
#[derive(Debug, Default)]
pub struct SimClock {
    now_ns: u64,
    pub sleeps_ms: Vec<u32>,
}

#[allow(dead_code)]
impl SimClock {
    pub fn at(ms: u64) -> Self {
        Self {
            now_ns: ms * 1_000_000,
            sleeps_ms: Vec::new(),
        }
    }
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_ns += u64::from(ms) * 1_000_000;
        self.sleeps_ms.push(ms);
    }
}

impl ClockPort for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ns / 1_000_000
    }
}

// ── ScriptedLink ──────────────────────────────────────────────

/// Link that reports up for a fixed number of checks, then down.
#[derive(Debug)]
pub struct ScriptedLink {
    remaining: Cell<u32>,
}

impl ScriptedLink {
    pub fn up_for(checks: u32) -> Self {
        Self {
            remaining: Cell::new(checks),
        }
    }
}

impl ConnectivityPort for ScriptedLink {
    fn is_connected(&self) -> bool {
        match self.remaining.get() {
            0 => false,
            n => {
                self.remaining.set(n - 1);
                true
            }
        }
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type TestSupervisor = Supervisor<MockPin, MockPin, MockAdc>;

/// A supervisor wired to mock pins and the simulated adapters.
pub struct Rig {
    pub config: SystemConfig,
    pub supervisor: TestSupervisor,
    pub pump_pins: HashMap<i32, MockPin>,
    pub led: MockPin,
    pub adc: MockAdc,
    pub transport: MqttAdapter,
    pub wifi: WifiAdapter,
    pub link: LinkHandle,
    pub clock: SimClock,
    pub system: SystemAdapter,
}

#[allow(dead_code)]
impl Rig {
    /// Device id `aabb`, reference defaults.
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        let device = DeviceId::from_bytes(b"\xaa\xbb");
        let topics = Topics::new(&config, &device);

        let mut pump_pins = HashMap::new();
        let led = MockPin::default();
        let adc = MockAdc::default();
        let supervisor = Supervisor::from_config(
            &config,
            topics,
            |gpio| pump_pins.entry(gpio).or_insert_with(MockPin::default).clone(),
            led.clone(),
            |_channel| adc.clone(),
        );

        let credentials = WifiCredentials::new("TestNet", "password1").unwrap();
        let wifi = WifiAdapter::associate(&credentials).unwrap();
        let link = wifi.link_handle();

        Self {
            transport: MqttAdapter::new(SessionParams::from_config(&config, device.as_str())),
            config,
            supervisor,
            pump_pins,
            led,
            adc,
            wifi,
            link,
            clock: SimClock::default(),
            system: SystemAdapter::new(),
        }
    }

    /// Connect and subscribe, panicking on failure.
    pub fn connected() -> Self {
        let mut rig = Self::new();
        rig.supervisor.connect(&mut rig.transport).unwrap();
        rig
    }

    pub fn cycle(&mut self) -> Result<(), Error> {
        self.supervisor
            .run_cycle(&mut self.transport, &self.wifi, &mut self.clock)
    }

    /// Deliver a command on `habanero-controls/aabb/{suffix}`.
    pub fn send(&mut self, suffix: &str, payload: &str) -> bool {
        let topic = format!("{}/aabb/{}", self.config.control_namespace, suffix);
        self.transport.inject(&topic, payload.as_bytes())
    }

    /// Write log of the pump configured under `id`.
    pub fn pump_writes(&self, id: &str) -> Vec<bool> {
        let gpio = self
            .config
            .pumps
            .iter()
            .find(|p| p.id.as_str() == id)
            .map(|p| p.gpio)
            .unwrap();
        self.pump_pins[&gpio].writes()
    }

    /// Published messages as UTF-8 `(topic, payload)` pairs.
    pub fn published(&mut self) -> Vec<(String, String)> {
        self.transport
            .take_published()
            .into_iter()
            .map(|(t, p)| (t, String::from_utf8(p).unwrap()))
            .collect()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}
