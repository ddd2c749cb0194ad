//! Habanero firmware entry point.
//!
//! Hexagonal layout with a single-threaded supervisor loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioOutput / AdcInput   MqttAdapter     WifiAdapter           │
//! │  (OutputPin, Analog)     (Messaging)     (Connectivity)        │
//! │  Esp32Clock              SystemAdapter                         │
//! │  (ClockPort)             (SystemPort)                          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Supervisor (pure logic)                   │    │
//! │  │  Router · PumpController · TelemetryQueue              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use habanero::adapters::device_id;
use habanero::adapters::hardware::{AdcInput, GpioOutput};
use habanero::adapters::mqtt::{MqttAdapter, SessionParams};
use habanero::adapters::system::SystemAdapter;
use habanero::adapters::time::Esp32Clock;
use habanero::adapters::wifi::{ConnectivityError, WifiAdapter, WifiCredentials};
use habanero::app::supervisor::{self, Supervisor};
use habanero::app::topics::Topics;
use habanero::config::SystemConfig;
use habanero::drivers::hw_init;

/// Configuration baked in at build time, or the reference defaults.
fn load_config() -> SystemConfig {
    match option_env!("HABANERO_CONFIG_JSON") {
        Some(json) => match SystemConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config loaded from HABANERO_CONFIG_JSON");
                cfg
            }
            Err(e) => {
                warn!("HABANERO_CONFIG_JSON rejected ({}), using defaults", e);
                SystemConfig::default()
            }
        },
        None => SystemConfig::default(),
    }
}

/// Boot faults take the same log, grace wait and restart as session faults.
fn fail_stop(
    fault: &dyn core::fmt::Display,
    grace_ms: u32,
    clock: &mut Esp32Clock,
    system: &mut SystemAdapter,
) -> ! {
    loop {
        supervisor::reset(fault, grace_ms, clock, system);
    }
}

fn take_system() -> Result<(Peripherals, EspSystemEventLoop, EspDefaultNvsPartition)> {
    let peripherals = Peripherals::take().context("peripherals")?;
    let sys_loop = EspSystemEventLoop::take().context("system event loop")?;
    let nvs = EspDefaultNvsPartition::take().context("NVS partition")?;
    Ok((peripherals, sys_loop, nvs))
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Habanero v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config + peripherals ───────────────────────────────
    let config = load_config();
    let grace_ms = config.reset_grace_ms();
    let mut clock = Esp32Clock::new();
    let mut system = SystemAdapter::new();

    if let Err(e) = hw_init::init_peripherals(&config) {
        fail_stop(&e, grace_ms, &mut clock, &mut system);
    }

    // ── 3. Network association (blocks until up) ──────────────
    let credentials = WifiCredentials::new(
        option_env!("HABANERO_WIFI_SSID").unwrap_or_default(),
        option_env!("HABANERO_WIFI_PASS").unwrap_or_default(),
    )
    .context("WiFi credentials")?;

    let (peripherals, sys_loop, nvs) = match take_system() {
        Ok(parts) => parts,
        Err(e) => fail_stop(&e, grace_ms, &mut clock, &mut system),
    };
    let wifi = match WifiAdapter::associate(peripherals.modem, sys_loop, Some(nvs), &credentials) {
        Ok(wifi) => wifi,
        Err(e @ ConnectivityError::DriverInit) => fail_stop(&e, grace_ms, &mut clock, &mut system),
        Err(e) => return Err(e).context("WiFi credentials"),
    };

    // ── 4. Identity + topics ──────────────────────────────────
    let device = device_id::device_id();
    info!("Client ID: {}", device.as_str());
    let topics = Topics::new(&config, &device);

    // ── 5. Adapters ───────────────────────────────────────────
    let mut transport = MqttAdapter::new(SessionParams::from_config(&config, device.as_str()));

    // ── 6. Supervisor ─────────────────────────────────────────
    // `start` ends in `esp_restart()`; the loop only guards against a
    // restart that returns.
    loop {
        let mut supervisor = Supervisor::from_config(
            &config,
            topics.clone(),
            GpioOutput::new,
            GpioOutput::new(config.indicator_gpio),
            AdcInput::new,
        );
        let fault = supervisor::start(&mut supervisor, &mut transport, &wifi, &mut clock, &mut system);
        warn!("supervisor exited: {}", fault);
    }
}
