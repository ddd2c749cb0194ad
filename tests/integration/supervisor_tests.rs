//! Supervisor loop scenarios against the simulated broker and clock.

use habanero::adapters::system::SystemAdapter;
use habanero::adapters::wifi::ConnectivityError;
use habanero::app::events::TelemetryEvent;
use habanero::app::supervisor;
use habanero::config::{ChannelId, SystemConfig};
use habanero::drivers::hw_init::HwInitError;
use habanero::error::{ConnectivityFault, Error, TransportError};

use log::Level;

use crate::log_capture;
use crate::mock_hw::{Rig, ScriptedLink, SimClock};

const MOISTURE: &str = "habanero-status/aabb/soil-moisture";

fn id(s: &str) -> ChannelId {
    ChannelId::try_from(s).unwrap()
}

// ── Connect ───────────────────────────────────────────────────

#[test]
fn connect_subscribes_to_command_wildcard() {
    let rig = Rig::connected();
    assert_eq!(
        rig.transport.subscriptions(),
        &["habanero-controls/aabb/+/+".to_string()]
    );
    assert_eq!(rig.transport.params().client_id, "aabb");
}

#[test]
fn boot_leaves_all_outputs_low() {
    let rig = Rig::new();
    for id in ["1", "2", "3"] {
        assert_eq!(rig.pump_writes(id), vec![false]);
    }
    assert_eq!(rig.led.writes(), vec![false]);
}

// ── Pump commands ─────────────────────────────────────────────

#[test]
fn pump_command_runs_for_requested_time_and_reports() {
    let mut rig = Rig::connected();
    assert!(rig.send("pump/2", "1000"));

    rig.cycle().unwrap();

    assert_eq!(rig.pump_writes("2"), vec![false, true, false]);
    assert_eq!(rig.pump_writes("1"), vec![false]);
    assert_eq!(rig.pump_writes("3"), vec![false]);
    // Four blink periods, then the one-second tick.
    assert_eq!(rig.now_ms(), 2000);
    assert_eq!(
        rig.led.writes(),
        vec![false, true, false, true, false, true, false, true, false]
    );
    assert_eq!(
        rig.published(),
        vec![
            (MOISTURE.to_string(), "ON::2::1000::0".to_string()),
            (MOISTURE.to_string(), "OFF::2::1000".to_string()),
        ]
    );
    assert!(!rig.supervisor.pump("2").unwrap().is_active());
    assert!(rig.supervisor.queue().is_empty());
}

#[test]
fn pump_request_is_clamped_to_one_minute() {
    let mut rig = Rig::connected();
    rig.send("pump/1", "120000");
    rig.cycle().unwrap();

    let published = rig.published();
    assert_eq!(published[0].1, "ON::1::60000::0");
    assert_eq!(published[1].1, "OFF::1::60000");
    assert_eq!(rig.now_ms(), 61_000);
}

#[test]
fn short_pump_request_is_ignored() {
    let mut rig = Rig::connected();
    rig.send("pump/1", "49");
    rig.cycle().unwrap();

    assert_eq!(rig.pump_writes("1"), vec![false]);
    assert!(rig.published().is_empty());
    assert_eq!(rig.now_ms(), 1000);
}

#[test]
fn unknown_pump_is_a_noop() {
    let mut rig = Rig::connected();
    rig.send("pump/9", "1000");
    rig.cycle().unwrap();

    for id in ["1", "2", "3"] {
        assert_eq!(rig.pump_writes(id), vec![false]);
    }
    assert!(rig.published().is_empty());
    assert_eq!(rig.now_ms(), 1000);
}

#[test]
fn non_numeric_duration_is_dropped() {
    let mut rig = Rig::connected();
    rig.send("pump/1", "soon");
    rig.cycle().unwrap();

    assert_eq!(rig.pump_writes("1"), vec![false]);
    assert!(rig.published().is_empty());
}

#[test]
fn one_command_per_cycle() {
    let mut rig = Rig::connected();
    rig.send("pump/1", "100");
    rig.send("pump/3", "100");

    rig.cycle().unwrap();
    assert_eq!(rig.pump_writes("1"), vec![false, true, false]);
    assert_eq!(rig.pump_writes("3"), vec![false]);

    rig.cycle().unwrap();
    assert_eq!(rig.pump_writes("3"), vec![false, true, false]);
}

#[test]
fn separate_pump_topic_routes_status_events() {
    let mut config = SystemConfig::default();
    config.separate_pump_topic = true;
    let mut rig = Rig::with_config(config);
    rig.supervisor.connect(&mut rig.transport).unwrap();

    rig.send("pump/3", "500");
    rig.cycle().unwrap();

    let published = rig.published();
    assert_eq!(published.len(), 2);
    assert!(published.iter().all(|(t, _)| t == "habanero-status/aabb/pump"));
}

// ── Indicator commands ────────────────────────────────────────

#[test]
fn led_on_then_off() {
    let mut rig = Rig::connected();

    rig.send("led/indicator", "ON");
    rig.cycle().unwrap();
    assert!(rig.supervisor.indicator().is_on());
    assert!(rig.led.level());

    rig.send("led/indicator", "OFF");
    rig.cycle().unwrap();
    assert!(!rig.supervisor.indicator().is_on());
    assert!(!rig.led.level());

    // Anything but "ON" turns it off; repeated off causes no write.
    rig.send("led/indicator", "on");
    rig.cycle().unwrap();
    assert_eq!(rig.led.writes(), vec![false, true, false]);
}

// ── Malformed input ───────────────────────────────────────────

#[test]
fn three_segment_topic_never_reaches_the_core() {
    let mut rig = Rig::connected();
    assert!(!rig.transport.inject("habanero-controls/aabb/led", b"ON"));
    rig.cycle().unwrap();
    assert_eq!(rig.led.writes(), vec![false]);
}

#[test]
fn malformed_commands_are_dropped_with_one_warning_each() {
    let mut rig = Rig::connected();
    log_capture::start();

    assert!(rig.transport.inject_raw("habanero-controls/aabb/led", b"ON"));
    rig.cycle().unwrap();
    let warnings = log_capture::take(Level::Warn);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("habanero-controls/aabb/led"));
    assert_eq!(rig.led.writes(), vec![false]);

    rig.send("pump/1", "soon");
    rig.cycle().unwrap();
    let warnings = log_capture::take(Level::Warn);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("habanero-controls/aabb/pump/1"));
    assert_eq!(rig.pump_writes("1"), vec![false]);
    assert!(rig.published().is_empty());
}

#[test]
fn other_devices_commands_are_not_delivered() {
    let mut rig = Rig::connected();
    assert!(!rig.transport.inject("habanero-controls/ccdd/pump/1", b"1000"));
    rig.cycle().unwrap();
    assert_eq!(rig.pump_writes("1"), vec![false]);
}

#[test]
fn unknown_kind_is_ignored() {
    let mut rig = Rig::connected();
    rig.send("valve/1", "ON");
    rig.cycle().unwrap();
    assert_eq!(rig.led.writes(), vec![false]);
    assert!(rig.published().is_empty());
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn moisture_publishes_on_interval() {
    let mut rig = Rig::connected();
    rig.adc.set(32_000);

    // Cycles start at t = 0, 1000, ... 9000 ms.
    for _ in 0..10 {
        rig.cycle().unwrap();
    }
    assert_eq!(
        rig.published(),
        vec![(MOISTURE.to_string(), "32.0".to_string())]
    );
    assert_eq!(rig.supervisor.last_publish_ms(), 5000);

    rig.cycle().unwrap();
    assert_eq!(rig.published().len(), 1);
    assert_eq!(rig.supervisor.last_publish_ms(), 10_000);
}

#[test]
fn queue_overflow_publishes_latest_ten() {
    let mut rig = Rig::connected();
    for ts in 0..12 {
        rig.supervisor
            .queue_mut()
            .push(TelemetryEvent::PumpOff { id: id("1"), ts });
    }
    rig.cycle().unwrap();

    let payloads: Vec<String> = rig.published().into_iter().map(|(_, p)| p).collect();
    assert_eq!(payloads.len(), 10);
    assert_eq!(payloads.first().unwrap(), "OFF::1::2");
    assert_eq!(payloads.last().unwrap(), "OFF::1::11");
    assert!(rig.supervisor.queue().is_empty());
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn lost_link_ends_the_cycle_with_a_fault() {
    let mut rig = Rig::connected();
    rig.link.set_connected(false);
    assert_eq!(
        rig.cycle(),
        Err(Error::Connectivity(ConnectivityFault::LinkLost))
    );
}

#[test]
fn dropped_broker_session_is_fatal() {
    let mut rig = Rig::connected();
    rig.transport.drop_session();
    let err = rig.cycle().unwrap_err();
    assert_eq!(err, Error::Transport(TransportError::Disconnected));
    assert!(err.is_fatal());
}

#[test]
fn start_boots_runs_and_resets_once_when_link_drops() {
    let mut rig = Rig::new();
    let link = ScriptedLink::up_for(3);

    let fault = supervisor::start(
        &mut rig.supervisor,
        &mut rig.transport,
        &link,
        &mut rig.clock,
        &mut rig.system,
    );

    assert_eq!(fault, Error::Connectivity(ConnectivityFault::LinkLost));
    assert_eq!(rig.system.restarts(), 1);
    // Boot pattern: five 250 ms steps, lit on even steps.
    assert_eq!(rig.led.writes(), vec![false, true, false, true, false, true]);
    // Grace period is the last sleep before restart.
    assert_eq!(rig.clock.sleeps_ms.last(), Some(&5000));
    assert_eq!(rig.now_ms(), 1250 + 4 * 1000 + 5000);
}

#[test]
fn start_resets_when_broker_is_unreachable() {
    let mut rig = Rig::new();
    rig.transport.set_broker_reachable(false);

    let fault = supervisor::start(
        &mut rig.supervisor,
        &mut rig.transport,
        &rig.wifi,
        &mut rig.clock,
        &mut rig.system,
    );

    assert_eq!(fault, Error::Connectivity(ConnectivityFault::BrokerUnreachable));
    assert_eq!(rig.system.restarts(), 1);
    assert!(rig.transport.published().is_empty());
}

#[test]
fn boot_faults_log_wait_and_restart_once() {
    let config = SystemConfig::default();
    let mut clock = SimClock::default();
    let mut system = SystemAdapter::new();
    log_capture::start();

    supervisor::reset(
        &HwInitError::GpioConfigFailed(258),
        config.reset_grace_ms(),
        &mut clock,
        &mut system,
    );

    assert_eq!(clock.sleeps_ms, vec![5000]);
    assert_eq!(system.restarts(), 1);
    let errors = log_capture::take(Level::Error);
    assert_eq!(errors[0], "Error: GPIO config failed (rc=258)");
    assert_eq!(errors[1], "Resetting in 5000ms...");

    supervisor::reset(&ConnectivityError::DriverInit, 0, &mut clock, &mut system);
    assert_eq!(system.restarts(), 2);
    assert!(log_capture::take(Level::Error)[0].contains("driver initialisation failed"));
}
