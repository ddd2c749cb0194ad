//! Pump controller behaviour with real drivers over mock pins.

use habanero::app::events::TelemetryEvent;
use habanero::app::ports::ClockPort;
use habanero::app::pump::{PumpController, PumpLimits, PumpPhase};
use habanero::app::queue::TelemetryQueue;
use habanero::config::ChannelId;
use habanero::drivers::pump::ActuationChannel;
use habanero::drivers::status_led::Indicator;
use habanero::error::ValidationError;

use crate::mock_hw::{MockPin, SimClock};

struct Bench {
    pump: PumpController<MockPin>,
    pump_pin: MockPin,
    indicator: Indicator<MockPin>,
    led_pin: MockPin,
    clock: SimClock,
    queue: TelemetryQueue,
}

fn bench(start_ms: u64) -> Bench {
    let pump_pin = MockPin::default();
    let led_pin = MockPin::default();
    Bench {
        pump: PumpController::new(
            ChannelId::try_from("2").unwrap(),
            ActuationChannel::new(pump_pin.clone()),
            PumpLimits::default(),
        ),
        pump_pin,
        indicator: Indicator::new(led_pin.clone()),
        led_pin,
        clock: SimClock::at(start_ms),
        queue: TelemetryQueue::new(),
    }
}

impl Bench {
    fn fire(&mut self, ms: i64) -> Result<(), ValidationError> {
        self.pump
            .fire(ms, &mut self.indicator, &mut self.clock, &mut self.queue)
    }
}

#[test]
fn fire_blocks_for_duration_and_blinks() {
    let mut b = bench(7_000);
    b.fire(1000).unwrap();

    assert_eq!(b.clock.now_ms(), 8_000);
    assert_eq!(b.pump_pin.writes(), vec![false, true, false]);
    assert_eq!(b.clock.sleeps_ms, vec![125; 8]);
    // Indicator ends dark after the last blink.
    assert!(!b.led_pin.level());
    assert_eq!(b.pump.phase(), PumpPhase::Idle);

    let events = b.queue.drain();
    assert_eq!(
        events.as_slice(),
        &[
            TelemetryEvent::PumpOn {
                id: ChannelId::try_from("2").unwrap(),
                duration_ms: 1000,
                ts: 7_000,
            },
            TelemetryEvent::PumpOff {
                id: ChannelId::try_from("2").unwrap(),
                ts: 8_000,
            },
        ]
    );
}

#[test]
fn duration_rounds_up_to_whole_blink_periods() {
    let mut b = bench(0);
    b.fire(60).unwrap();
    assert_eq!(b.clock.now_ms(), 250);
    match b.queue.drain().last() {
        Some(TelemetryEvent::PumpOff { ts, .. }) => assert_eq!(*ts, 250),
        other => panic!("expected PumpOff, got {:?}", other),
    }
}

#[test]
fn minimum_duration_is_accepted() {
    let mut b = bench(0);
    assert_eq!(b.fire(50), Ok(()));
    assert_eq!(b.queue.len(), 2);
}

#[test]
fn below_minimum_touches_nothing() {
    let mut b = bench(0);
    assert_eq!(b.fire(49), Err(ValidationError::DurationTooShort));
    assert_eq!(b.fire(0), Err(ValidationError::DurationTooShort));
    assert_eq!(b.fire(i64::MIN), Err(ValidationError::DurationTooShort));

    assert_eq!(b.pump_pin.writes(), vec![false]);
    assert_eq!(b.led_pin.writes(), vec![false]);
    assert_eq!(b.clock.now_ms(), 0);
    assert!(b.queue.is_empty());
}

#[test]
fn huge_request_is_clamped() {
    let mut b = bench(0);
    b.fire(i64::MAX).unwrap();
    assert_eq!(b.clock.now_ms(), 60_000);
    assert!(matches!(
        b.queue.drain().first(),
        Some(TelemetryEvent::PumpOn { duration_ms: 60_000, .. })
    ));
}

#[test]
fn non_blocking_mode_polls_to_completion() {
    let mut b = bench(0);
    let deadline = b.pump.begin(300, 100, &mut b.queue).unwrap();
    assert_eq!(deadline, 400);
    assert!(b.pump_pin.level());

    assert!(!b.pump.poll(399, &mut b.queue));
    assert!(b.pump.poll(450, &mut b.queue));
    assert!(!b.pump_pin.level());

    // Off is stamped with the poll time, not the deadline.
    assert!(matches!(
        b.queue.drain().last(),
        Some(TelemetryEvent::PumpOff { ts: 450, .. })
    ));
}

#[test]
fn custom_limits_apply() {
    let limits = PumpLimits {
        min_ms: 100,
        max_ms: 1_000,
        blink_half_period_ms: 50,
    };
    assert_eq!(limits.effective(99), None);
    assert_eq!(limits.effective(5_000), Some(1_000));
}
