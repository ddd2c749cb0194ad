//! Pump relay output (one per pump).
//!
//! [`ActuationChannel`] wraps any `embedded_hal` output pin and only
//! touches the pin when the commanded state changes, so repeated `set`
//! calls have no physical effect.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator: run-time limits are enforced by the
//! [`PumpController`](crate::app::pump::PumpController).

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

pub struct ActuationChannel<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> ActuationChannel<P> {
    /// Take ownership of the pin and drive it LOW.
    pub fn new(mut pin: P) -> Self {
        if pin.set_low().is_err() {
            warn!("actuation: initial pin reset failed");
        }
        Self { pin, on: false }
    }

    /// Command the output. Driver faults are logged, never returned.
    pub fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        if let Err(e) = self.pin.set_state(PinState::from(on)) {
            warn!("actuation: pin write failed ({:?})", e);
        }
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Borrow the underlying pin.
    pub fn pin(&self) -> &P {
        &self.pin
    }
}
