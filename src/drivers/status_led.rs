//! Status indicator driver.
//!
//! A single-colour LED shared by the boot pattern, the `led` command and
//! the pump liveness blink. Built on [`ActuationChannel`], so it inherits
//! the write-on-change behaviour.

use embedded_hal::digital::OutputPin;

use crate::app::ports::ClockPort;
use crate::drivers::pump::ActuationChannel;

pub struct Indicator<P> {
    channel: ActuationChannel<P>,
}

impl<P: OutputPin> Indicator<P> {
    pub fn new(pin: P) -> Self {
        Self {
            channel: ActuationChannel::new(pin),
        }
    }

    pub fn set(&mut self, on: bool) {
        self.channel.set(on);
    }

    pub fn is_on(&self) -> bool {
        self.channel.is_on()
    }

    /// Boot pattern: `steps` phases of `step_ms`, lit on even phases.
    ///
    /// An odd step count leaves the indicator lit.
    pub fn boot_pattern(&mut self, steps: u8, step_ms: u32, clock: &mut impl ClockPort) {
        for i in 0..steps {
            self.set(i % 2 == 0);
            clock.delay_ms(step_ms);
        }
    }

    pub fn pin(&self) -> &P {
        self.channel.pin()
    }
}
