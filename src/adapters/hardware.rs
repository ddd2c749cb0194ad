//! Hardware adapter. Bridges raw peripherals to the domain's pin and
//! analog traits.
//!
//! [`GpioOutput`] is an `embedded_hal` output pin over
//! [`hw_init::gpio_write`]; [`AdcInput`] is an [`AnalogSource`] over
//! [`hw_init::adc1_read_u16`]. Pins must have been configured by
//! [`hw_init::init_peripherals`] first. On non-espidf targets the
//! underlying calls hit the simulation atomics.

use core::fmt;

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::app::ports::AnalogSource;
use crate::drivers::hw_init;

// ── GPIO output ───────────────────────────────────────────────

/// Raw ESP-IDF error code from a failed pin write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub i32);

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gpio write failed (rc={})", self.0)
    }
}

impl digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Push-pull output on one GPIO.
#[derive(Debug)]
pub struct GpioOutput {
    gpio: i32,
}

impl GpioOutput {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}

impl ErrorType for GpioOutput {
    type Error = GpioError;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), GpioError> {
        hw_init::gpio_write(self.gpio, false).map_err(GpioError)
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        hw_init::gpio_write(self.gpio, true).map_err(GpioError)
    }
}

// ── ADC input ─────────────────────────────────────────────────

/// One ADC1 oneshot channel.
#[derive(Debug)]
pub struct AdcInput {
    channel: u32,
}

impl AdcInput {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }
}

impl AnalogSource for AdcInput {
    fn read_raw(&mut self) -> u16 {
        hw_init::adc1_read_u16(self.channel)
    }
}
