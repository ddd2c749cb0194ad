//! Actuator drivers and hardware initialisation.

pub mod hw_init;
pub mod pump;
pub mod status_led;
