//! Application core: the device control logic, with no direct I/O.
//!
//! Command routing, the pump state machine, the telemetry queue and the
//! supervisor loop. All interaction with hardware and the network happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod pump;
pub mod queue;
pub mod router;
pub mod supervisor;
pub mod topics;
