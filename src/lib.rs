//! Habanero irrigation controller firmware library.
//!
//! Exposes the control core, drivers and adapters for integration testing
//! and for the `espidf` binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module; on any other target
//! the adapters fall back to in-memory simulations.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;
