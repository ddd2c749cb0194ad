//! GPIO / ADC assignments for the Habanero controller board.
//!
//! Single source of truth for the default wiring. [`SystemConfig`] copies
//! these into its pump and sensor tables, so a board variant only needs a
//! config override, not a code change.
//!
//! [`SystemConfig`]: crate::config::SystemConfig

// ---------------------------------------------------------------------------
// Pump relays (active HIGH)
// ---------------------------------------------------------------------------

pub const PUMP_1_GPIO: i32 = 12;
pub const PUMP_2_GPIO: i32 = 13;
pub const PUMP_3_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Capacitive soil-moisture probes (ADC1)
// ---------------------------------------------------------------------------

/// ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const MOISTURE_1_ADC_CHANNEL: u32 = 3;
/// ADC1 channel 4 (GPIO 5 on ESP32-S3). Wired, not sampled by default.
pub const MOISTURE_2_ADC_CHANNEL: u32 = 4;
/// ADC1 channel 5 (GPIO 6 on ESP32-S3). Wired, not sampled by default.
pub const MOISTURE_3_ADC_CHANNEL: u32 = 5;

// ---------------------------------------------------------------------------
// Status indicator
// ---------------------------------------------------------------------------

/// Single-colour status LED (active HIGH).
pub const STATUS_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Chip limits (ESP32-S3)
// ---------------------------------------------------------------------------

/// Highest GPIO number on the package.
pub const MAX_GPIO: i32 = 48;
/// ADC1 exposes channels 0..=9.
pub const ADC1_CHANNEL_COUNT: u32 = 10;
