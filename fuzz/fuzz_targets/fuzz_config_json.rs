//! Fuzz target: `SystemConfig::from_json`
//!
//! Arbitrary documents must either be rejected or yield a configuration
//! that passes its own validation.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use habanero::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SystemConfig::from_json(text) {
        assert!(config.validate().is_ok());
        assert!(config.pump_min_ms <= config.pump_max_ms);
        assert!(config.pumps.iter().all(|p| (0..=48).contains(&p.gpio)));
    }
});
