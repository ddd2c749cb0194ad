//! Fuzz target: `router::decode`
//!
//! Splits the input into a topic and a payload at the first NUL and feeds
//! both to the command decoder. It must never panic, and any command it
//! yields must come from a four-segment topic.
//!
//! cargo fuzz run fuzz_command_router

#![no_main]

use habanero::app::commands::Command;
use habanero::app::router;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let (topic, payload) = match data.iter().position(|&b| b == 0) {
        Some(i) => (&data[..i], &data[i + 1..]),
        None => (data, &[][..]),
    };

    if let Ok(Some(cmd)) = router::decode(topic, payload) {
        let topic = core::str::from_utf8(topic).expect("decoded topic must be UTF-8");
        assert_eq!(topic.split('/').count(), 4);
        if let Command::FirePump { pump_id, .. } = cmd {
            assert!(topic.ends_with(pump_id.as_str()));
        }
    }
});
