//! Per-thread capture of `log` records.
//!
//! The logger is process-global, so records are buffered per test thread
//! to keep parallel tests apart.

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, Log, Metadata, Record};

struct Capture;

static CAPTURE: Capture = Capture;
static INSTALL: Once = Once::new();

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

impl Log for Capture {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS.with(|r| {
            r.borrow_mut()
                .push((record.level(), record.args().to_string()));
        });
    }

    fn flush(&self) {}
}

/// Install the capturing logger and clear this thread's buffer.
pub fn start() {
    INSTALL.call_once(|| {
        // Only fails if another logger won the race, which no test installs.
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);
    });
    RECORDS.with(|r| r.borrow_mut().clear());
}

/// Messages logged on this thread at exactly `level` since the last call.
pub fn take(level: Level) -> Vec<String> {
    RECORDS.with(|r| {
        let mut records = r.borrow_mut();
        let (hit, rest): (Vec<_>, Vec<_>) = records.drain(..).partition(|(l, _)| *l == level);
        *records = rest;
        hit.into_iter().map(|(_, msg)| msg).collect()
    })
}
