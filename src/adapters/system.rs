//! Whole-device restart.
//!
//! On hardware `restart` calls `esp_restart()` and never returns. On host
//! it records the request and returns, so a harness can rebuild state and
//! start over.

use log::warn;

use crate::app::ports::SystemPort;

#[derive(Debug, Default)]
pub struct SystemAdapter {
    #[cfg(not(target_os = "espidf"))]
    restarts: u32,
}

impl SystemAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of restarts requested so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

impl SystemPort for SystemAdapter {
    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        warn!("system: restarting");
        unsafe { esp_idf_svc::sys::esp_restart() }
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        self.restarts += 1;
        warn!("system(sim): restart #{}", self.restarts);
    }
}
