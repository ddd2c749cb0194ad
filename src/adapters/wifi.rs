//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation with a shared link flag.
//!
//! ## Association policy
//!
//! Boot blocks until the station is associated, retrying every second.
//! After that the adapter only reports link state: a lost link is a fatal
//! fault for the supervisor, which resets the whole device instead of
//! reconnecting in place.

use core::fmt;
use log::info;

use crate::app::ports::ConnectivityPort;

/// Delay between association attempts at boot.
pub const ASSOCIATION_RETRY_MS: u32 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    DriverInit,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::DriverInit => write!(f, "WiFi driver initialisation failed"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

/// Validated station credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut c = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        c.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        c.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(c)
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF station
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::modem::Modem;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use log::warn;

    use super::*;

    pub struct WifiAdapter {
        wifi: BlockingWifi<EspWifi<'static>>,
    }

    impl WifiAdapter {
        /// Bring the station up and block until it is associated.
        pub fn associate(
            modem: Modem,
            sys_loop: EspSystemEventLoop,
            nvs: Option<EspDefaultNvsPartition>,
            credentials: &WifiCredentials,
        ) -> Result<Self, ConnectivityError> {
            let driver_err = |e: esp_idf_svc::sys::EspError| {
                warn!("WiFi: driver error {:?}", e);
                ConnectivityError::DriverInit
            };

            let esp_wifi = EspWifi::new(modem, sys_loop.clone(), nvs).map_err(driver_err)?;
            let mut wifi = BlockingWifi::wrap(esp_wifi, sys_loop).map_err(driver_err)?;

            let auth_method = if credentials.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPAWPA2Personal
            };
            wifi.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: credentials
                    .ssid
                    .as_str()
                    .try_into()
                    .map_err(|_| ConnectivityError::InvalidSsid)?,
                password: credentials
                    .password
                    .as_str()
                    .try_into()
                    .map_err(|_| ConnectivityError::InvalidPassword)?,
                auth_method,
                ..Default::default()
            }))
            .map_err(driver_err)?;
            wifi.start().map_err(driver_err)?;
            info!("WiFi: started, connecting to '{}'", credentials.ssid());

            loop {
                info!("Attempting to connect....");
                match wifi.connect().and_then(|()| wifi.wait_netif_up()) {
                    Ok(()) => break,
                    Err(e) => {
                        warn!("WiFi: association failed: {:?}", e);
                        let _ = wifi.disconnect();
                        FreeRtos::delay_ms(ASSOCIATION_RETRY_MS);
                    }
                }
            }

            if let Ok(ip) = wifi.wifi().sta_netif().get_ip_info() {
                info!("WiFi: connected, ip {}", ip.ip);
            }
            Ok(Self { wifi })
        }
    }

    impl ConnectivityPort for WifiAdapter {
        fn is_connected(&self) -> bool {
            self.wifi.is_connected().unwrap_or(false)
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp::WifiAdapter;

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// Shared handle for flipping the simulated link from outside.
    #[derive(Debug, Clone)]
    pub struct LinkHandle(Arc<AtomicBool>);

    impl LinkHandle {
        pub fn set_connected(&self, up: bool) {
            self.0.store(up, Ordering::Relaxed);
        }
    }

    pub struct WifiAdapter {
        ssid: heapless::String<32>,
        link: Arc<AtomicBool>,
    }

    impl WifiAdapter {
        /// Simulated association always succeeds on the first attempt.
        pub fn associate(credentials: &WifiCredentials) -> Result<Self, ConnectivityError> {
            info!("Attempting to connect....");
            info!("WiFi(sim): connected to '{}'", credentials.ssid());
            Ok(Self {
                ssid: credentials.ssid.clone(),
                link: Arc::new(AtomicBool::new(true)),
            })
        }

        pub fn ssid(&self) -> &str {
            &self.ssid
        }

        pub fn link_handle(&self) -> LinkHandle {
            LinkHandle(self.link.clone())
        }
    }

    impl ConnectivityPort for WifiAdapter {
        fn is_connected(&self) -> bool {
            self.link.load(Ordering::Relaxed)
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::{LinkHandle, WifiAdapter};

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
