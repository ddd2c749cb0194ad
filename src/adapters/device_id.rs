//! Device identity derived from the ESP32 factory MAC address.
//!
//! The full 6-byte MAC, rendered as lowercase hex, is the second topic
//! segment in every command and status topic and the MQTT client id.

use crate::app::topics::DeviceId;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// This board's identity.
pub fn device_id() -> DeviceId {
    DeviceId::from_bytes(&read_mac())
}
