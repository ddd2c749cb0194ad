//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements              | Connects to               |
//! |-------------|-------------------------|---------------------------|
//! | `hardware`  | OutputPin, AnalogSource | ESP32 GPIO, ADC1 oneshot  |
//! | `mqtt`      | MessagingPort           | ESP-IDF MQTT client       |
//! | `system`    | SystemPort              | `esp_restart()`           |
//! | `time`      | ClockPort               | ESP32 system timer        |
//! | `wifi`      | ConnectivityPort        | ESP-IDF WiFi STA          |
//! | `device_id` | (identity only)         | eFuse factory MAC         |

pub mod device_id;
pub mod hardware;
pub mod mqtt;
pub mod system;
pub mod time;
pub mod wifi;
