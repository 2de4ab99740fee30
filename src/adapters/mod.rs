//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                 |
//! |-------------|--------------------|-----------------------------|
//! | `hardware`  | ActuatorPort       | Strike + indicator GPIO     |
//! | `log_sink`  | EventSink          | Serial log output           |
//! | `mqtt`      | TransportPort      | ESP-IDF MQTT client         |
//! | `time`      | ClockPort          | ESP32 system timer          |
//! | `wifi`      | ConnectivityPort   | ESP-IDF WiFi STA            |
//! | `device_id` |:                  | eFuse MAC → MQTT client id  |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
