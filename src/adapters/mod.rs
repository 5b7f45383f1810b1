//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements       | Connects to                 |
//! |------------|------------------|-----------------------------|
//! | `hardware` | OutputPort       | Six lamp GPIOs              |
//! | `log_sink` | EventSink        | Serial log output           |
//! | `mqtt`     | (ingress)        | ESP-IDF MQTT client         |
//! | `nvs`      | ConfigPort       | NVS / in-memory store       |
//! | `wifi`     | ConnectivityPort | ESP-IDF WiFi STA            |

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod wifi;
