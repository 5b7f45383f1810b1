//! Node configuration parameters.
//!
//! All tunable parameters for the traffic node.  Factory defaults come from
//! [`NodeConfig::default`]; a JSON override can be baked in at build time
//! and the active config is persisted in NVS (see
//! [`NvsAdapter`](crate::adapters::nvs::NvsAdapter)).

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::commands::TOPIC_CAP;
use crate::app::ports::{ConfigError, ConfigPort};

/// Core node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    // --- WiFi station ---
    /// Access point SSID (1-32 bytes; empty = not provisioned)
    pub wifi_ssid: String,
    /// WPA2 passphrase (8-64 bytes, or empty for an open network)
    pub wifi_password: String,
    /// Upper bound on the reconnect backoff (seconds)
    pub wifi_max_backoff_secs: u32,

    // --- MQTT ---
    /// Broker URI, e.g. `mqtt://host:1883`
    pub broker_uri: String,
    /// MQTT client identifier
    pub client_id: String,
    /// The single topic phase commands arrive on
    pub command_topic: String,

    // --- Timing ---
    /// Control loop idle poll interval (milliseconds)
    pub poll_interval_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // WiFi
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            wifi_max_backoff_secs: 60,

            // MQTT
            broker_uri: "mqtt://172.20.10.6:1883".into(),
            client_id: "traffic-node".into(),
            command_topic: "semaforos/comandos".into(),

            // Timing
            poll_interval_ms: 10,
        }
    }
}

impl NodeConfig {
    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: NodeConfig = serde_json::from_str(text).map_err(|_| ConfigError::Parse)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_topic.is_empty() {
            return Err(ConfigError::ValidationFailed("command_topic must not be empty"));
        }
        if self.command_topic.len() > TOPIC_CAP {
            return Err(ConfigError::ValidationFailed("command_topic too long"));
        }
        if self.command_topic.contains(['+', '#']) {
            return Err(ConfigError::ValidationFailed(
                "command_topic must not contain MQTT wildcards",
            ));
        }
        if !["mqtt://", "mqtts://", "ws://", "wss://"]
            .iter()
            .any(|scheme| self.broker_uri.starts_with(scheme))
        {
            return Err(ConfigError::ValidationFailed(
                "broker_uri must start with mqtt://, mqtts://, ws:// or wss://",
            ));
        }
        if self.client_id.is_empty() || self.client_id.len() > 64 {
            return Err(ConfigError::ValidationFailed("client_id must be 1-64 bytes"));
        }
        if self.wifi_ssid.len() > 32 {
            return Err(ConfigError::ValidationFailed("wifi_ssid must be at most 32 bytes"));
        }
        if !self.wifi_password.is_empty() && !(8..=64).contains(&self.wifi_password.len()) {
            return Err(ConfigError::ValidationFailed(
                "wifi_password must be empty or 8-64 bytes",
            ));
        }
        if !(1..=1000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be 1-1000"));
        }
        if !(2..=3600).contains(&self.wifi_max_backoff_secs) {
            return Err(ConfigError::ValidationFailed(
                "wifi_max_backoff_secs must be 2-3600",
            ));
        }
        Ok(())
    }
}

/// Pick the config to boot with.
///
/// A valid stored config wins.  Otherwise the build-time JSON override
/// (if any) is parsed and persisted; failing that, factory defaults.
pub fn resolve_boot_config(store: &mut impl ConfigPort, baked: Option<&str>) -> NodeConfig {
    match store.load() {
        Ok(cfg) => return cfg,
        Err(ConfigError::NotFound) => info!("Config: nothing stored"),
        Err(e) => warn!("Config: stored config unusable ({})", e),
    }

    let Some(text) = baked else {
        info!("Config: using factory defaults");
        return NodeConfig::default();
    };

    match NodeConfig::from_json(text) {
        Ok(cfg) => {
            if let Err(e) = store.save(&cfg) {
                warn!("Config: could not persist build-time config ({})", e);
            }
            info!("Config: applied build-time override");
            cfg
        }
        Err(e) => {
            warn!("Config: build-time override rejected ({}), using defaults", e);
            NodeConfig::default()
        }
    }
}
