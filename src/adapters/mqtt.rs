//! MQTT adapter: broker session and command ingress.
//!
//! The ESP-IDF client runs its connection on a dedicated `mqtt-rx`
//! thread.  That thread turns broker events into [`InboundMessage`]s and
//! [`BrokerStatus`] transitions for the control loop; it never touches
//! the output bank.
//!
//! Re-subscription after a reconnect is the control loop's job: it calls
//! [`MqttAdapter::subscribe`] each time [`BROKER_STATUS`] reports
//! `Connected`, since the client keeps no subscriptions across sessions.
//!
//! [`BROKER_STATUS`]: crate::channels::BROKER_STATUS

use log::{debug, info};

use crate::app::commands::InboundMessage;
use crate::channels::{BrokerStatus, CommandQueue};

#[cfg(target_os = "espidf")]
use crate::{
    channels::{BROKER_STATUS, COMMANDS},
    config::NodeConfig,
    error::CommsError,
};
#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};
#[cfg(target_os = "espidf")]
use log::{error, warn};

/// Stack for the connection thread.  Payload copies are bounded, so this
/// only needs room for the ESP-IDF event plumbing.
#[cfg(target_os = "espidf")]
const RX_STACK_SIZE: usize = 6 * 1024;

/// How a received payload arrived from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// Whole payload in one event.
    Complete,
    /// First piece of a payload the client split; `total_len` is the full size.
    First { total_len: usize },
    /// Any later piece of a split payload.
    Continuation,
}

/// Route one received publish into `queue`.
///
/// A split payload is reported once, on its first piece, as oversized;
/// continuation pieces are dropped.  Returns `true` if a message was
/// queued.
pub fn forward_received<const N: usize>(
    queue: &CommandQueue<N>,
    topic: Option<&str>,
    data: &[u8],
    chunk: Chunk,
) -> bool {
    let msg = match chunk {
        Chunk::Complete => InboundMessage::from_received(topic, data),
        Chunk::First { total_len } => {
            debug!("MQTT: fragmented payload ({} bytes total)", total_len);
            InboundMessage::fragmented(topic, total_len)
        }
        Chunk::Continuation => return false,
    };
    queue.deliver(msg);
    true
}

/// Log a broker transition.  Split out so both backends word it the same.
pub fn log_status(status: BrokerStatus) {
    match status {
        BrokerStatus::Connected => info!("MQTT: connected to broker"),
        BrokerStatus::Disconnected => info!("MQTT: disconnected from broker"),
        BrokerStatus::Error => info!("MQTT: client reported an error"),
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct MqttAdapter {
    client: EspMqttClient<'static>,
    topic: String,
}

#[cfg(target_os = "espidf")]
impl MqttAdapter {
    /// Create the client and spawn the `mqtt-rx` thread.  The session
    /// itself comes up asynchronously and is announced on `BROKER_STATUS`.
    pub fn start(config: &NodeConfig) -> Result<Self, CommsError> {
        let mqtt_cfg = MqttClientConfiguration {
            client_id: Some(config.client_id.as_str()),
            ..Default::default()
        };

        let (client, connection) =
            EspMqttClient::new(&config.broker_uri, &mqtt_cfg).map_err(|e| {
                error!("MQTT: client init for {} failed: {}", config.broker_uri, e);
                CommsError::MqttConnectFailed
            })?;

        std::thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(RX_STACK_SIZE)
            .spawn(move || run_connection(connection))
            .map_err(|e| {
                error!("MQTT: spawn mqtt-rx failed: {}", e);
                CommsError::MqttThreadSpawnFailed
            })?;

        info!(
            "MQTT: client '{}' started for {}",
            config.client_id, config.broker_uri
        );
        Ok(Self {
            client,
            topic: config.command_topic.clone(),
        })
    }

    /// Subscribe to the command topic at QoS 0.
    pub fn subscribe(&mut self) -> Result<(), CommsError> {
        self.client
            .subscribe(&self.topic, QoS::AtMostOnce)
            .map_err(|e| {
                warn!("MQTT: subscribe to '{}' failed: {}", self.topic, e);
                CommsError::MqttSubscribeFailed
            })?;
        info!("MQTT: subscribed to '{}'", self.topic);
        Ok(())
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[cfg(target_os = "espidf")]
fn run_connection(mut connection: EspMqttConnection) {
    info!("mqtt-rx: event loop running");
    while let Ok(event) = connection.next() {
        match event.payload() {
            EventPayload::Connected(_) => {
                log_status(BrokerStatus::Connected);
                BROKER_STATUS.signal(BrokerStatus::Connected);
            }
            EventPayload::Disconnected => {
                log_status(BrokerStatus::Disconnected);
                BROKER_STATUS.signal(BrokerStatus::Disconnected);
            }
            EventPayload::Received {
                topic,
                data,
                details,
                ..
            } => {
                let chunk = match details {
                    Details::Complete => Chunk::Complete,
                    Details::InitialChunk(c) => Chunk::First {
                        total_len: c.total_data_size,
                    },
                    Details::SubsequentChunk(_) => Chunk::Continuation,
                };
                forward_received(&COMMANDS, topic, data, chunk);
            }
            EventPayload::Error(e) => {
                warn!("mqtt-rx: {}", e);
                BROKER_STATUS.signal(BrokerStatus::Error);
            }
            _ => {}
        }
    }
    info!("mqtt-rx: connection closed");
}
