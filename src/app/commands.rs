//! Inbound commands to the application service.
//!
//! The MQTT adapter turns every received publish into an
//! [`InboundMessage`] and hands it to the control loop, which passes it to
//! [`AppService::handle_message`](super::service::AppService::handle_message).
//! Payloads are copied into fixed-capacity buffers; anything longer than
//! [`MAX_COMMAND_LEN`] is recorded only by its length.

use heapless::{String, Vec};

use crate::phase::MAX_COMMAND_LEN;

/// Longest topic name kept for matching.
pub const TOPIC_CAP: usize = 128;

/// Command payload as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Fits under the ceiling; carried verbatim.
    Command(Vec<u8, MAX_COMMAND_LEN>),
    /// Longer than [`MAX_COMMAND_LEN`], or delivered in fragments.
    Oversized { len: usize },
}

/// One message from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// `None` when the broker did not supply a topic or it exceeds
    /// [`TOPIC_CAP`]; such messages can never match the command topic.
    pub topic: Option<String<TOPIC_CAP>>,
    pub payload: Payload,
}

impl InboundMessage {
    /// Build from a complete publish.
    pub fn from_received(topic: Option<&str>, data: &[u8]) -> Self {
        let payload = match Vec::from_slice(data) {
            Ok(bytes) => Payload::Command(bytes),
            Err(()) => Payload::Oversized { len: data.len() },
        };
        Self {
            topic: copy_topic(topic),
            payload,
        }
    }

    /// Build from the first fragment of a payload the client split up.
    pub fn fragmented(topic: Option<&str>, total_len: usize) -> Self {
        Self {
            topic: copy_topic(topic),
            payload: Payload::Oversized { len: total_len },
        }
    }

    pub fn topic_str(&self) -> Option<&str> {
        self.topic.as_deref()
    }
}

fn copy_topic(topic: Option<&str>) -> Option<String<TOPIC_CAP>> {
    topic.and_then(|t| String::try_from(t).ok())
}
