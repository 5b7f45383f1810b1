//! Inter-task communication between the MQTT connection thread and the
//! control loop.
//!
//! ```text
//! ┌──────────────┐  InboundMessage  ┌──────────────┐
//! │   mqtt-rx    │────────────────▶│ Control Loop │
//! │  (thread)    │  BrokerStatus    │  (main)      │
//! └──────────────┘────────────────▶└──────────────┘
//! ```
//!
//! Commands travel through a bounded `embassy-sync` channel.  When the
//! loop falls behind the oldest queued command is dropped: only the most
//! recent phase matters to the lamps.  Broker status is a [`Signal`], so
//! the loop only ever sees the latest transition.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::signal::Signal;
use log::warn;

use crate::app::commands::InboundMessage;

/// Channel depth for inbound commands.
pub const COMMAND_DEPTH: usize = 8;

/// Bounded command queue that favours the newest message when full.
pub struct CommandQueue<const N: usize> {
    inner: Channel<CriticalSectionRawMutex, InboundMessage, N>,
}

impl<const N: usize> CommandQueue<N> {
    pub const fn new() -> Self {
        Self { inner: Channel::new() }
    }

    /// Enqueue `msg`.  Returns `false` if an older message had to be
    /// evicted to make room.
    pub fn deliver(&self, msg: InboundMessage) -> bool {
        let mut msg = msg;
        let mut evicted = false;
        loop {
            match self.inner.try_send(msg) {
                Ok(()) => return !evicted,
                Err(TrySendError::Full(back)) => {
                    if self.inner.try_receive().is_ok() && !evicted {
                        warn!("CommandQueue: full, dropping oldest command");
                    }
                    evicted = true;
                    msg = back;
                }
            }
        }
    }

    /// Next pending message, oldest first.
    pub fn next(&self) -> Option<InboundMessage> {
        self.inner.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Inbound commands: mqtt-rx → control loop.
pub static COMMANDS: CommandQueue<COMMAND_DEPTH> = CommandQueue::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerStatus {
    Connected,
    Disconnected,
    Error,
}

/// Latest broker connection transition.
pub static BROKER_STATUS: Signal<CriticalSectionRawMutex, BrokerStatus> = Signal::new();
