//! Application service: the hexagonal core.
//!
//! [`AppService`] runs one command to completion at a time:
//! topic filter → size ceiling → transduce → commit → event.
//! The output bank and event sink are injected at call sites, so the whole
//! path is testable with mock adapters.
//!
//! ```text
//!  InboundMessage ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                     │       AppService        │
//!     OutputBank  ◀── │  topic · ceiling · phase │
//!                     └────────────────────────┘
//! ```

use heapless::Vec;
use log::{error, info};

use crate::bank::OutputBank;
use crate::config::NodeConfig;
use crate::phase::{self, MAX_COMMAND_LEN, Outcome};
use crate::signal::OutputLineState;

use super::commands::{InboundMessage, Payload, TOPIC_CAP};
use super::events::AppEvent;
use super::ports::{EventSink, OutputPort};

/// Running command counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandStats {
    /// Messages handed to the service, any topic.
    pub received: u32,
    /// Commands that selected a phase.
    pub applied: u32,
    /// Commands that matched no phase.
    pub unrecognized: u32,
    /// Payloads over the length ceiling.
    pub oversized: u32,
    /// Messages on other topics.
    pub ignored: u32,
}

pub struct AppService {
    command_topic: Option<heapless::String<TOPIC_CAP>>,
    stats: CommandStats,
    last_outcome: Option<Outcome>,
}

impl AppService {
    /// The topic comes from a validated [`NodeConfig`]; an over-long topic
    /// leaves the service matching nothing.
    pub fn new(config: &NodeConfig) -> Self {
        let command_topic = heapless::String::try_from(config.command_topic.as_str()).ok();
        Self {
            command_topic,
            stats: CommandStats::default(),
            last_outcome: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initialise the output bank (all lamps off).  Must run before the
    /// first command is handled.
    pub fn start<P: OutputPort>(&mut self, bank: &mut OutputBank<P>, sink: &mut impl EventSink) {
        bank.initialize();
        sink.emit(&AppEvent::Started);
        info!("AppService started, listening on {:?}", self.command_topic());
    }

    /// Switch to the topic of a freshly loaded config.  Lamp state and
    /// counters are kept.
    pub fn retarget(&mut self, config: &NodeConfig) {
        self.command_topic = heapless::String::try_from(config.command_topic.as_str()).ok();
        info!("AppService: command topic now {:?}", self.command_topic());
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one broker message.
    pub fn handle_message<P: OutputPort>(
        &mut self,
        msg: &InboundMessage,
        bank: &mut OutputBank<P>,
        sink: &mut impl EventSink,
    ) {
        self.stats.received = self.stats.received.wrapping_add(1);

        let on_topic = matches!(
            (msg.topic_str(), self.command_topic()),
            (Some(got), Some(want)) if got == want
        );
        if !on_topic {
            self.stats.ignored = self.stats.ignored.wrapping_add(1);
            sink.emit(&AppEvent::ForeignTopic);
            return;
        }

        match &msg.payload {
            Payload::Command(bytes) => {
                self.apply_command(bytes, bank, sink);
            }
            Payload::Oversized { len } => {
                self.stats.oversized = self.stats.oversized.wrapping_add(1);
                self.last_outcome = Some(Outcome::Unrecognized);
                if self.commit(bank, &OutputLineState::BASELINE, sink) {
                    sink.emit(&AppEvent::OversizedCommand { len: *len });
                }
            }
        }
    }

    /// Transduce `command` and drive the lamps to the result.
    pub fn apply_command<P: OutputPort>(
        &mut self,
        command: &[u8],
        bank: &mut OutputBank<P>,
        sink: &mut impl EventSink,
    ) -> Outcome {
        let t = phase::transduce(command);
        self.last_outcome = Some(t.outcome);

        if !self.commit(bank, &t.state, sink) {
            return t.outcome;
        }

        match t.outcome {
            Outcome::Phase(phase) => {
                self.stats.applied = self.stats.applied.wrapping_add(1);
                sink.emit(&AppEvent::PhaseApplied {
                    phase,
                    state: t.state,
                });
            }
            Outcome::Unrecognized => {
                self.stats.unrecognized = self.stats.unrecognized.wrapping_add(1);
                let len = command.len().min(MAX_COMMAND_LEN);
                let payload = Vec::from_slice(&command[..len]).unwrap_or_default();
                sink.emit(&AppEvent::UnrecognizedCommand { payload });
            }
        }
        t.outcome
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn stats(&self) -> CommandStats {
        self.stats
    }

    /// Outcome of the most recent command on the command topic.
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    pub fn command_topic(&self) -> Option<&str> {
        self.command_topic.as_deref()
    }

    // ── Internal ──────────────────────────────────────────────

    fn commit<P: OutputPort>(
        &self,
        bank: &mut OutputBank<P>,
        state: &OutputLineState,
        sink: &mut impl EventSink,
    ) -> bool {
        match bank.commit(state) {
            Ok(()) => true,
            Err(e) => {
                error!("AppService: command dropped: {}", e);
                sink.emit(&AppEvent::CommitRefused);
                false
            }
        }
    }
}
