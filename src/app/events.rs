//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  They are diagnostics only:
//! nothing is sent back to the command publisher.

use heapless::Vec;

use crate::phase::{MAX_COMMAND_LEN, Phase};
use crate::signal::OutputLineState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Output bank initialised; every lamp is off.
    Started,

    /// A recognised phase was committed to the lamps.
    PhaseApplied {
        phase: Phase,
        state: OutputLineState,
    },

    /// The payload matched no phase; lamps fell back to the baseline.
    UnrecognizedCommand { payload: Vec<u8, MAX_COMMAND_LEN> },

    /// The payload exceeded the ceiling; lamps fell back to the baseline.
    OversizedCommand { len: usize },

    /// A message arrived on some other topic and was ignored.
    ForeignTopic,

    /// A command could not be committed (bank not initialised).
    CommitRefused,
}
