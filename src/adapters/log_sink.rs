//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  Payloads of unknown
//! commands are ASCII-escaped so binary garbage cannot corrupt the console.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | all lamps off, awaiting commands");
            }
            AppEvent::PhaseApplied { phase, state } => {
                info!("PHASE | {} ({}) | {}", phase, phase.describe(), state);
            }
            AppEvent::UnrecognizedCommand { payload } => {
                warn!(
                    "UNKNOWN | \"{}\" ({} bytes) -> all lamps off",
                    payload.escape_ascii(),
                    payload.len()
                );
            }
            AppEvent::OversizedCommand { len } => {
                warn!("OVERSIZE | {} byte payload rejected -> all lamps off", len);
            }
            AppEvent::ForeignTopic => {
                debug!("IGNORED | message on foreign topic");
            }
            AppEvent::CommitRefused => {
                error!("REFUSED | output bank not initialised");
            }
        }
    }
}
