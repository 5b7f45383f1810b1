//! Mock lamp outputs for integration tests.
//!
//! Records every output-port call so tests can assert on the full GPIO
//! history without touching real pins.

use traffic_node::app::events::AppEvent;
use traffic_node::app::ports::{EventSink, OutputPort};
use traffic_node::signal::{LINE_COUNT, Line, OutputLineState};

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCall {
    Configure(Line),
    Set(Line, bool),
}

// ── MockOutputs ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockOutputs {
    pub calls: Vec<OutputCall>,
    configured: [bool; LINE_COUNT],
    levels: [bool; LINE_COUNT],
}

#[allow(dead_code)]
impl MockOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the six pins physically show right now.
    pub fn pins(&self) -> OutputLineState {
        let mut s = OutputLineState::BASELINE;
        for line in Line::ALL {
            s.set(line, self.levels[line.index()]);
        }
        s
    }

    pub fn is_configured(&self, line: Line) -> bool {
        self.configured[line.index()]
    }

    pub fn writes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, OutputCall::Set(..)))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl OutputPort for MockOutputs {
    fn configure_output(&mut self, line: Line) {
        self.configured[line.index()] = true;
        self.calls.push(OutputCall::Configure(line));
    }

    fn set_level(&mut self, line: Line, high: bool) {
        assert!(
            self.configured[line.index()],
            "{line} driven before being configured"
        );
        self.levels[line.index()] = high;
        self.calls.push(OutputCall::Set(line, high));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
