//! Output bank: owner of the six lamp lines.
//!
//! The bank is the only thing that writes lamp levels.  It wraps an
//! [`OutputPort`] (real GPIO on the device, a mock in tests) and is handed
//! to the command path by `&mut`, so there is exactly one writer.
//!
//! ## Lifecycle
//!
//! `Uninitialized → Initialized`.  [`OutputBank::initialize`] configures
//! every line as an output and drives it low; [`OutputBank::commit`] is
//! refused until that has happened.
//!
//! ## Ordering
//!
//! Lines are written one at a time in [`Line::ALL`] order (head, then
//! colour).  There is no hardware latch, so a few microseconds of mixed
//! old/new levels across lines are visible during a commit.

use log::{debug, info};

use crate::app::ports::OutputPort;
use crate::error::OutputError;
use crate::signal::{Line, OutputLineState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankState {
    Uninitialized,
    Initialized,
}

pub struct OutputBank<P: OutputPort> {
    port: P,
    state: BankState,
    levels: OutputLineState,
}

impl<P: OutputPort> OutputBank<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            state: BankState::Uninitialized,
            levels: OutputLineState::BASELINE,
        }
    }

    /// Configure all lines as outputs and switch every lamp off.
    ///
    /// Safe to call again; each call re-drives the baseline.
    pub fn initialize(&mut self) {
        for line in Line::ALL {
            self.port.configure_output(line);
            self.port.set_level(line, false);
        }
        self.levels = OutputLineState::BASELINE;
        if self.state == BankState::Uninitialized {
            info!("OutputBank: {} lines configured, all low", Line::ALL.len());
        }
        self.state = BankState::Initialized;
    }

    /// Drive every line to the level in `target`.
    pub fn commit(&mut self, target: &OutputLineState) -> Result<(), OutputError> {
        if self.state != BankState::Initialized {
            return Err(OutputError::NotInitialized);
        }
        for (line, on) in target.iter() {
            self.port.set_level(line, on);
        }
        self.levels = *target;
        debug!("OutputBank: committed {}", target);
        Ok(())
    }

    /// Levels last driven onto the lines.
    pub fn state(&self) -> &OutputLineState {
        &self.levels
    }

    pub fn bank_state(&self) -> BankState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == BankState::Initialized
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}
