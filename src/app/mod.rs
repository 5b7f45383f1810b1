//! Application core: pure domain logic, zero I/O.
//!
//! Command intake, topic filtering, and the hand-off from the phase
//! transducer to the output bank.  All interaction with hardware and the
//! broker happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
