//! Traffic-node firmware library.
//!
//! An MQTT-commanded controller for one two-head traffic light.  Exposes
//! the pure-logic modules for integration testing; all ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod bank;
pub mod channels;
pub mod config;
pub mod error;
pub mod phase;
pub mod pins;
pub mod signal;

pub mod adapters;
