//! GPIO pin assignments for the traffic node board.
//!
//! Single source of truth: the hardware adapter asks this module which
//! GPIO drives each lamp.  Change a pin here and it propagates everywhere.

use crate::signal::{Head, LampColor, Line};

// ---------------------------------------------------------------------------
// North-south head
// ---------------------------------------------------------------------------

pub const NS_RED_GPIO: i32 = 0;
pub const NS_YELLOW_GPIO: i32 = 1;
/// Shares GPIO 2 with the on-board LED on most dev kits.
pub const NS_GREEN_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// East-west head
// ---------------------------------------------------------------------------

pub const EW_RED_GPIO: i32 = 4;
pub const EW_YELLOW_GPIO: i32 = 5;
pub const EW_GREEN_GPIO: i32 = 6;

/// GPIO number driving `line`.
pub const fn line_gpio(line: Line) -> i32 {
    match (line.head, line.color) {
        (Head::NorthSouth, LampColor::Red) => NS_RED_GPIO,
        (Head::NorthSouth, LampColor::Yellow) => NS_YELLOW_GPIO,
        (Head::NorthSouth, LampColor::Green) => NS_GREEN_GPIO,
        (Head::EastWest, LampColor::Red) => EW_RED_GPIO,
        (Head::EastWest, LampColor::Yellow) => EW_YELLOW_GPIO,
        (Head::EastWest, LampColor::Green) => EW_GREEN_GPIO,
    }
}
