//! Phase transducer: raw command bytes → full output-line state.
//!
//! The transducer is a pure function.  It never looks at the previous
//! lamp state and never fails:
//!
//! 1. Start from [`OutputLineState::BASELINE`] (every lamp off).
//! 2. Compare the command, byte for byte over its whole length, with the
//!    five wire strings.  No prefix matching, no NUL termination, no case
//!    folding.
//! 3. On a match, switch on exactly the two lamps of the phase table.
//! 4. Otherwise keep the baseline and report [`Outcome::Unrecognized`].
//!
//! An unknown command therefore degrades to "everything off" and never to
//! "keep whatever was lit before".
//!
//! | Phase      | Wire string | Lamps on                |
//! |------------|-------------|-------------------------|
//! | `NsGreen`  | `NS_GREEN`  | NS green, EW red        |
//! | `NsYellow` | `NS_YELLOW` | NS yellow, EW red       |
//! | `EoGreen`  | `EO_GREEN`  | EW green, NS red        |
//! | `EoYellow` | `EO_YELLOW` | EW yellow, NS red       |
//! | `AllRed`   | `ALL_RED`   | NS red, EW red          |

use core::fmt;

use crate::signal::{Head, LampColor, Line, OutputLineState};

/// Upper bound on an accepted command payload, in bytes.
///
/// The longest wire string is 9 bytes.  Anything above this ceiling is
/// rejected before matching and handled like an unknown command.
pub const MAX_COMMAND_LEN: usize = 32;

// ───────────────────────────────────────────────────────────────
// Phase
// ───────────────────────────────────────────────────────────────

/// A recognised traffic phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    NsGreen,
    NsYellow,
    EoGreen,
    EoYellow,
    AllRed,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::NsGreen,
        Phase::NsYellow,
        Phase::EoGreen,
        Phase::EoYellow,
        Phase::AllRed,
    ];

    /// The exact payload that selects this phase.
    pub const fn command(self) -> &'static [u8] {
        match self {
            Phase::NsGreen => b"NS_GREEN",
            Phase::NsYellow => b"NS_YELLOW",
            Phase::EoGreen => b"EO_GREEN",
            Phase::EoYellow => b"EO_YELLOW",
            Phase::AllRed => b"ALL_RED",
        }
    }

    /// Exact, case-sensitive match over the full command length.
    pub fn from_command(command: &[u8]) -> Option<Phase> {
        Phase::ALL.into_iter().find(|p| p.command() == command)
    }

    /// The two lamps this phase switches on.
    pub const fn lit_lines(self) -> [Line; 2] {
        use Head::{EastWest, NorthSouth};
        use LampColor::{Green, Red, Yellow};
        match self {
            Phase::NsGreen => [Line::new(NorthSouth, Green), Line::new(EastWest, Red)],
            Phase::NsYellow => [Line::new(NorthSouth, Yellow), Line::new(EastWest, Red)],
            Phase::EoGreen => [Line::new(EastWest, Green), Line::new(NorthSouth, Red)],
            Phase::EoYellow => [Line::new(EastWest, Yellow), Line::new(NorthSouth, Red)],
            Phase::AllRed => [Line::new(NorthSouth, Red), Line::new(EastWest, Red)],
        }
    }

    /// Full target state for this phase.
    pub fn output_state(self) -> OutputLineState {
        OutputLineState::with_lit(&self.lit_lines())
    }

    /// Human-readable description for logs.
    pub const fn describe(self) -> &'static str {
        match self {
            Phase::NsGreen => "north-south green",
            Phase::NsYellow => "north-south yellow",
            Phase::EoGreen => "east-west green",
            Phase::EoYellow => "east-west yellow",
            Phase::AllRed => "all red",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Wire strings are ASCII by construction.
        f.write_str(core::str::from_utf8(self.command()).unwrap_or("?"))
    }
}

// ───────────────────────────────────────────────────────────────
// Transducer
// ───────────────────────────────────────────────────────────────

/// Result of matching one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Phase(Phase),
    Unrecognized,
}

impl Outcome {
    pub fn phase(self) -> Option<Phase> {
        match self {
            Outcome::Phase(p) => Some(p),
            Outcome::Unrecognized => None,
        }
    }
}

/// Outcome plus the state it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transduction {
    pub outcome: Outcome,
    pub state: OutputLineState,
}

/// Map a command to its outcome and target state.
pub fn transduce(command: &[u8]) -> Transduction {
    match Phase::from_command(command) {
        Some(phase) => Transduction {
            outcome: Outcome::Phase(phase),
            state: phase.output_state(),
        },
        None => Transduction {
            outcome: Outcome::Unrecognized,
            state: OutputLineState::BASELINE,
        },
    }
}

/// Map a command to its target state.  Total: never fails.
pub fn apply(command: &[u8]) -> OutputLineState {
    transduce(command).state
}
