//! Signal heads, lamp colours, and the output-line state.
//!
//! The intersection has two independent signal heads, each with one red,
//! one yellow and one green lamp.  Every `(Head, LampColor)` pair is one
//! [`Line`], and every line maps to exactly one physical output (see
//! [`pins`](crate::pins)).
//!
//! [`OutputLineState`] is the full set of levels for all six lines.  It is
//! always fully defined: there is no "unknown" level for a lamp.

use core::fmt;

/// Number of signal heads at this installation.
pub const HEAD_COUNT: usize = 2;
/// Lamps per head (red, yellow, green).
pub const COLOR_COUNT: usize = 3;
/// Total number of output lines.
pub const LINE_COUNT: usize = HEAD_COUNT * COLOR_COUNT;

// ───────────────────────────────────────────────────────────────
// Head / colour
// ───────────────────────────────────────────────────────────────

/// One traffic direction controlled by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Head {
    NorthSouth = 0,
    EastWest = 1,
}

impl Head {
    pub const ALL: [Head; HEAD_COUNT] = [Head::NorthSouth, Head::EastWest];

    /// The other direction.
    pub const fn opposite(self) -> Head {
        match self {
            Head::NorthSouth => Head::EastWest,
            Head::EastWest => Head::NorthSouth,
        }
    }

    /// Short tag used in logs (`NS` / `EW`).
    pub const fn tag(self) -> &'static str {
        match self {
            Head::NorthSouth => "NS",
            Head::EastWest => "EW",
        }
    }
}

/// Lamp colour within a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LampColor {
    Red = 0,
    Yellow = 1,
    Green = 2,
}

impl LampColor {
    pub const ALL: [LampColor; COLOR_COUNT] = [LampColor::Red, LampColor::Yellow, LampColor::Green];

    /// Single-letter code used in compact state renderings.
    pub const fn code(self) -> char {
        match self {
            LampColor::Red => 'R',
            LampColor::Yellow => 'Y',
            LampColor::Green => 'G',
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Line
// ───────────────────────────────────────────────────────────────

/// One physical lamp circuit, identified by head and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Line {
    pub head: Head,
    pub color: LampColor,
}

impl Line {
    /// Every line, head-major then colour order.  This is also the order
    /// in which the output bank drives its lines.
    pub const ALL: [Line; LINE_COUNT] = [
        Line::new(Head::NorthSouth, LampColor::Red),
        Line::new(Head::NorthSouth, LampColor::Yellow),
        Line::new(Head::NorthSouth, LampColor::Green),
        Line::new(Head::EastWest, LampColor::Red),
        Line::new(Head::EastWest, LampColor::Yellow),
        Line::new(Head::EastWest, LampColor::Green),
    ];

    pub const fn new(head: Head, color: LampColor) -> Self {
        Self { head, color }
    }

    /// Dense index in `0..LINE_COUNT`, matching the position in [`Line::ALL`].
    pub const fn index(self) -> usize {
        self.head as usize * COLOR_COUNT + self.color as usize
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:?}", self.head.tag(), self.color)
    }
}

// ───────────────────────────────────────────────────────────────
// Output line state
// ───────────────────────────────────────────────────────────────

/// Levels of all six lines at one instant (`true` = lamp on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutputLineState {
    levels: [bool; LINE_COUNT],
}

impl OutputLineState {
    /// Safety baseline: every lamp off.
    pub const BASELINE: OutputLineState = OutputLineState {
        levels: [false; LINE_COUNT],
    };

    /// Baseline with exactly `lines` switched on.
    pub fn with_lit(lines: &[Line]) -> Self {
        let mut state = Self::BASELINE;
        for &line in lines {
            state.set(line, true);
        }
        state
    }

    pub fn level(&self, line: Line) -> bool {
        self.levels[line.index()]
    }

    pub fn set(&mut self, line: Line, on: bool) {
        self.levels[line.index()] = on;
    }

    /// `(line, level)` pairs in [`Line::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Line, bool)> + '_ {
        Line::ALL.iter().map(|&line| (line, self.level(line)))
    }

    /// Colours currently lit on `head`.
    pub fn lit_colors(&self, head: Head) -> impl Iterator<Item = LampColor> + '_ {
        LampColor::ALL
            .into_iter()
            .filter(move |&color| self.level(Line::new(head, color)))
    }

    /// Number of lamps switched on across both heads.
    pub fn lit_count(&self) -> usize {
        self.levels.iter().filter(|&&on| on).count()
    }

    pub fn is_baseline(&self) -> bool {
        *self == Self::BASELINE
    }
}

/// Compact rendering, e.g. `NS[--G] EW[R--]`.
impl fmt::Display for OutputLineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, head) in Head::ALL.into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}[", head.tag())?;
            for color in LampColor::ALL {
                let c = if self.level(Line::new(head, color)) {
                    color.code()
                } else {
                    '-'
                };
                write!(f, "{c}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
