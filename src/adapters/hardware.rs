//! Hardware adapter: bridges lamp GPIOs to the [`OutputPort`] trait.
//!
//! Holds one `embedded_hal` output pin per [`Line`], indexed in
//! [`Line::ALL`] order.  On the device the pins are esp-idf-hal
//! `PinDriver`s built from the [`pins`] table; host tests plug in mock
//! pins.  This is the only module in the system that touches lamp GPIOs.

use embedded_hal::digital::{Error as _, OutputPin, PinState};
use log::warn;

use crate::app::ports::OutputPort;
use crate::pins;
use crate::signal::{LINE_COUNT, Line};

#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
#[cfg(target_os = "espidf")]
use esp_idf_sys::EspError;

/// Concrete adapter that drives the six lamp outputs.
pub struct HardwareAdapter<P: OutputPin> {
    pins: [P; LINE_COUNT],
}

impl<P: OutputPin> HardwareAdapter<P> {
    /// `pins` must be given in [`Line::ALL`] order.
    pub fn new(pins: [P; LINE_COUNT]) -> Self {
        Self { pins }
    }

    pub fn pin(&self, line: Line) -> &P {
        &self.pins[line.index()]
    }

    fn drive(&mut self, line: Line, state: PinState) {
        if let Err(e) = self.pins[line.index()].set_state(state) {
            warn!(
                "GPIO{} ({}) write failed: {:?}",
                pins::line_gpio(line),
                line,
                e.kind()
            );
        }
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<P: OutputPin> OutputPort for HardwareAdapter<P> {
    fn configure_output(&mut self, line: Line) {
        // Pins arrive already in push-pull output mode; park the line low.
        self.drive(line, PinState::Low);
    }

    fn set_level(&mut self, line: Line, high: bool) {
        self.drive(line, PinState::from(high));
    }
}

// ── Board construction (ESP-IDF) ──────────────────────────────

#[cfg(target_os = "espidf")]
pub type BoardOutputs = HardwareAdapter<PinDriver<'static, AnyOutputPin, Output>>;

#[cfg(target_os = "espidf")]
impl HardwareAdapter<PinDriver<'static, AnyOutputPin, Output>> {
    /// Claim the six lamp GPIOs listed in [`pins`].
    pub fn from_board() -> Result<Self, EspError> {
        fn claim(line: Line) -> Result<PinDriver<'static, AnyOutputPin, Output>, EspError> {
            // SAFETY: the lamp GPIOs are claimed only here, once, from main()
            // before anything else touches the pin matrix.
            let pin = unsafe { AnyOutputPin::new(pins::line_gpio(line)) };
            PinDriver::output(pin)
        }

        let [a, b, c, d, e, f] = Line::ALL;
        Ok(Self::new([
            claim(a)?,
            claim(b)?,
            claim(c)?,
            claim(d)?,
            claim(e)?,
            claim(f)?,
        ]))
    }
}
