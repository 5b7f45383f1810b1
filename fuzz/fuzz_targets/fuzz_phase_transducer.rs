//! Fuzz target: `phase::transduce`
//!
//! Drives arbitrary payloads through the transducer and the inbound
//! message path, asserting the lamp-safety invariants hold for every
//! input.
//!
//! cargo fuzz run fuzz_phase_transducer

#![no_main]

use libfuzzer_sys::fuzz_target;
use traffic_node::app::commands::{InboundMessage, Payload};
use traffic_node::phase::{self, MAX_COMMAND_LEN, Outcome};
use traffic_node::signal::{Head, LampColor, Line};

fuzz_target!(|data: &[u8]| {
    let t = phase::transduce(data);

    for head in Head::ALL {
        assert!(t.state.lit_colors(head).count() <= 1, "two lamps on one head");
    }
    let ns_green = t.state.level(Line::new(Head::NorthSouth, LampColor::Green));
    let ew_green = t.state.level(Line::new(Head::EastWest, LampColor::Green));
    assert!(!(ns_green && ew_green), "both heads green");

    match t.outcome {
        Outcome::Phase(p) => assert_eq!(p.command(), data),
        Outcome::Unrecognized => assert!(t.state.is_baseline()),
    }

    // The inbound copy never truncates a payload into a different command.
    match InboundMessage::from_received(Some("t"), data).payload {
        Payload::Command(bytes) => assert_eq!(&bytes[..], data),
        Payload::Oversized { len } => {
            assert!(len > MAX_COMMAND_LEN);
            assert!(t.state.is_baseline());
        }
    }
});
