//! Integration tests for the AppService → transducer → output bank pipeline.
//!
//! These run on the host (x86_64) and verify that a broker message travels
//! all the way down to the six lamp lines with nothing but mock adapters.

use crate::mock_hw::{MockOutputs, OutputCall, RecordingSink};

use traffic_node::app::commands::InboundMessage;
use traffic_node::app::events::AppEvent;
use traffic_node::app::service::AppService;
use traffic_node::bank::OutputBank;
use traffic_node::config::NodeConfig;
use traffic_node::phase::{MAX_COMMAND_LEN, Outcome, Phase};
use traffic_node::signal::{LampColor, Line, OutputLineState};
use traffic_node::signal::Head::{EastWest, NorthSouth};

const TOPIC: &str = "semaforos/comandos";

fn make_app() -> (AppService, OutputBank<MockOutputs>, RecordingSink) {
    let mut app = AppService::new(&NodeConfig::default());
    let mut bank = OutputBank::new(MockOutputs::new());
    let mut sink = RecordingSink::new();
    app.start(&mut bank, &mut sink);
    (app, bank, sink)
}

fn send(app: &mut AppService, bank: &mut OutputBank<MockOutputs>, sink: &mut RecordingSink, payload: &[u8]) {
    let msg = InboundMessage::from_received(Some(TOPIC), payload);
    app.handle_message(&msg, bank, sink);
}

fn lit(lines: &[(traffic_node::signal::Head, LampColor)]) -> OutputLineState {
    let lines: Vec<Line> = lines.iter().map(|&(h, c)| Line::new(h, c)).collect();
    OutputLineState::with_lit(&lines)
}

// ── Command scenarios ─────────────────────────────────────────

#[test]
fn ns_green_lights_ns_green_and_ew_red() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"NS_GREEN");
    let want = lit(&[(NorthSouth, LampColor::Green), (EastWest, LampColor::Red)]);
    assert_eq!(bank.port().pins(), want);
    assert_eq!(app.last_outcome(), Some(Outcome::Phase(Phase::NsGreen)));
}

#[test]
fn eo_yellow_lights_ew_yellow_and_ns_red() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"EO_YELLOW");
    let want = lit(&[(EastWest, LampColor::Yellow), (NorthSouth, LampColor::Red)]);
    assert_eq!(bank.port().pins(), want);
}

#[test]
fn all_red_lights_both_reds() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"ALL_RED");
    let want = lit(&[(NorthSouth, LampColor::Red), (EastWest, LampColor::Red)]);
    assert_eq!(bank.port().pins(), want);
}

#[test]
fn wrong_case_turns_everything_off() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"NS_GREEN");
    send(&mut app, &mut bank, &mut sink, b"ns_green");
    assert!(bank.port().pins().is_baseline());
    assert_eq!(app.last_outcome(), Some(Outcome::Unrecognized));
}

#[test]
fn empty_payload_turns_everything_off() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"EO_GREEN");
    send(&mut app, &mut bank, &mut sink, b"");
    assert!(bank.port().pins().is_baseline());
}

#[test]
fn last_message_wins() {
    let (mut app, mut bank, mut sink) = make_app();
    for cmd in [&b"NS_GREEN"[..], b"NS_YELLOW", b"ALL_RED", b"EO_GREEN"] {
        send(&mut app, &mut bank, &mut sink, cmd);
    }
    assert_eq!(bank.port().pins(), Phase::EoGreen.output_state());
    assert_eq!(app.stats().applied, 4);
}

// ── Commit behaviour ──────────────────────────────────────────

#[test]
fn every_command_drives_all_six_lines_in_order() {
    let (mut app, mut bank, mut sink) = make_app();
    bank.port_mut().clear();
    send(&mut app, &mut bank, &mut sink, b"NS_YELLOW");

    let target = Phase::NsYellow.output_state();
    let expected: Vec<OutputCall> = Line::ALL
        .iter()
        .map(|&l| OutputCall::Set(l, target.level(l)))
        .collect();
    assert_eq!(bank.port().calls, expected);
}

#[test]
fn repeated_command_is_idempotent() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"ALL_RED");
    let first = bank.port().pins();
    send(&mut app, &mut bank, &mut sink, b"ALL_RED");
    assert_eq!(bank.port().pins(), first);
    assert_eq!(*bank.state(), first);
}

// ── Topic filter and size ceiling ─────────────────────────────

#[test]
fn foreign_topic_leaves_lamps_untouched() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"NS_GREEN");
    bank.port_mut().clear();

    let msg = InboundMessage::from_received(Some("otro/topico"), b"ALL_RED");
    app.handle_message(&msg, &mut bank, &mut sink);

    assert_eq!(bank.port().writes(), 0);
    assert_eq!(bank.port().pins(), Phase::NsGreen.output_state());
    assert_eq!(sink.last(), Some(&AppEvent::ForeignTopic));
    assert_eq!(app.stats().ignored, 1);
}

#[test]
fn message_without_topic_is_ignored() {
    let (mut app, mut bank, mut sink) = make_app();
    let msg = InboundMessage::from_received(None, b"NS_GREEN");
    app.handle_message(&msg, &mut bank, &mut sink);
    assert!(bank.port().pins().is_baseline());
    assert_eq!(app.stats().ignored, 1);
}

#[test]
fn oversized_payload_turns_everything_off() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"EO_GREEN");

    let mut big = b"NS_GREEN".to_vec();
    big.resize(MAX_COMMAND_LEN + 10, b' ');
    send(&mut app, &mut bank, &mut sink, &big);

    assert!(bank.port().pins().is_baseline());
    assert_eq!(
        sink.last(),
        Some(&AppEvent::OversizedCommand { len: MAX_COMMAND_LEN + 10 })
    );
    assert_eq!(app.stats().oversized, 1);
}

#[test]
fn fragmented_payload_turns_everything_off() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"NS_GREEN");
    app.handle_message(&InboundMessage::fragmented(Some(TOPIC), 5000), &mut bank, &mut sink);
    assert!(bank.port().pins().is_baseline());
}

#[test]
fn stats_count_every_message() {
    let (mut app, mut bank, mut sink) = make_app();
    send(&mut app, &mut bank, &mut sink, b"NS_GREEN");
    send(&mut app, &mut bank, &mut sink, b"BOGUS");
    app.handle_message(&InboundMessage::from_received(Some("x"), b"ALL_RED"), &mut bank, &mut sink);

    let s = app.stats();
    assert_eq!(s.received, 3);
    assert_eq!(s.applied, 1);
    assert_eq!(s.unrecognized, 1);
    assert_eq!(s.ignored, 1);
}
