//! Integration tests for the MQTT ingress path: client event → queue →
//! control loop → lamps.

use crate::mock_hw::{MockOutputs, RecordingSink};

use traffic_node::adapters::mqtt::{Chunk, forward_received};
use traffic_node::app::service::AppService;
use traffic_node::bank::OutputBank;
use traffic_node::channels::CommandQueue;
use traffic_node::config::NodeConfig;
use traffic_node::phase::Phase;

const TOPIC: Option<&str> = Some("semaforos/comandos");

fn drain<const N: usize>(
    queue: &CommandQueue<N>,
    app: &mut AppService,
    bank: &mut OutputBank<MockOutputs>,
    sink: &mut RecordingSink,
) -> usize {
    let mut n = 0;
    while let Some(msg) = queue.next() {
        app.handle_message(&msg, bank, sink);
        n += 1;
    }
    n
}

fn make_app() -> (AppService, OutputBank<MockOutputs>, RecordingSink) {
    let mut app = AppService::new(&NodeConfig::default());
    let mut bank = OutputBank::new(MockOutputs::new());
    let mut sink = RecordingSink::new();
    app.start(&mut bank, &mut sink);
    (app, bank, sink)
}

#[test]
fn queued_commands_apply_in_arrival_order() {
    let queue: CommandQueue<8> = CommandQueue::new();
    let (mut app, mut bank, mut sink) = make_app();

    forward_received(&queue, TOPIC, b"NS_GREEN", Chunk::Complete);
    forward_received(&queue, TOPIC, b"NS_YELLOW", Chunk::Complete);
    forward_received(&queue, TOPIC, b"ALL_RED", Chunk::Complete);

    assert_eq!(drain(&queue, &mut app, &mut bank, &mut sink), 3);
    assert_eq!(bank.port().pins(), Phase::AllRed.output_state());
}

#[test]
fn backlog_keeps_the_newest_command() {
    let queue: CommandQueue<2> = CommandQueue::new();
    let (mut app, mut bank, mut sink) = make_app();

    forward_received(&queue, TOPIC, b"NS_GREEN", Chunk::Complete);
    forward_received(&queue, TOPIC, b"NS_YELLOW", Chunk::Complete);
    forward_received(&queue, TOPIC, b"EO_GREEN", Chunk::Complete);

    assert_eq!(drain(&queue, &mut app, &mut bank, &mut sink), 2);
    assert_eq!(bank.port().pins(), Phase::EoGreen.output_state());
    assert_eq!(app.stats().received, 2);
}

#[test]
fn split_payload_ends_with_lamps_off() {
    let queue: CommandQueue<8> = CommandQueue::new();
    let (mut app, mut bank, mut sink) = make_app();

    forward_received(&queue, TOPIC, b"EO_GREEN", Chunk::Complete);
    forward_received(&queue, TOPIC, b"xxxx", Chunk::First { total_len: 3000 });
    forward_received(&queue, TOPIC, b"yyyy", Chunk::Continuation);

    assert_eq!(drain(&queue, &mut app, &mut bank, &mut sink), 2);
    assert!(bank.port().pins().is_baseline());
}
