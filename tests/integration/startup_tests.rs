//! Integration tests for the boot sequence: lamps dark first, then config,
//! then connectivity.

use crate::mock_hw::{MockOutputs, OutputCall, RecordingSink};

use traffic_node::adapters::nvs::NvsAdapter;
use traffic_node::adapters::wifi::{ConnectivityPort, WifiAdapter, WifiState};
use traffic_node::app::events::AppEvent;
use traffic_node::app::ports::ConfigPort;
use traffic_node::app::service::AppService;
use traffic_node::bank::{BankState, OutputBank};
use traffic_node::config::{NodeConfig, resolve_boot_config};
use traffic_node::error::{Error, OutputError};
use traffic_node::signal::Line;

#[test]
fn start_leaves_every_line_configured_and_low() {
    let mut app = AppService::new(&NodeConfig::default());
    let mut bank = OutputBank::new(MockOutputs::new());
    let mut sink = RecordingSink::new();
    app.start(&mut bank, &mut sink);

    assert_eq!(bank.bank_state(), BankState::Initialized);
    assert!(bank.state().is_baseline());
    assert!(bank.port().pins().is_baseline());
    for line in Line::ALL {
        assert!(bank.port().is_configured(line));
        assert!(bank.port().calls.contains(&OutputCall::Set(line, false)));
    }
    assert_eq!(sink.events, vec![AppEvent::Started]);
}

#[test]
fn commands_before_start_never_reach_the_pins() {
    let mut app = AppService::new(&NodeConfig::default());
    let mut bank = OutputBank::new(MockOutputs::new());
    let mut sink = RecordingSink::new();

    app.apply_command(b"NS_GREEN", &mut bank, &mut sink);

    assert!(bank.port().calls.is_empty());
    assert_eq!(sink.last(), Some(&AppEvent::CommitRefused));
    assert_eq!(
        bank.commit(&traffic_node::phase::apply(b"ALL_RED")).map_err(Error::from),
        Err(Error::Output(OutputError::NotInitialized))
    );
}

#[test]
fn boot_config_is_persisted_then_reused() {
    let mut nvs = NvsAdapter::new().unwrap();
    let baked = r#"{"wifi_ssid":"Crossing","wifi_password":"greenwave","command_topic":"cruce/7"}"#;

    let first = resolve_boot_config(&mut nvs, Some(baked));
    assert_eq!(first.command_topic, "cruce/7");
    assert_eq!(nvs.load().unwrap(), first);

    // A later boot with a different override keeps the stored config.
    let second = resolve_boot_config(&mut nvs, Some(r#"{"command_topic":"other"}"#));
    assert_eq!(second, first);
}

#[test]
fn loaded_topic_is_the_one_listened_on() {
    let mut nvs = NvsAdapter::new().unwrap();
    let config = resolve_boot_config(&mut nvs, Some(r#"{"command_topic":"cruce/7"}"#));

    let mut app = AppService::new(&NodeConfig::default());
    let mut bank = OutputBank::new(MockOutputs::new());
    let mut sink = RecordingSink::new();
    app.start(&mut bank, &mut sink);
    app.retarget(&config);

    assert_eq!(app.command_topic(), Some("cruce/7"));
}

#[test]
fn wifi_from_config_connects_and_survives_drop() {
    let mut config = NodeConfig::default();
    config.wifi_ssid = "Crossing".into();
    config.wifi_password = "greenwave".into();

    let mut wifi = WifiAdapter::new(config.wifi_max_backoff_secs);
    wifi.set_credentials(&config.wifi_ssid, &config.wifi_password).unwrap();
    wifi.connect().unwrap();
    assert!(wifi.is_connected());

    wifi.sim_set_link_down(true);
    wifi.poll(1_000);
    assert!(matches!(wifi.state(), WifiState::Reconnecting { .. }));

    wifi.sim_set_link_down(false);
    wifi.poll(60_000);
    assert_eq!(wifi.state(), WifiState::Connected);
}
