//! Traffic-node firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   WifiAdapter   │
//! │  (OutputPort)      (EventSink)    (ConfigPort) (Connectivity)│
//! │  MqttAdapter ──▶ COMMANDS / BROKER_STATUS                    │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │      AppService · Phase transducer · OutputBank    │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot order: logger → lamps dark → config → WiFi → MQTT → command loop.
#![deny(unused_must_use)]

use std::time::Instant;

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use traffic_node::adapters::hardware::BoardOutputs;
use traffic_node::adapters::log_sink::LogEventSink;
use traffic_node::adapters::mqtt::MqttAdapter;
use traffic_node::adapters::nvs::NvsAdapter;
use traffic_node::adapters::wifi::{ConnectivityPort, WifiAdapter};
use traffic_node::app::service::AppService;
use traffic_node::bank::OutputBank;
use traffic_node::channels::{BROKER_STATUS, BrokerStatus, COMMANDS};
use traffic_node::config::{self, NodeConfig};
use traffic_node::error::{CommsError, Error};

/// JSON config baked in at build time, applied when NVS holds none.
const BUILD_CONFIG: Option<&str> = option_env!("TRAFFIC_NODE_CONFIG");

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  traffic-node v{:<22}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Lamps dark before anything can command them ───────
    let mut bank = OutputBank::new(BoardOutputs::from_board()?);
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(&NodeConfig::default());
    app.start(&mut bank, &mut sink);

    // ── 3. Config from NVS (or build-time override / defaults) ─
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let config = match NvsAdapter::new(nvs_partition.clone()) {
        Ok(mut nvs) => config::resolve_boot_config(&mut nvs, BUILD_CONFIG),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            NodeConfig::default()
        }
    };
    app.retarget(&config);

    // ── 4. WiFi station ───────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let mut wifi = WifiAdapter::new(config.wifi_max_backoff_secs);
    wifi.attach_driver(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?,
        sysloop,
    )?);

    match wifi.set_credentials(&config.wifi_ssid, &config.wifi_password) {
        Ok(()) => {
            if let Err(e) = wifi.connect() {
                // The adapter keeps retrying from poll().
                warn!("{}: {}", Error::from(CommsError::WifiConnectFailed), e);
            }
        }
        Err(e) => error!("WiFi: credentials rejected ({}), staying offline", e),
    }

    // ── 5. MQTT session ───────────────────────────────────────
    let mut mqtt = MqttAdapter::start(&config).map_err(Error::from)?;

    // ── 6. Command loop ───────────────────────────────────────
    let boot = Instant::now();
    info!("Entering command loop (topic '{}')", mqtt.topic());

    loop {
        if let Some(status) = BROKER_STATUS.try_take() {
            if status == BrokerStatus::Connected {
                if let Err(e) = mqtt.subscribe() {
                    error!("{}", Error::from(e));
                }
            }
        }

        while let Some(msg) = COMMANDS.next() {
            app.handle_message(&msg, &mut bank, &mut sink);
        }

        let now_ms = u64::try_from(boot.elapsed().as_millis()).unwrap_or(u64::MAX);
        wifi.poll(now_ms);

        FreeRtos::delay_ms(config.poll_interval_ms);
    }
}
