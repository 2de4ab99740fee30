//! DoorLock Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative poll loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   MqttTransport   Esp32Time    │
//! │  (ActuatorPort)    (EventSink)    (TransportPort) (ClockPort)  │
//! │  WifiAdapter       GPIO ISR ──▶ BUTTON_EDGE                    │
//! │  (Connectivity)                                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          LockController (pure logic)                   │    │
//! │  │  Debounce · Command gate · Door FSM                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  LinkSupervisor (rate-limited WiFi / MQTT reconnect)           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Context, Result};
use log::{info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{InterruptType, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use doorlock::adapters::device_id;
use doorlock::adapters::hardware::HardwareAdapter;
use doorlock::adapters::log_sink::LogEventSink;
use doorlock::adapters::mqtt::MqttTransport;
use doorlock::adapters::time::Esp32TimeAdapter;
use doorlock::adapters::wifi::WifiAdapter;
use doorlock::app::link::LinkSupervisor;
use doorlock::app::ports::{ClockPort, TransportPort};
use doorlock::app::service::LockController;
use doorlock::config::LockConfig;
use doorlock::drivers::debounce::{BUTTON_EDGE, DebouncedInput};
use doorlock::drivers::indicator::IndicatorLed;
use doorlock::drivers::strike::StrikeDriver;
use doorlock::pins;
use doorlock::protocol::SharedSecret;

// ── Build-time provisioning ───────────────────────────────────

const SECRET: Option<&str> = option_env!("DOORLOCK_SECRET");
const CONFIG_JSON: Option<&str> = option_env!("DOORLOCK_CONFIG_JSON");
const WIFI_SSID: Option<&str> = option_env!("DOORLOCK_WIFI_SSID");
const WIFI_PASS: Option<&str> = option_env!("DOORLOCK_WIFI_PASS");

fn load_config() -> LockConfig {
    match CONFIG_JSON.map(LockConfig::from_json) {
        Some(Ok(cfg)) => {
            info!("Config override loaded");
            cfg
        }
        Some(Err(e)) => {
            warn!("Config override rejected ({}), using defaults", e);
            LockConfig::default()
        }
        None => LockConfig::default(),
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  DoorLock v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration and secret ───────────────────────────
    let config = load_config();
    let secret = SharedSecret::new(
        SECRET
            .filter(|s| !s.is_empty())
            .context("DOORLOCK_SECRET not set at build time")?
            .as_bytes(),
    );

    // ── 3. GPIO ───────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let io = peripherals.pins;
    info!(
        "GPIO: button={} strike={} indicator={}",
        pins::BUTTON_GPIO,
        pins::STRIKE_GPIO,
        pins::INDICATOR_GPIO
    );

    let mut button = PinDriver::input(io.gpio5)?;
    button.set_pull(if config.button_active_low { Pull::Up } else { Pull::Down })?;
    button.set_interrupt_type(InterruptType::AnyEdge)?;
    // SAFETY: the callback only performs one atomic store.
    unsafe { button.subscribe(|| BUTTON_EDGE.raise())? };
    button.enable_interrupt()?;

    let strike = StrikeDriver::new(PinDriver::output(io.gpio14)?)
        .map_err(|e| anyhow::anyhow!("strike init: {e}"))?;
    let indicator = IndicatorLed::new(PinDriver::output(io.gpio12)?)
        .map_err(|e| anyhow::anyhow!("indicator init: {e}"))?;
    let mut hw = HardwareAdapter::new(strike, indicator);

    let button = DebouncedInput::new(button, &BUTTON_EDGE, config.debounce_ms, config.debounce_policy)
        .map_err(|e| anyhow::anyhow!("button init: {e:?}"))?;

    // ── 4. Network adapters ───────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let driver = BlockingWifi::wrap(EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?, sysloop)?;
    let mut wifi = WifiAdapter::new(driver, WIFI_SSID.unwrap_or_default(), WIFI_PASS.unwrap_or_default())
        .map_err(|e| anyhow::anyhow!("WiFi credentials: {e}"))?;
    let mut mqtt = MqttTransport::new(&config.broker_url);

    let client_id = device_id::client_id(&device_id::read_mac());
    let mut link = LinkSupervisor::new(client_id.as_str());

    // ── 5. Controller ─────────────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let link_config = config.clone();
    let poll_interval_ms = config.poll_interval_ms;

    let mut controller = LockController::new(config, secret, button);
    controller.start(clock.now_ms(), &mut hw, &mut sink);

    info!("System ready. Entering poll loop.");

    // ── 6. Poll loop ──────────────────────────────────────────
    loop {
        let now = clock.now_ms();

        // 6a. Link upkeep (rate-limited, bounded blocking)
        link.poll(now, &mut wifi, &mut mqtt, &link_config, &mut sink);

        // 6b. Inbound commands
        while let Some(msg) = mqtt.poll_inbound() {
            controller.handle_message(&msg, &mut sink);
        }

        // 6c. Debounce + FSM + outputs + status
        controller.tick(now, &mut hw, &mut mqtt, &mut sink);

        // 6d. GPIO interrupts are one-shot; re-arm for the next edge.
        if let Err(e) = controller.button_mut().pin_mut().enable_interrupt() {
            warn!("button interrupt re-arm failed: {e:?}");
        }

        FreeRtos::delay_ms(poll_interval_ms);
    }
}
