//! Servo node firmware for ESP32.
//!
//! This binary requires the ESP32 Rust toolchain.
//! It will not compile with the standard Rust toolchain.
//!
//! Startup order: attach servos, join WiFi, then serve `GET /move`. The
//! command handling is the same `servo-core` code the Linux build runs.

use std::sync::Arc;
use std::time::Duration;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::ledc::{LedcDriver, LedcTimerDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::info;

use servo_core::{CommandHandler, NodeConfig, ServoBank};
use servo_esp32::config::WifiConfig;
use servo_esp32::http::start_http_server;
use servo_esp32::servo::{servo_pin, timer_config, LedcServo};
use servo_esp32::wifi::join_network;

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    let config = NodeConfig::default();
    config.validate()?;
    info!("{} booting", config.name);

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // Servos: one shared 50 Hz timer, one LEDC channel per servo
    let timer = LedcTimerDriver::new(peripherals.ledc.timer0, &timer_config(&config.pulse))?;
    // SAFETY: the configured servo pins are validated distinct and used for nothing else.
    let [pin0, pin1, pin2] = config.servo_pins.map(|gpio| unsafe { servo_pin(gpio) });
    let bank = ServoBank::new([
        LedcServo::new(
            LedcDriver::new(peripherals.ledc.channel0, &timer, pin0)?,
            config.pulse,
        ),
        LedcServo::new(
            LedcDriver::new(peripherals.ledc.channel1, &timer, pin1)?,
            config.pulse,
        ),
        LedcServo::new(
            LedcDriver::new(peripherals.ledc.channel2, &timer, pin2)?,
            config.pulse,
        ),
    ]);
    info!("Servos attached to GPIO {:?}", config.servo_pins);
    let handler = CommandHandler::new(Arc::new(bank));

    // Startup phase: nothing is served until the network is up
    let network = join_network(
        &WifiConfig::from_build_env(),
        &config.backoff,
        peripherals.modem,
        sysloop,
        Some(nvs),
    )?;

    let _server = start_http_server(&network, config.http_port, handler)?;
    info!("{} ready", config.name);

    // Keep the timer, WiFi driver and HTTP server alive
    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}
