//! WiFi join for ESP32.
//!
//! Joining the network is an explicit startup phase. Failed association or
//! DHCP attempts are retried per `Backoff`; running out of attempts is a
//! startup error rather than an endless loop.

use anyhow::{anyhow, bail, Result};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::peripheral,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::{info, warn};
use servo_core::Backoff;

use crate::config::WifiConfig;

/// Proof that the station is associated and has an address.
///
/// Holding it keeps the WiFi driver alive; the HTTP server can only be
/// started with one in hand.
pub struct NetworkReady {
    _wifi: Box<EspWifi<'static>>,
    ip: String,
}

impl NetworkReady {
    /// Station IPv4 address.
    pub fn ip(&self) -> &str {
        &self.ip
    }
}

/// Join the configured network.
///
/// Scans once to find the access point's channel, then connects and waits
/// for a DHCP lease, retrying with `backoff` on failure.
pub fn join_network(
    config: &WifiConfig,
    backoff: &Backoff,
    modem: impl peripheral::Peripheral<P = esp_idf_svc::hal::modem::Modem> + 'static,
    sysloop: EspSystemEventLoop,
    nvs: Option<EspDefaultNvsPartition>,
) -> Result<NetworkReady> {
    let ssid = config.ssid.as_str();
    if ssid.is_empty() {
        bail!("WiFi SSID cannot be empty (set WIFI_SSID at build time)");
    }

    let auth_method = if config.password.is_empty() {
        info!("WiFi password is empty, using open network");
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop)?;

    // Initial configuration for scanning
    wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
    wifi.start()?;

    info!("Scanning for WiFi networks...");
    let channel = wifi
        .scan()?
        .into_iter()
        .find(|ap| ap.ssid == ssid)
        .map(|ap| {
            info!("Found '{}' on channel {}", ssid, ap.channel);
            ap.channel
        });

    if channel.is_none() {
        warn!("Network '{}' not found in scan, will try anyway", ssid);
    }

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: ssid
            .try_into()
            .map_err(|_| anyhow!("SSID too long (max 32 chars)"))?,
        password: config
            .password
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("Password too long (max 64 chars)"))?,
        channel,
        auth_method,
        ..Default::default()
    }))?;

    backoff
        .retry_blocking(
            |attempt| {
                info!("Connecting to '{}' (attempt {})...", ssid, attempt);
                let result = wifi.connect().and_then(|_| {
                    info!("Waiting for DHCP lease...");
                    wifi.wait_netif_up()
                });
                if result.is_err() {
                    // Leave the driver idle before the next association attempt
                    let _ = wifi.disconnect();
                }
                result
            },
            std::thread::sleep,
        )
        .map_err(|e| anyhow!("WiFi join failed: {}", e))?;

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    info!("WiFi connected!");
    info!("  IP address: {}", ip_info.ip);
    info!("  Gateway:    {}", ip_info.subnet.gateway);
    info!("  Netmask:    {}", ip_info.subnet.mask);

    Ok(NetworkReady {
        _wifi: Box::new(esp_wifi),
        ip: ip_info.ip.to_string(),
    })
}
