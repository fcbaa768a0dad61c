//! WiFi credentials.
//!
//! Credentials are baked in at build time from the `WIFI_SSID` and
//! `WIFI_PASS` environment variables. The rest of the node configuration is
//! `servo_core::NodeConfig`.

/// WiFi station credentials.
#[derive(Debug, Clone, Default)]
pub struct WifiConfig {
    /// WiFi network SSID.
    pub ssid: String,

    /// WiFi network password (empty for open networks).
    pub password: String,
}

impl WifiConfig {
    /// Credentials captured when the firmware was compiled.
    pub fn from_build_env() -> Self {
        Self {
            ssid: option_env!("WIFI_SSID").unwrap_or_default().to_string(),
            password: option_env!("WIFI_PASS").unwrap_or_default().to_string(),
        }
    }
}
