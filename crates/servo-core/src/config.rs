//! Node configuration.
//!
//! Everything here is fixed at startup; there is no runtime reconfiguration.
//! - Linux: optional JSON file, otherwise defaults
//! - ESP32: defaults, with WiFi credentials baked in at build time

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::actuator::SERVO_COUNT;
use crate::backoff::Backoff;
use crate::pulse::PulseProfile;

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration source.
    ReadError(String),
    /// Configuration data is invalid.
    InvalidData(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "Read error: {}", msg),
            ConfigError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Servo node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    /// Node name, used in logs.
    pub name: String,

    /// HTTP server port.
    pub http_port: u16,

    /// GPIO number driving each servo channel, by channel index.
    pub servo_pins: [u8; SERVO_COUNT],

    /// PWM timing shared by all servos.
    pub pulse: PulseProfile,

    /// Retry policy for the network startup phase.
    pub backoff: Backoff,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "servo-node".to_string(),
            http_port: 80,
            servo_pins: [13, 12, 14],
            pulse: PulseProfile::default(),
            backoff: Backoff::default(),
        }
    }
}

impl NodeConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidData(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Reject configurations the hardware cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, pin) in self.servo_pins.iter().enumerate() {
            if self.servo_pins[..i].contains(pin) {
                return Err(ConfigError::InvalidData(format!(
                    "GPIO {} is assigned to more than one servo",
                    pin
                )));
            }
        }
        if self.pulse.frequency_hz == 0 {
            return Err(ConfigError::InvalidData(
                "pulse frequency must be non-zero".to_string(),
            ));
        }
        if self.pulse.min_pulse_us >= self.pulse.max_pulse_us {
            return Err(ConfigError::InvalidData(format!(
                "min pulse {}us must be below max pulse {}us",
                self.pulse.min_pulse_us, self.pulse.max_pulse_us
            )));
        }
        if self.pulse.max_pulse_us > self.pulse.period_us() {
            return Err(ConfigError::InvalidData(format!(
                "max pulse {}us exceeds the {}us frame",
                self.pulse.max_pulse_us,
                self.pulse.period_us()
            )));
        }
        Ok(())
    }
}
