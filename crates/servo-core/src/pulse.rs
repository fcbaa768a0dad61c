//! Pulse-width math for hobby servos.
//!
//! Kept free of any PWM peripheral so it can be checked on the host; the
//! ESP32 LEDC driver feeds `duty_for` its timer's maximum duty.

use serde::{Deserialize, Serialize};

use crate::actuator::MAX_POSITION;

/// PWM timing of a servo: frame rate and the pulse widths at 0° and 180°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PulseProfile {
    pub frequency_hz: u32,
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
}

impl Default for PulseProfile {
    /// SG90-class servo: 50 Hz frames, 500 µs to 2500 µs.
    fn default() -> Self {
        Self {
            frequency_hz: 50,
            min_pulse_us: 500,
            max_pulse_us: 2500,
        }
    }
}

impl PulseProfile {
    /// Length of one PWM frame in microseconds.
    pub fn period_us(&self) -> u32 {
        1_000_000 / self.frequency_hz.max(1)
    }

    /// Pulse width for `degrees`, clamped to 180.
    pub fn pulse_width_us(&self, degrees: u8) -> u32 {
        let degrees = u32::from(degrees.min(MAX_POSITION));
        let span = self.max_pulse_us.saturating_sub(self.min_pulse_us);
        self.min_pulse_us + degrees * span / u32::from(MAX_POSITION)
    }

    /// Duty value for `degrees` on a PWM channel whose full scale is `max_duty`.
    pub fn duty_for(&self, degrees: u8, max_duty: u32) -> u32 {
        let duty = u64::from(self.pulse_width_us(degrees)) * u64::from(max_duty)
            / u64::from(self.period_us());
        duty.min(u64::from(max_duty)) as u32
    }
}
