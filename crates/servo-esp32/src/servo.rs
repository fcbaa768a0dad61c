//! LEDC PWM servo driver.
//!
//! All servos share one LEDC timer running at the profile's frame rate; each
//! servo owns one LEDC channel.

use esp_idf_svc::hal::gpio::AnyOutputPin;
use esp_idf_svc::hal::ledc::{config::TimerConfig, LedcDriver, Resolution};
use esp_idf_svc::hal::prelude::*;
use log::debug;
use servo_core::{ActuatorDriver, DriverError, PulseProfile};

/// Timer resolution used for servo PWM.
pub const SERVO_RESOLUTION: Resolution = Resolution::Bits14;

/// LEDC timer configuration for `profile`.
pub fn timer_config(profile: &PulseProfile) -> TimerConfig {
    TimerConfig::new()
        .frequency(profile.frequency_hz.Hz().into())
        .resolution(SERVO_RESOLUTION)
}

/// GPIO pin by number, as taken from `NodeConfig::servo_pins`.
///
/// # Safety
///
/// The pin must not be driven by anything else. The caller owns the pin map.
pub unsafe fn servo_pin(gpio: u8) -> AnyOutputPin {
    AnyOutputPin::new(i32::from(gpio))
}

/// One servo on an LEDC channel.
pub struct LedcServo {
    ledc: LedcDriver<'static>,
    max_duty: u32,
    profile: PulseProfile,
}

impl LedcServo {
    pub fn new(ledc: LedcDriver<'static>, profile: PulseProfile) -> Self {
        let max_duty = ledc.get_max_duty();
        Self {
            ledc,
            max_duty,
            profile,
        }
    }
}

impl ActuatorDriver for LedcServo {
    fn write(&mut self, degrees: u8) -> Result<(), DriverError> {
        let duty = self.profile.duty_for(degrees, self.max_duty);
        debug!("LEDC duty {}/{} for {} degrees", duty, self.max_duty, degrees);
        self.ledc
            .set_duty(duty)
            .map_err(|e| DriverError::Rejected(e.to_string()))
    }
}
