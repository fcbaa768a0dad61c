//! # servo-core
//!
//! Core servo node logic.
//!
//! This crate provides:
//! - Actuator channels and the fixed-size servo bank
//! - The `/move` command handler (validation, dispatch, textual reply)
//! - Query-string parameter extraction
//! - Pulse-width math for hobby servos
//! - Retry/backoff policy for the network join phase
//! - Node configuration types
//!
//! This crate is intentionally runtime-agnostic and contains no async code,
//! making it usable on both Linux (tokio) and ESP32 (esp-idf) targets.

pub mod actuator;
pub mod backoff;
pub mod command;
pub mod config;
pub mod pulse;
pub mod query;

pub use actuator::{
    ActuatorChannel, ActuatorDriver, DriverError, ServoBank, SimulatedServo, MAX_POSITION,
    SERVO_COUNT,
};
pub use backoff::{Backoff, RetryError};
pub use command::{CommandError, CommandHandler, MoveCommand, MoveResponse};
pub use config::{ConfigError, NodeConfig};
pub use pulse::PulseProfile;
