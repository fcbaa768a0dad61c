//! ESP32-specific components for the servo node.
//!
//! This crate provides reusable components for ESP32-based servo nodes:
//! - WiFi join with bounded retry (the network ready signal)
//! - LEDC PWM servo driver
//! - `EspHttpServer` registration of the `/move` route
//! - Build-time WiFi credentials
//!
//! # Example
//!
//! ```ignore
//! use servo_esp32::{config::WifiConfig, http::start_http_server, wifi::join_network};
//!
//! let network = join_network(&WifiConfig::from_build_env(), &backoff, modem, sysloop, Some(nvs))?;
//! let _server = start_http_server(&network, 80, handler)?;
//! ```

pub mod config;
pub mod http;
pub mod servo;
pub mod wifi;
