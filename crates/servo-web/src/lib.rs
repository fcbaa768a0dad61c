//! # servo-web
//!
//! HTTP surface of the servo node for hosted (Linux) builds.
//!
//! This crate provides:
//! - The `GET /move` route, backed by [`servo_core::CommandHandler`]
//! - Listener startup with bounded retry and exponential backoff
//!
//! ## Usage
//!
//! ```rust,ignore
//! use servo_web::{bind_with_backoff, create_router};
//!
//! let handler = CommandHandler::new(Arc::new(bank));
//! let listener = bind_with_backoff(addr, &Backoff::default()).await?;
//! axum::serve(listener, create_router(handler)).await?;
//! ```

pub mod listener;
pub mod routes;

// Re-exports
pub use listener::bind_with_backoff;
pub use routes::create_router;
