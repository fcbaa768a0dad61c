//! Listener startup.
//!
//! Binding is the hosted counterpart of the ESP32 WiFi join: it gates the
//! HTTP server and is retried with the same backoff policy.

use std::net::SocketAddr;

use servo_core::{Backoff, RetryError};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Bind `addr`, retrying with `backoff` while the address is unavailable.
///
/// Returning the listener is the ready signal: the router is only served
/// once this resolves.
pub async fn bind_with_backoff(
    addr: SocketAddr,
    backoff: &Backoff,
) -> Result<TcpListener, RetryError<std::io::Error>> {
    let attempts = backoff.attempts();
    let mut delays = backoff.delays();
    let mut attempt = 1;

    loop {
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("HTTP server listening on {}", addr);
                return Ok(listener);
            }
            Err(last) if attempt >= attempts => {
                return Err(RetryError::Exhausted { attempts, last });
            }
            Err(err) => {
                let delay = delays.next().unwrap_or(backoff.max_delay);
                warn!(
                    "Bind {} failed (attempt {}/{}): {}; retrying in {:?}",
                    addr, attempt, attempts, err, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
