use servo_core::{CommandHandler, NodeConfig, ServoBank, SimulatedServo};
use servo_web::{bind_with_backoff, create_router};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,servo_core=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration
    let config = match std::env::var("SERVO_NODE_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            NodeConfig::load(&path)?
        }
        Err(_) => NodeConfig {
            http_port: 3001,
            ..Default::default()
        },
    };
    let addr: SocketAddr = match std::env::var("SERVO_NODE_ADDR") {
        Ok(addr) => addr.parse()?,
        Err(_) => SocketAddr::from(([0, 0, 0, 0], config.http_port)),
    };

    tracing::info!("{} starting...", config.name);

    // Servo bank: one simulated servo per configured pin
    let bank = ServoBank::new(
        config
            .servo_pins
            .map(|pin| SimulatedServo::new(format!("gpio{}", pin))),
    );
    let handler = CommandHandler::new(Arc::new(bank));

    // Startup phase: the router is served only once the listener is bound
    let listener = bind_with_backoff(addr, &config.backoff).await?;
    let app = create_router(handler);

    tracing::info!("🚀 {} ready!", config.name);
    tracing::info!("Try:");
    tracing::info!("   curl 'http://{}/move?channel=0&target=90'", addr);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        result = axum::serve(listener, app).into_future() => {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {}", e);
            }
            tracing::warn!("HTTP server stopped");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
