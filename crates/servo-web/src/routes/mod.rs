//! HTTP route handlers for the servo node.

pub mod servo;

use axum::Router;
use servo_core::{ActuatorDriver, CommandHandler};
use tower_http::trace::TraceLayer;

/// Create the Axum router.
///
/// Only `GET /move` is served; anything else is 404 (or 405 for other
/// methods on `/move`).
pub fn create_router<D, const N: usize>(handler: CommandHandler<D, N>) -> Router
where
    D: ActuatorDriver + 'static,
{
    Router::new()
        .merge(servo::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}
