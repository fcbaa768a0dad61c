//! Servo command route.
//!
//! # Endpoints
//!
//! ### `GET /move?channel=<int>&target=<int>`
//! Moves one servo. Replies in plain text:
//! - `200` `Moved servo <channel> to position <target>`
//! - `400` `Missing parameters`
//! - `400` `Invalid servo index or position`
//! - `500` `Actuator write failed`

use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use servo_core::command::CONTENT_TYPE;
use servo_core::{ActuatorDriver, CommandHandler, MoveResponse};

/// Create servo routes.
pub fn routes<D, const N: usize>() -> Router<CommandHandler<D, N>>
where
    D: ActuatorDriver + 'static,
{
    Router::new().route("/move", get(move_servo::<D, N>))
}

/// GET /move
async fn move_servo<D, const N: usize>(
    State(handler): State<CommandHandler<D, N>>,
    RawQuery(query): RawQuery,
) -> Response
where
    D: ActuatorDriver + 'static,
{
    text_response(handler.handle_query(query.as_deref().unwrap_or_default()))
}

fn text_response(reply: MoveResponse) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, CONTENT_TYPE)], reply.body).into_response()
}
