//! HTTP server for the ESP32 servo node.
//!
//! Registers `GET /move` on `EspHttpServer` and answers with whatever the
//! shared [`CommandHandler`] decides.

use anyhow::Result;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::Write;
use log::info;
use servo_core::command::CONTENT_TYPE;
use servo_core::{ActuatorDriver, CommandHandler};

use crate::wifi::NetworkReady;

/// Start the HTTP server with the `/move` route.
///
/// The returned server must be kept alive for the route to keep serving.
pub fn start_http_server<D, const N: usize>(
    network: &NetworkReady,
    port: u16,
    handler: CommandHandler<D, N>,
) -> Result<EspHttpServer<'static>>
where
    D: ActuatorDriver + 'static,
{
    let mut server = EspHttpServer::new(&Configuration {
        http_port: port,
        ..Default::default()
    })?;

    server.fn_handler("/move", Method::Get, move |req| -> anyhow::Result<()> {
        let reply = handler.handle_query(req.uri());
        req.into_response(reply.status, None, &[("Content-Type", CONTENT_TYPE)])?
            .write_all(reply.body.as_bytes())?;
        Ok(())
    })?;

    info!("HTTP server ready at http://{}:{}/move", network.ip(), port);
    Ok(server)
}
