//! HTTP control surface
//!
//! One request per connection, HTTP/1.0, no keep-alive: read a single
//! bounded chunk, act on the first request line, then always answer
//! with the status page and close. A request we cannot read or parse
//! still gets the page - the page is the answer to everything.

use embassy_net::tcp::TcpSocket;
use embedded_io_async::Write;
use heapless::String;
use log::{info, warn};

use wopr_core::config::Config;
use wopr_core::page::{self, PAGE_BUF};
use wopr_core::request;

use crate::led_matrix::LedMatrix;
use crate::sntp::TimeBase;
use crate::storage::ConfigStorage;

const HTTP_HEADER: &[u8] = b"HTTP/1.0 200 OK\r\nContent-type: text/html\r\n\r\n";

/// Serve one accepted connection, then release it.
pub async fn serve(
    socket: &mut TcpSocket<'_>,
    config: &mut Config,
    storage: &mut ConfigStorage,
    matrix: &mut LedMatrix<'_>,
    clock: &TimeBase,
) -> Result<(), embassy_net::tcp::Error> {
    let mut buf = [0u8; 1024];

    match socket.read(&mut buf).await {
        Ok(len) => {
            let line = first_line(&buf[..len]);
            info!("Request: {}", line);

            let effects = request::parse(line).apply(config);
            if effects.persist {
                if let Err(e) = storage.persist(config).await {
                    warn!("Config persist failed: {:?}", e);
                }
            }
            if effects.clear_display {
                if let Err(e) = matrix.clear().await {
                    warn!("Error clearing display: {:?}", e);
                }
            }
        }
        Err(e) => warn!("Read error: {:?}", e),
    }

    let mut body: String<PAGE_BUF> = String::new();
    if page::render(config, clock.local_time(config.timezone), &mut body).is_err() {
        warn!("Status page truncated");
    }

    socket.write_all(HTTP_HEADER).await?;
    socket.write_all(body.as_bytes()).await?;
    socket.flush().await?;
    socket.close();
    Ok(())
}

/// First request line of a raw chunk; empty on garbage input.
fn first_line(raw: &[u8]) -> &str {
    let text = core::str::from_utf8(raw).unwrap_or("");
    text.lines().next().unwrap_or("")
}
