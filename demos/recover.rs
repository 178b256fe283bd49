//! Run with
//!
//! ```not_rust
//! cargo run --example recover
//! ```
//!

use std::num::ParseIntError;

use eager_deferred::{Deferred, ErrorKind, Failure};

#[path = "util/util.rs"]
mod util;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
#[error("Port {0} is reserved")]
struct ReservedPort(u16);

/// Same code path for callers that finalize and callers that await.
fn configured_port(raw: &str) -> Deferred<u16> {
    let mut deferred = Deferred::execute(|| raw.trim().parse::<u16>());

    deferred
        .on_success(|port| {
            if port < 1024 {
                return Err(ReservedPort(port));
            }

            Ok(port)
        })
        .on_failure(|failure| -> Result<u16, Failure> {
            let kind = failure.trap(&[ErrorKind::of::<ParseIntError>()])?;

            tracing::info!(%kind, %failure, "Falling back to the default port");

            Ok(DEFAULT_PORT)
        })
        .on_both(|current| {
            tracing::debug!(?current, "Port resolved");

            current
        });

    deferred
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    util::init("recover")?;

    let port = configured_port("9000").finalize()?;
    tracing::info!(port, "Synchronous caller");

    let port = configured_port("not a port").await?;
    tracing::info!(port, "Asynchronous caller");

    match configured_port("80").finalize() {
        Ok(port) => tracing::info!(port, "Unexpected port"),
        Err(failure) => tracing::info!(%failure, location = ?failure.location(), "Rejected"),
    }

    Ok(())
}
