//! Tracing subscriber shared by every subcommand.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber; a second call leaves the first in place.
///
/// `RUST_LOG` picks the filter (default `info`). Events are written to stderr,
/// leaving stdout to the `predict` JSON answer.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_line_number(true)
        .with_filter(filter);
    tracing_subscriber::registry().with(stderr_layer).try_init()?;
    Ok(())
}
