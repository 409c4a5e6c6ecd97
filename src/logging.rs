// Tracing setup shared by the binaries

use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Install the global subscriber: `RUST_LOG` filter (default `info`), plain
/// text to stderr with targets.
///
/// `log` records from dependencies are forwarded into tracing as well.
pub fn init() {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    // Ignore a second initialisation attempt
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .try_init();
}
