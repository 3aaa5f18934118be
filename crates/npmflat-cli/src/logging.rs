//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate; the libraries only emit `tracing` events.
//! Everything goes to stderr so stdout carries nothing but the rendered output.

use miette::{IntoDiagnostic, Result};
use tracing::Level;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Targets whose level follows the `-v` flag.
const OWN_TARGETS: [&str; 2] = ["npmflat", "npmflat_core"];

/// Map the `-v` count to a level: 0 = INFO, 1 = DEBUG, 2+ = TRACE.
fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// `RUST_LOG` (default `warn`) with our own targets raised to `level`.
fn build_filter(level: Level) -> Result<EnvFilter, ParseError> {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    for target in OWN_TARGETS {
        filter = filter.add_directive(format!("{target}={level}").parse::<Directive>()?);
    }
    Ok(filter)
}

/// Install the global tracing subscriber.
///
/// `json` switches stderr output to JSON lines.
///
/// # Errors
/// Returns an error if a directive fails to parse or a subscriber is
/// already installed.
pub fn init(verbosity: u8, json: bool) -> Result<()> {
    let filter = build_filter(level_for(verbosity)).into_diagnostic()?;
    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .into_diagnostic()
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .into_diagnostic()
    }
}
