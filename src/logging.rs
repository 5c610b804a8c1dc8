//! Diagnostic logging
//!
//! User-facing output goes to stdout through `colored`; diagnostics go to
//! stderr through `tracing`. The filter comes from, in order: `RUST_LOG`,
//! the `-v`/`-q` flags, the config file, and finally `warn`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for a verbosity level
///
/// `quiet` wins over any number of `-v`. Returns `None` at the default level
/// so the configured level can apply.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> Option<&'static str> {
    if quiet {
        return Some("error");
    }
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Build the filter from the environment, flags and config
#[must_use]
pub fn filter_for(verbose: u8, quiet: bool, configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directive = level_for(verbose, quiet)
        .or(configured)
        .unwrap_or("warn");
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(verbose: u8, quiet: bool, configured: Option<&str>) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter_for(verbose, quiet, configured))
        .with(fmt_layer)
        .try_init();
}
