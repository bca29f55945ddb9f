//! Logging initialization.
//!
//! Uses the `tracing` ecosystem with human-readable or JSON output. Sorcery's
//! own crates log at INFO (DEBUG with `--verbose`); everything else at WARN.
//! Telemetry events go to their own target so they can be filtered
//! separately, e.g. `RUST_LOG=info,sorcery::telemetry=off`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Target used by `sorcery_core::telemetry` events.
const TELEMETRY_TARGET: &str = "sorcery::telemetry";

/// Directives for the filter: `RUST_LOG` verbatim when set, else Sorcery's
/// defaults.
fn filter_directives(verbose: bool, rust_log: Option<String>) -> String {
    match rust_log.filter(|v| !v.trim().is_empty()) {
        Some(directives) => directives,
        None => {
            let level = if verbose { "debug" } else { "info" };
            format!("warn,sorcery={level},sorcery_core={level},{TELEMETRY_TARGET}=info")
        }
    }
}

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `verbose` - If true, Sorcery logs at DEBUG level; otherwise INFO.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
///
/// Log output goes to stderr; stdout carries the command's JSON result.
pub fn init(verbose: bool, json_format: bool) {
    let directives = filter_directives(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid log filter '{directives}': {e}");
        EnvFilter::new(filter_directives(verbose, None))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json_format {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(verbose)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}
