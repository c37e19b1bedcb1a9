//! Logging initialization

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter directive for the configured level and CLI verbosity.
///
/// `-v` raises to info, `-vv` to debug, `-vvv` and above to trace; without
/// `-v` the configured level applies.
#[must_use]
pub fn effective_level(cfg: &LoggingConfig, verbose: u8) -> &str {
    match verbose {
        0 => cfg.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr. `RUST_LOG`, when set, overrides both the configured level
/// and `verbose`.
///
/// # Errors
/// Returns an error if the level directive is invalid or a global subscriber is
/// already installed.
pub fn init_logging(cfg: &LoggingConfig, verbose: u8) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(effective_level(cfg, verbose))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if cfg.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| anyhow::anyhow!(err))
}
