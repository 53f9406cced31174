//! Tracing subscriber setup for binaries and embedding servers.

use crate::config::LoggingConfig;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Crate directive applied when no explicit filter is configured.
const DEFAULT_FILTER: &str = "grpcbridge=info";

/// Build the `EnvFilter` for `config`.
///
/// `RUST_LOG`, when set, replaces the configured filter entirely.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level: Level = config.level.parse().unwrap_or(Level::INFO);
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(config.filter.as_deref().unwrap_or(DEFAULT_FILTER))
}

/// Install the global fmt subscriber.
///
/// Returns `false` when another subscriber was already installed; the
/// existing one is kept.
pub fn init(config: &LoggingConfig) -> bool {
    match tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
    {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, "Tracing subscriber already installed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LoggingConfig {
            level: "debug".into(),
            filter: Some("grpcbridge::dispatch=trace".into()),
        };
        init(&config);
        assert!(!init(&config));
    }

    #[test]
    fn test_bad_level_falls_back() {
        let config = LoggingConfig {
            level: "loud".into(),
            filter: None,
        };
        let _ = env_filter(&config);
    }
}
