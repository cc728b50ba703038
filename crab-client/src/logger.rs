//! Logging Infrastructure
//!
//! Structured logging for the sync client and any host embedding it.

use crate::config::LogConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. Returns `false` when a
/// subscriber was already installed.
pub fn init_logger(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let file_dir = config.dir.as_deref().filter(|dir| dir.exists());

    let installed = match (file_dir, config.json) {
        (Some(dir), true) => builder
            .json()
            .with_writer(tracing_appender::rolling::daily(dir, "crab-client"))
            .try_init(),
        (Some(dir), false) => builder
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, "crab-client"))
            .try_init(),
        (None, true) => builder.json().try_init(),
        (None, false) => builder.try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let config = LogConfig::default();
        let _ = init_logger(&config);
        assert!(!init_logger(&config));
    }
}
