//! Logging and tracing initialization.
//!
//! Library crates only emit `tracing` events. Installing a subscriber is
//! the caller's decision: binaries call [`init_logging`] once, while tests
//! and embedding applications can scope a subscriber with
//! [`scoped_subscriber`] and `tracing::subscriber::with_default`.

use tracing::Dispatch;

use crate::config::LoggingConfig;

/// Build a dispatcher for the given configuration without installing it.
pub fn scoped_subscriber(config: &LoggingConfig) -> Dispatch {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        Dispatch::new(
            fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .with_writer(std::io::stderr)
                .finish(),
        )
    } else {
        Dispatch::new(
            fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .finish(),
        )
    }
}

/// Install the subscriber built from `config` as the process default.
pub fn init_logging(config: &LoggingConfig) {
    tracing::dispatcher::set_global_default(scoped_subscriber(config)).ok();
}

/// Initialize logging with defaults (useful for quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
