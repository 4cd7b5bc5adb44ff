//! Logging utilities for mcprobe components.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize tracing with sensible defaults.
///
/// Uses the RUST_LOG environment variable to control log levels.
/// Default level is INFO.
pub fn init() {
    init_with_level("info", false);
}

/// Initialize tracing with JSON formatting (useful for structured logging).
pub fn init_json() {
    init_with_level("info", true);
}

/// Initialize tracing with an explicit fallback level.
///
/// RUST_LOG still wins when set. Logs go to stderr so that query results
/// printed on stdout stay machine readable. Calling this twice is harmless.
pub fn init_with_level(default_level: &str, json: bool) {
    let registry = tracing_subscriber::registry().with(filter(default_level));

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init();
        init_json();
        init_with_level("debug", false);
        tracing::info!("still logging after repeated init");
    }

    #[test]
    fn test_filter_falls_back_to_default_level() {
        let filter = filter("warn");
        assert!(!filter.to_string().is_empty());
    }
}
