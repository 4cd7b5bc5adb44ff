//! Query boundary: network errors become result values here.

use crate::types::{Endpoint, PingOutcome, QueryResult};
use crate::{ping, stats};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Probe for one memcached instance
#[derive(Debug, Clone)]
pub struct Probe {
    endpoint: Endpoint,
    timeout_duration: Duration,
}

impl Probe {
    /// Create a new probe. A zero timeout selects the default.
    pub fn new(endpoint: Endpoint, timeout_duration: Duration) -> Self {
        Self {
            endpoint,
            timeout_duration,
        }
    }

    /// Endpoint this probe talks to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Fetch one statistic over a fresh connection
    pub async fn stat(&self, key: &str) -> QueryResult {
        let start = Instant::now();

        match stats::get_stat(&self.endpoint, key, self.timeout_duration).await {
            Ok(Some(value)) => {
                debug!(
                    endpoint = %self.endpoint,
                    key,
                    value,
                    duration_ms = start.elapsed().as_millis(),
                    "stat found"
                );
                QueryResult::Found(value)
            }
            Ok(None) => {
                warn!(endpoint = %self.endpoint, key, "can't find key");
                QueryResult::NotFound(key.to_string())
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, key, error = %e, "get memcached status error");
                QueryResult::Failed(e.to_string())
            }
        }
    }

    /// Store-and-fetch round trip; every failure collapses to "dead"
    pub async fn ping(&self) -> PingOutcome {
        match ping::ping(&self.endpoint, self.timeout_duration).await {
            Ok(()) => PingOutcome::alive(),
            Err(e) => PingOutcome::dead(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stat_refused_is_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = Probe::new(Endpoint::local(port), Duration::from_millis(500));
        let result = probe.stat("uptime").await;

        assert!(matches!(result, QueryResult::Failed(_)));
        assert!(result
            .message()
            .unwrap()
            .starts_with("Get memcached status error ["));
    }

    #[tokio::test]
    async fn test_ping_refused_is_dead_with_diagnostic() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = Probe::new(Endpoint::local(port), Duration::from_millis(500));
        let outcome = probe.ping().await;

        assert!(!outcome.alive);
        assert_eq!(outcome.as_u64(), 0);
        assert!(outcome.diagnostic.is_some());
    }
}
