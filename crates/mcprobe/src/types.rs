//! Probe types and structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Host used when a configuration token or query omits one.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Fallback timeout applied when a caller passes a zero timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolve a caller-supplied timeout, zero meaning "use the default".
pub fn effective_timeout(timeout: Duration) -> Duration {
    if timeout.is_zero() {
        DEFAULT_TIMEOUT
    } else {
        timeout
    }
}

/// One memcached instance to probe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IP address
    pub host: String,

    /// TCP port, 0 when the configured text was not a valid port
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint from an already parsed port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Create an endpoint on the default host
    pub fn local(port: u16) -> Self {
        Self::new(DEFAULT_HOST, port)
    }

    /// Create an endpoint from raw port text, atoi style
    pub fn from_parts(host: impl Into<String>, port: &str) -> Self {
        Self::new(host, parse_port(port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Parse port text the way `atoi` does: optional leading whitespace and
/// sign, then leading decimal digits. Anything unusable yields 0.
pub fn parse_port(text: &str) -> u16 {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    text[..digits].parse().unwrap_or(0)
}

/// Outcome of a single stats query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// The key was present with this value
    Found(u64),

    /// The response ended without the key and without a transport error
    NotFound(String),

    /// Connect, write or read failed
    Failed(String),
}

impl QueryResult {
    /// Value of a successful query
    pub fn value(&self) -> Option<u64> {
        match self {
            QueryResult::Found(v) => Some(*v),
            _ => None,
        }
    }

    /// Check if the key was found
    pub fn is_found(&self) -> bool {
        matches!(self, QueryResult::Found(_))
    }

    /// Message reported to the collector for unsuccessful queries
    pub fn message(&self) -> Option<String> {
        match self {
            QueryResult::Found(_) => None,
            QueryResult::NotFound(key) => Some(format!("Not supported key [{}]", key)),
            QueryResult::Failed(reason) => Some(format!("Get memcached status error [{}]", reason)),
        }
    }
}

/// Outcome of a liveness round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingOutcome {
    /// Whether the echoed response matched
    pub alive: bool,

    /// Why the instance was reported dead, if it was
    pub diagnostic: Option<String>,
}

impl PingOutcome {
    /// Create an alive outcome
    pub fn alive() -> Self {
        Self {
            alive: true,
            diagnostic: None,
        }
    }

    /// Create a dead outcome
    pub fn dead(diagnostic: impl Into<String>) -> Self {
        Self {
            alive: false,
            diagnostic: Some(diagnostic.into()),
        }
    }

    /// The 0/1 value reported to the collector
    pub fn as_u64(&self) -> u64 {
        u64::from(self.alive)
    }
}

impl fmt::Display for PingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}
