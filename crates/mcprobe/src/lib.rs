//! Memcached probe client.
//!
//! This crate discovers memcached instances from a configuration string and
//! queries them over the plain-text protocol:
//! - `stats` lookups of a single named counter
//! - `set`/`get` liveness round trips
//! - discovery payloads for a metrics collector
//!
//! Each query opens its own TCP connection, bounds every step with a timeout
//! and closes the connection on return. Nothing is cached between calls, so
//! probes for different instances can run concurrently.
//!
//! # Example
//!
//! ```no_run
//! use mcprobe::{Probe, QueryResult, endpoint};
//! use std::time::Duration;
//!
//! # async fn example() {
//! for ep in endpoint::parse("11211,10.0.0.5:11211") {
//!     let probe = Probe::new(ep, Duration::from_secs(2));
//!
//!     match probe.stat("curr_connections").await {
//!         QueryResult::Found(value) => println!("{}", value),
//!         other => eprintln!("{}", other.message().unwrap_or_default()),
//!     }
//!
//!     let alive = probe.ping().await.as_u64();
//! }
//! # }
//! ```

pub mod discovery;
pub mod endpoint;
pub mod ping;
pub mod probe;
pub mod stats;
pub mod transport;
pub mod types;

pub use discovery::{DiscoveryEntry, LldDocument};
pub use probe::Probe;
pub use transport::{LineSource, Session};
pub use types::{
    DEFAULT_HOST, DEFAULT_TIMEOUT, Endpoint, PingOutcome, QueryResult, effective_timeout,
};

/// Parse a configuration string into the endpoints to probe.
pub fn discover(config: &str) -> Vec<Endpoint> {
    endpoint::parse(config)
}
