//! Memcached probe agent.
//!
//! Glue between a monitoring agent and the [`mcprobe`] client:
//!
//! - **Config**: YAML file holding `memcached_inst_ports`, the query timeout
//!   and logging settings
//! - **Item**: parsing of `memcached.discovery`, `memcached.status[...]` and
//!   `memcached.ping[...]` requests
//! - **Agent**: runs one query per item and produces the collector value
//!
//! The `mcprobe` binary exposes the same items on the command line.

pub mod agent;
pub mod config;
pub mod item;

pub use agent::{Agent, ItemValue};
pub use config::{Config, ConfigError, Requirement};
pub use item::{Item, ItemError, PingItem, StatusItem};
