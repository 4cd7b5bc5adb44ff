//! Item dispatch: turns an item request into the value handed to the collector.

use crate::config::Config;
use crate::item::{Item, ItemError};
use mcprobe::{LldDocument, Probe, QueryResult, discovery};
use std::time::Duration;
use tracing::debug;

/// Value returned for an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValue {
    Text(String),
    Unsigned(u64),
}

impl std::fmt::Display for ItemValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemValue::Text(s) => f.write_str(s),
            ItemValue::Unsigned(v) => write!(f, "{}", v),
        }
    }
}

/// Answers item requests with one fresh query each
#[derive(Debug, Clone)]
pub struct Agent {
    config: Config,
}

impl Agent {
    /// Create a new agent
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn timeout(&self) -> Duration {
        self.config.probe.timeout
    }

    /// Handle one item request
    pub async fn handle(&self, item: &Item) -> Result<ItemValue, ItemError> {
        debug!(?item, "handling item");

        match item {
            Item::Discovery => {
                let entries = discovery::format(&self.config.endpoints());
                LldDocument::new(&entries)
                    .to_json()
                    .map(ItemValue::Text)
                    .map_err(|e| ItemError::Failed(e.to_string()))
            }
            Item::Status(status) => {
                let probe = Probe::new(status.endpoint.clone(), self.timeout());
                match probe.stat(&status.key).await {
                    QueryResult::Found(value) => Ok(ItemValue::Unsigned(value)),
                    other => Err(ItemError::Failed(other.message().unwrap_or_default())),
                }
            }
            Item::Ping(ping) => {
                let probe = Probe::new(ping.endpoint.clone(), self.timeout());
                Ok(ItemValue::Unsigned(probe.ping().await.as_u64()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::PingItem;
    use mcprobe::Endpoint;

    #[tokio::test]
    async fn test_discovery_from_config() {
        let config = Config::from_yaml("memcached_inst_ports: \"11211,cache-1:11212\"").unwrap();
        let agent = Agent::new(config);

        let value = agent.handle(&Item::Discovery).await.unwrap();
        assert_eq!(
            value.to_string(),
            r#"{"data":[{"{#MCHOST}":"127.0.0.1","{#MCPORT}":"11211"},{"{#MCHOST}":"cache-1","{#MCPORT}":"11212"}]}"#
        );
    }

    #[tokio::test]
    async fn test_discovery_without_ports_is_empty() {
        let agent = Agent::new(Config::default());
        let value = agent.handle(&Item::Discovery).await.unwrap();
        assert_eq!(value, ItemValue::Text(r#"{"data":[]}"#.to_string()));
    }

    #[tokio::test]
    async fn test_ping_refused_is_zero_not_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let agent = Agent::new(Config::default());
        let item = Item::Ping(PingItem {
            endpoint: Endpoint::local(port),
        });

        assert_eq!(agent.handle(&item).await, Ok(ItemValue::Unsigned(0)));
    }
}
