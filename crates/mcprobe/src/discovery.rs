//! Discovery payloads built from parsed endpoints.

use crate::types::Endpoint;
use common::Result;
use serde::{Deserialize, Serialize};

/// One discovered instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEntry {
    pub host: String,
    pub port: u16,
}

impl From<&Endpoint> for DiscoveryEntry {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            host: endpoint.host.clone(),
            port: endpoint.port,
        }
    }
}

/// Map endpoints to discovery entries, keeping their order.
pub fn format(endpoints: &[Endpoint]) -> Vec<DiscoveryEntry> {
    endpoints.iter().map(DiscoveryEntry::from).collect()
}

/// Low-level discovery row as the monitoring agent expects it, with the
/// instance exposed through `{#MCHOST}` and `{#MCPORT}` macros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LldRow {
    #[serde(rename = "{#MCHOST}")]
    pub host: String,

    #[serde(rename = "{#MCPORT}")]
    pub port: String,
}

/// `{"data": [...]}` envelope of a low-level discovery reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LldDocument {
    pub data: Vec<LldRow>,
}

impl LldDocument {
    /// Build the agent document from discovery entries
    pub fn new(entries: &[DiscoveryEntry]) -> Self {
        Self {
            data: entries
                .iter()
                .map(|entry| LldRow {
                    host: entry.host.clone(),
                    port: entry.port.to_string(),
                })
                .collect(),
        }
    }

    /// Serialize to the JSON string handed back to the agent
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
