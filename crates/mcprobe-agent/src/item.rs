//! Agent item keys and their parameters.
//!
//! Three keys are supported:
//! - `memcached.discovery`
//! - `memcached.status[<host>,<port>,<key>]` or `memcached.status[<port>,<key>]`
//! - `memcached.ping[<host>,<port>]` or `memcached.ping[<port>]`

use mcprobe::{DEFAULT_HOST, Endpoint};
use thiserror::Error;

pub const DISCOVERY_KEY: &str = "memcached.discovery";
pub const STATUS_KEY: &str = "memcached.status";
pub const PING_KEY: &str = "memcached.ping";

/// Item request errors, reported to the collector as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("Invalid number of parameters")]
    InvalidParameterCount,

    #[error("Unsupported item key [{0}]")]
    UnknownKey(String),

    #[error("Invalid item key format [{0}]")]
    Malformed(String),

    #[error("{0}")]
    Failed(String),
}

/// Parameters of a status item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusItem {
    pub endpoint: Endpoint,
    pub key: String,
}

impl StatusItem {
    /// `[host, port, key]` or `[port, key]`
    pub fn from_params<S: AsRef<str>>(params: &[S]) -> Result<Self, ItemError> {
        let (host, port, key) = match params {
            [host, port, key] => (host.as_ref(), port.as_ref(), key.as_ref()),
            [port, key] => (DEFAULT_HOST, port.as_ref(), key.as_ref()),
            _ => return Err(ItemError::InvalidParameterCount),
        };

        Ok(Self {
            endpoint: Endpoint::from_parts(host, port),
            key: key.to_string(),
        })
    }
}

/// Parameters of a ping item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingItem {
    pub endpoint: Endpoint,
}

impl PingItem {
    /// `[host, port]` or `[port]`
    pub fn from_params<S: AsRef<str>>(params: &[S]) -> Result<Self, ItemError> {
        let endpoint = match params {
            [host, port] => Endpoint::from_parts(host.as_ref(), port.as_ref()),
            [port] => Endpoint::from_parts(DEFAULT_HOST, port.as_ref()),
            _ => return Err(ItemError::InvalidParameterCount),
        };
        Ok(Self { endpoint })
    }
}

/// A parsed item request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Discovery,
    Status(StatusItem),
    Ping(PingItem),
}

impl Item {
    /// Parse a full item key such as `memcached.status[11211,uptime]`.
    pub fn parse(item_key: &str) -> Result<Self, ItemError> {
        let item_key = item_key.trim();
        let (name, params) = split_key(item_key)?;

        match name {
            DISCOVERY_KEY if params.is_empty() => Ok(Item::Discovery),
            DISCOVERY_KEY => Err(ItemError::InvalidParameterCount),
            STATUS_KEY => StatusItem::from_params(params.as_slice()).map(Item::Status),
            PING_KEY => PingItem::from_params(params.as_slice()).map(Item::Ping),
            other => Err(ItemError::UnknownKey(other.to_string())),
        }
    }
}

/// Split `name[p1,p2,...]` into the name and its parameters.
///
/// Parameters are trimmed; a parameter wrapped in double quotes keeps
/// commas and brackets and has its quotes removed.
fn split_key(item_key: &str) -> Result<(&str, Vec<String>), ItemError> {
    let malformed = || ItemError::Malformed(item_key.to_string());

    let Some(open) = item_key.find('[') else {
        if item_key.is_empty() || item_key.contains(']') {
            return Err(malformed());
        }
        return Ok((item_key, Vec::new()));
    };

    let name = &item_key[..open];
    let body = item_key[open + 1..]
        .strip_suffix(']')
        .ok_or_else(malformed)?;
    if name.is_empty() {
        return Err(malformed());
    }

    let mut params = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in body.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => params.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    if quoted {
        return Err(malformed());
    }
    if !body.is_empty() {
        params.push(current.trim().to_string());
    }

    Ok((name, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_params() {
        let item = StatusItem::from_params(&["10.0.0.5", "11211", "uptime"]).unwrap();
        assert_eq!(item.endpoint, Endpoint::new("10.0.0.5", 11211));
        assert_eq!(item.key, "uptime");

        let item = StatusItem::from_params(&["11212", "curr_items"]).unwrap();
        assert_eq!(item.endpoint, Endpoint::local(11212));

        assert_eq!(
            StatusItem::from_params(&["uptime"]),
            Err(ItemError::InvalidParameterCount)
        );
        assert_eq!(
            StatusItem::from_params::<&str>(&[]),
            Err(ItemError::InvalidParameterCount)
        );
    }

    #[test]
    fn test_ping_params() {
        assert_eq!(
            PingItem::from_params(&["11211"]).unwrap().endpoint,
            Endpoint::local(11211)
        );
        assert_eq!(
            PingItem::from_params(&["cache-1", "11300"]).unwrap().endpoint,
            Endpoint::new("cache-1", 11300)
        );
        assert_eq!(
            PingItem::from_params(&["a", "b", "c"]),
            Err(ItemError::InvalidParameterCount)
        );
    }

    #[test]
    fn test_parse_item_keys() {
        assert_eq!(Item::parse("memcached.discovery"), Ok(Item::Discovery));
        assert_eq!(Item::parse("memcached.discovery[]"), Ok(Item::Discovery));
        assert_eq!(
            Item::parse("memcached.status[11211, uptime]"),
            Ok(Item::Status(StatusItem {
                endpoint: Endpoint::local(11211),
                key: "uptime".into(),
            }))
        );
        assert_eq!(
            Item::parse(r#"memcached.ping["cache-1",11211]"#),
            Ok(Item::Ping(PingItem {
                endpoint: Endpoint::new("cache-1", 11211),
            }))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Item::parse("memcached.ping[]"),
            Err(ItemError::InvalidParameterCount)
        );
        assert_eq!(
            Item::parse("redis.ping[6379]"),
            Err(ItemError::UnknownKey("redis.ping".into()))
        );
        assert!(matches!(
            Item::parse("memcached.status[11211,uptime"),
            Err(ItemError::Malformed(_))
        ));
        assert!(matches!(Item::parse("[11211]"), Err(ItemError::Malformed(_))));
        assert!(matches!(Item::parse(""), Err(ItemError::Malformed(_))));
    }

    #[test]
    fn test_quoted_params_keep_commas() {
        let (name, params) = split_key(r#"k["a,b", c]"#).unwrap();
        assert_eq!(name, "k");
        assert_eq!(params, vec!["a,b".to_string(), "c".to_string()]);
    }
}
