//! Parsing of the `memcached_inst_ports` configuration value.

use crate::types::{DEFAULT_HOST, Endpoint};

const TRIM_CHARS: &[char] = &[' ', '\t', '\r', '\n'];

/// Parse a comma separated list of `host:port` or bare `port` tokens.
///
/// Never fails: empty input gives an empty list, empty tokens are skipped
/// and unusable port text becomes port 0.
pub fn parse(config: &str) -> Vec<Endpoint> {
    config
        .split(',')
        .filter(|token| !token.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Endpoint {
    match token.split_once(':') {
        None => Endpoint::from_parts(DEFAULT_HOST, token.trim_matches(TRIM_CHARS)),
        Some((host, raw_port)) => {
            let port = raw_port.trim_matches(TRIM_CHARS);
            if port.is_empty() {
                // Kept from the agent module: an empty port segment drops the
                // host and reuses the untrimmed segment as port text.
                Endpoint::from_parts(DEFAULT_HOST, raw_port)
            } else {
                Endpoint::from_parts(host.trim_matches(TRIM_CHARS), port)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_ports_use_default_host() {
        let endpoints = parse("11211,11212");
        assert_eq!(
            endpoints,
            vec![Endpoint::local(11211), Endpoint::local(11212)]
        );
    }

    #[test]
    fn test_host_and_port() {
        let endpoints = parse("10.0.0.5:11211");
        assert_eq!(endpoints, vec![Endpoint::new("10.0.0.5", 11211)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse(",,").is_empty());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let endpoints = parse(" 11211 ,\tcache-1 : 11212\r\n");
        assert_eq!(
            endpoints,
            vec![Endpoint::local(11211), Endpoint::new("cache-1", 11212)]
        );
    }

    #[test]
    fn test_non_numeric_port_is_zero() {
        let endpoints = parse("a:b,c");
        assert_eq!(endpoints, vec![Endpoint::new("a", 0), Endpoint::local(0)]);
    }

    #[test]
    fn test_empty_port_segment_falls_back_to_default_host() {
        assert_eq!(parse("cache-1:"), vec![Endpoint::local(0)]);
        assert_eq!(parse("cache-1:  "), vec![Endpoint::local(0)]);
    }

    #[test]
    fn test_split_at_first_colon() {
        let endpoints = parse("host:11211:extra");
        assert_eq!(endpoints, vec![Endpoint::new("host", 11211)]);
    }

    #[test]
    fn test_out_of_range_port_is_zero() {
        assert_eq!(parse("70000"), vec![Endpoint::local(0)]);
    }

    #[test]
    fn test_order_is_preserved() {
        let endpoints = parse("3,1,2");
        let ports: Vec<u16> = endpoints.iter().map(|e| e.port).collect();
        assert_eq!(ports, vec![3, 1, 2]);
    }
}
