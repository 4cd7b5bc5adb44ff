//! Liveness round trip: store a timestamp, read it back, compare.

use crate::transport::{LineSource, Session};
use crate::types::Endpoint;
use common::{Error, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Key written by the liveness check
pub const PING_KEY: &str = "ZBX_PING";

/// Client flags stored with the value; only echoed back, never interpreted
pub const PING_FLAGS: u32 = 521;

/// Expiry of the stored value in seconds
pub const PING_EXPTIME: u32 = 60;

/// Current local time as `YYYYMMDDHHMMSS`
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// The `set` + `get` + `quit` command for one round trip
pub fn command(stamp: &str) -> String {
    format!(
        "set {key} {flags} {exptime} {len}\r\n{stamp}\r\nget {key}\r\nquit\r\n",
        key = PING_KEY,
        flags = PING_FLAGS,
        exptime = PING_EXPTIME,
        len = stamp.len(),
    )
}

/// Every response line a healthy server sends, joined with no separator
pub fn expected_response(stamp: &str) -> String {
    format!(
        "STOREDVALUE {key} {flags} {len}{stamp}END",
        key = PING_KEY,
        flags = PING_FLAGS,
        len = stamp.len(),
    )
}

/// Read until the peer closes, concatenating lines without separators.
///
/// Gives up with a mismatch as soon as the response grows past `limit`
/// bytes, since it can no longer equal the expected echo.
pub async fn collect_response<L: LineSource + ?Sized>(
    lines: &mut L,
    limit: usize,
) -> Result<String> {
    let mut response = String::new();
    while let Some(line) = lines.next_line().await? {
        response.push_str(&line);
        if response.len() > limit {
            return Err(Error::protocol(format!(
                "response longer than the {} bytes expected",
                limit
            )));
        }
    }
    Ok(response)
}

/// Run one round trip over an open session with the given timestamp.
///
/// `Ok(())` when the echoed response matches exactly.
pub async fn round_trip<S>(session: &mut Session<S>, stamp: &str) -> Result<()>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
{
    session.send_command(command(stamp).as_bytes()).await?;
    let expected = expected_response(stamp);
    let response = collect_response(session, expected.len()).await?;

    if response == expected {
        Ok(())
    } else {
        Err(Error::protocol(format!(
            "unexpected response [{}], expected [{}]",
            response, expected
        )))
    }
}

/// Connect to `endpoint` and run a liveness round trip.
///
/// Returns `Ok(())` only when the instance stored and returned the fresh
/// timestamp; callers collapsing this to 0/1 should use [`crate::Probe::ping`].
pub async fn ping(endpoint: &Endpoint, timeout: Duration) -> Result<()> {
    let stamp = timestamp();
    let mut session = Session::connect(endpoint, timeout).await?;
    let result = round_trip(&mut session, &stamp).await;
    session.close();

    match &result {
        Ok(()) => debug!(endpoint = %endpoint, stamp = %stamp, "memcached instance is up"),
        Err(e) => warn!(endpoint = %endpoint, error = %e, "memcached ping failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let stamp = timestamp();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_command() {
        assert_eq!(
            command("20240101120000"),
            "set ZBX_PING 521 60 14\r\n20240101120000\r\nget ZBX_PING\r\nquit\r\n"
        );
    }

    #[test]
    fn test_expected_response_has_no_separators() {
        assert_eq!(
            expected_response("20240101120000"),
            "STOREDVALUE ZBX_PING 521 14".to_string() + "20240101120000" + "END"
        );
    }

    #[tokio::test]
    async fn test_round_trip_matches() {
        let stamp = "20240101120000";
        let mock = tokio_test::io::Builder::new()
            .write(command(stamp).as_bytes())
            .read(b"STORED\r\nVALUE ZBX_PING 521 14\r\n20240101120000\r\nEND\r\n")
            .build();
        let mut session = Session::new(mock, "mock", Duration::from_secs(1));

        assert!(round_trip(&mut session, stamp).await.is_ok());
    }

    #[tokio::test]
    async fn test_round_trip_single_byte_mismatch() {
        let stamp = "20240101120000";
        let mock = tokio_test::io::Builder::new()
            .write(command(stamp).as_bytes())
            .read(b"STORED\r\nVALUE ZBX_PING 521 14\r\n20240101120001\r\nEND\r\n")
            .build();
        let mut session = Session::new(mock, "mock", Duration::from_secs(1));

        let err = round_trip(&mut session, stamp).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_round_trip_not_stored() {
        let stamp = "20240101120000";
        let mock = tokio_test::io::Builder::new()
            .write(command(stamp).as_bytes())
            .read(b"SERVER_ERROR out of memory storing object\r\nEND\r\n")
            .build();
        let mut session = Session::new(mock, "mock", Duration::from_secs(1));

        assert!(round_trip(&mut session, stamp).await.is_err());
    }

    #[tokio::test]
    async fn test_round_trip_stops_once_response_is_too_long() {
        let stamp = "20240101120000";
        let chatter = "STAT x 1\r\n".repeat(8);
        // the peer never closes, so only the length check can end the read
        let mock = tokio_test::io::Builder::new()
            .write(command(stamp).as_bytes())
            .read(chatter.as_bytes())
            .wait(Duration::from_secs(30))
            .build();
        let mut session = Session::new(mock, "mock", Duration::from_secs(60));

        let start = std::time::Instant::now();
        let err = round_trip(&mut session, stamp).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
