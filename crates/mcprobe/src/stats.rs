//! `stats` command: fetch one named counter.

use crate::transport::{LineSource, Session};
use crate::types::Endpoint;
use common::Result;
use std::time::Duration;
use tracing::{debug, trace};

/// Exact bytes sent for a stats query
pub const STATS_COMMAND: &[u8] = b"stats\r\nquit\r\n";

/// Terminator of a multi-line text protocol response
pub const END_SENTINEL: &str = "END";

/// One `STAT <name> <value>` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine<'a> {
    pub name: &'a str,
    pub value: u64,
}

impl<'a> StatLine<'a> {
    /// Parse a response line.
    ///
    /// The first token is skipped without checking it, the second is the
    /// name, and the value is the run of leading digits of the third token.
    /// Lines that do not fit are `None`.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut tokens = line.split_ascii_whitespace();
        tokens.next()?;
        let name = tokens.next()?;
        let raw = tokens.next()?;

        let digits = raw.bytes().take_while(u8::is_ascii_digit).count();
        let value = raw[..digits].parse().ok()?;

        Some(StatLine { name, value })
    }
}

/// Scan a stats response for `key`.
///
/// Stops at the first matching line without reading further, and at the
/// `END` sentinel or end of stream otherwise.
pub async fn find_stat<L: LineSource + ?Sized>(lines: &mut L, key: &str) -> Result<Option<u64>> {
    while let Some(line) = lines.next_line().await? {
        if line == END_SENTINEL {
            break;
        }

        match StatLine::parse(&line) {
            Some(stat) if stat.name == key => return Ok(Some(stat.value)),
            Some(_) => {}
            None => trace!(line = %line, "skipping non-stat line"),
        }
    }

    Ok(None)
}

/// Run a stats query over an open session.
pub async fn query<S>(session: &mut Session<S>, key: &str) -> Result<Option<u64>>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
{
    session.send_command(STATS_COMMAND).await?;
    find_stat(session, key).await
}

/// Connect to `endpoint` and look up one statistic.
///
/// `Ok(None)` means the server answered but has no such key; transport
/// failures are always `Err`.
pub async fn get_stat(endpoint: &Endpoint, key: &str, timeout: Duration) -> Result<Option<u64>> {
    let mut session = Session::connect(endpoint, timeout).await?;
    let result = query(&mut session, key).await;
    session.close();

    if let Ok(found) = &result {
        debug!(endpoint = %endpoint, key, found = found.is_some(), "stats query complete");
    }
    result
}
