//! Single-connection transport for the memcached text protocol.
//!
//! A [`Session`] owns one stream for the lifetime of one query. Every
//! suspension point (connect, write, each line read) is bounded by the
//! session timeout, and once a command is sent the whole response must
//! arrive within one more timeout. Lines longer than [`MAX_LINE_LEN`] are
//! rejected. Dropping the session closes the socket, whether or not the
//! response was fully consumed.

use crate::types::{Endpoint, effective_timeout};
use async_trait::async_trait;
use common::{Error, Result};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, trace, warn};

/// Longest response line accepted, terminator excluded
pub const MAX_LINE_LEN: usize = 2048;

/// A source of response lines, terminator already stripped.
#[async_trait]
pub trait LineSource: Send {
    /// Next line, or `None` once the peer has closed the stream.
    async fn next_line(&mut self) -> Result<Option<String>>;
}

/// One open connection to a memcached instance
pub struct Session<S> {
    stream: BufReader<S>,
    label: String,
    timeout_duration: Duration,
    response_deadline: Option<Instant>,
    line: Vec<u8>,
}

impl Session<TcpStream> {
    /// Connect to an endpoint, giving up after `timeout_duration`
    /// (zero selects the default timeout).
    pub async fn connect(endpoint: &Endpoint, timeout_duration: Duration) -> Result<Self> {
        let timeout_duration = effective_timeout(timeout_duration);
        let start = Instant::now();

        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        match timeout(timeout_duration, connect).await {
            Ok(Ok(stream)) => {
                debug!(endpoint = %endpoint, duration_ms = start.elapsed().as_millis(), "connected");
                Ok(Session::new(stream, endpoint.to_string(), timeout_duration))
            }
            Ok(Err(e)) => {
                warn!(endpoint = %endpoint, error = %e, "connect failed");
                Err(Error::connect(endpoint, e))
            }
            Err(_) => {
                warn!(endpoint = %endpoint, "connect timed out");
                Err(Error::timeout("connect", start.elapsed()))
            }
        }
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already connected stream
    pub fn new(stream: S, label: impl Into<String>, timeout_duration: Duration) -> Self {
        Self {
            stream: BufReader::new(stream),
            label: label.into(),
            timeout_duration: effective_timeout(timeout_duration),
            response_deadline: None,
            line: Vec::with_capacity(256),
        }
    }

    /// Peer description used in log lines
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Send a raw command buffer in one write. No retry on failure.
    pub async fn send_command(&mut self, command: &[u8]) -> Result<()> {
        let start = Instant::now();
        let writer = self.stream.get_mut();

        let write = async {
            writer.write_all(command).await?;
            writer.flush().await
        };

        match timeout(self.timeout_duration, write).await {
            Ok(Ok(())) => {
                trace!(endpoint = %self.label, bytes = command.len(), "command sent");
                self.response_deadline = Some(Instant::now() + self.timeout_duration);
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(endpoint = %self.label, error = %e, "write failed");
                Err(Error::transport(e))
            }
            Err(_) => Err(Error::timeout("write", start.elapsed())),
        }
    }

    /// Read one line, stripping the trailing `\n` and an optional `\r`.
    ///
    /// The read ends at the response deadline when a command has been sent,
    /// and after one timeout otherwise.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let start = Instant::now();
        let deadline = match self.response_deadline {
            Some(deadline) => deadline.min(start + self.timeout_duration),
            None => start + self.timeout_duration,
        };
        self.line.clear();

        // room for the CRLF terminator
        let limit = (MAX_LINE_LEN + 2) as u64;
        let mut limited = (&mut self.stream).take(limit);
        let read = limited.read_until(b'\n', &mut self.line);

        let n = match timeout_at(deadline, read).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                warn!(endpoint = %self.label, error = %e, "read failed");
                return Err(Error::transport(e));
            }
            Err(_) => {
                warn!(endpoint = %self.label, "read timed out");
                return Err(Error::timeout("read", start.elapsed()));
            }
        };

        if n == 0 {
            trace!(endpoint = %self.label, "peer closed connection");
            return Ok(None);
        }

        if !self.line.ends_with(b"\n") && self.line.len() as u64 == limit {
            warn!(endpoint = %self.label, limit = MAX_LINE_LEN, "response line too long");
            return Err(Error::transport(format!(
                "response line exceeds {} bytes",
                MAX_LINE_LEN
            )));
        }

        let mut end = self.line.len();
        if self.line[..end].ends_with(b"\n") {
            end -= 1;
        }
        if self.line[..end].ends_with(b"\r") {
            end -= 1;
        }

        Ok(Some(String::from_utf8_lossy(&self.line[..end]).into_owned()))
    }

    /// Close the connection without draining unread data.
    pub fn close(self) {
        trace!(endpoint = %self.label, "closing session");
    }
}

#[async_trait]
impl<S> LineSource for Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn next_line(&mut self) -> Result<Option<String>> {
        self.read_line().await
    }
}
