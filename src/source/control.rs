//! Control socket connection.
//!
//! Speaks the syslog-ng control protocol over a persistent stream: one
//! command line out, a header line, data lines, and a terminating `.` line
//! back.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::{debug, info};

use crate::error::StatsError;

/// Command that requests the statistics snapshot.
pub const STATS_COMMAND: &str = "STATS CSV";

/// Line that terminates a response.
pub const TERMINATOR: &str = ".";

/// Default location of the syslog-ng control socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/lib/syslog-ng/syslog-ng.ctl";

/// A persistent connection to a control socket.
///
/// Generic over the underlying stream so that tests can script a
/// conversation; production code uses a [`UnixStream`].
///
/// Once a read or write fails the connection is broken and every further
/// operation fails without touching the stream.
#[derive(Debug)]
pub struct ControlSocket<S = UnixStream> {
    stream: BufReader<S>,
    description: String,
    read_timeout: Option<Duration>,
    broken: bool,
    /// A response has been requested but not read to its terminator.
    awaiting_response: bool,
}

impl ControlSocket<UnixStream> {
    /// Connect to the control socket at `path`.
    pub async fn open(path: &Path, read_timeout: Option<Duration>) -> Result<Self, StatsError> {
        let stream = UnixStream::connect(path).await.map_err(|e| {
            StatsError::Connection(format!("cannot connect to {}: {}", path.display(), e))
        })?;
        info!("Connected to control socket {}", path.display());
        Ok(Self::from_stream(stream, &path.display().to_string(), read_timeout))
    }
}

impl<S> ControlSocket<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already connected stream.
    pub fn from_stream(stream: S, description: &str, read_timeout: Option<Duration>) -> Self {
        Self {
            stream: BufReader::new(stream),
            description: description.to_string(),
            read_timeout,
            broken: false,
            awaiting_response: false,
        }
    }

    /// Human-readable name of the endpoint.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns true if an earlier failure made the connection unusable.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Write one command line.
    pub async fn send_command(&mut self, command: &str) -> Result<(), StatsError> {
        self.ensure_usable()?;

        if self.awaiting_response {
            self.broken = true;
            return Err(StatsError::Connection(format!(
                "{}: previous response was not fully read",
                self.description
            )));
        }

        let line = format!("{}\n", command);
        let stream = self.stream.get_mut();
        let result = match stream.write_all(line.as_bytes()).await {
            Ok(()) => stream.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            self.broken = true;
            return Err(StatsError::Connection(format!(
                "write to {} failed: {}",
                self.description, e
            )));
        }

        debug!(command, "Sent command to {}", self.description);
        self.awaiting_response = true;
        Ok(())
    }

    /// Lazily read the response to the last command.
    ///
    /// The header line is discarded on the first call to
    /// [`ResponseLines::next_line`].
    pub fn read_lines(&mut self) -> ResponseLines<'_, S> {
        ResponseLines {
            socket: self,
            header_read: false,
            finished: false,
        }
    }

    /// Send `STATS CSV` and return its response lines.
    pub async fn request_stats(&mut self) -> Result<ResponseLines<'_, S>, StatsError> {
        self.send_command(STATS_COMMAND).await?;
        Ok(self.read_lines())
    }

    fn ensure_usable(&self) -> Result<(), StatsError> {
        if self.broken {
            Err(StatsError::Connection(format!(
                "connection to {} is broken",
                self.description
            )))
        } else {
            Ok(())
        }
    }

    /// Read one raw line without its terminator, `None` at end of stream.
    async fn read_raw_line(&mut self) -> Result<Option<String>, StatsError> {
        self.ensure_usable()?;

        let mut line = String::new();
        let read = match self.read_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.stream.read_line(&mut line)).await {
                    Ok(result) => result,
                    Err(_) => {
                        self.broken = true;
                        return Err(StatsError::Timeout(limit));
                    }
                }
            }
            None => self.stream.read_line(&mut line).await,
        };

        match read {
            Ok(0) => {
                self.broken = true;
                Ok(None)
            }
            Ok(_) => {
                chomp(&mut line);
                Ok(Some(line))
            }
            Err(e) => {
                self.broken = true;
                Err(StatsError::Connection(format!(
                    "read from {} failed: {}",
                    self.description, e
                )))
            }
        }
    }
}

/// Lazy sequence of response lines.
///
/// Stateful within one response: the header is skipped once, data lines are
/// yielded in order, and the terminator ends the sequence without being
/// yielded. End of stream before the terminator is a protocol error.
#[derive(Debug)]
pub struct ResponseLines<'a, S = UnixStream> {
    socket: &'a mut ControlSocket<S>,
    header_read: bool,
    finished: bool,
}

impl<S> ResponseLines<'_, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Next data line, or `None` once the terminator has been read.
    pub async fn next_line(&mut self) -> Option<Result<String, StatsError>> {
        if self.finished {
            return None;
        }

        if !self.header_read {
            match self.socket.read_raw_line().await {
                Ok(Some(_header)) => self.header_read = true,
                Ok(None) => return Some(Err(self.closed("before the header line"))),
                Err(e) => return Some(Err(self.fail(e))),
            }
        }

        match self.socket.read_raw_line().await {
            Ok(Some(line)) if line == TERMINATOR => {
                self.finished = true;
                self.socket.awaiting_response = false;
                None
            }
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => Some(Err(self.closed("before the terminator line"))),
            Err(e) => Some(Err(self.fail(e))),
        }
    }

    /// Read and discard the rest of the response.
    ///
    /// Leaves the connection ready for the next command.
    pub async fn drain(&mut self) -> Result<usize, StatsError> {
        let mut discarded = 0;
        while let Some(line) = self.next_line().await {
            line?;
            discarded += 1;
        }
        Ok(discarded)
    }

    /// Collect all remaining data lines.
    pub async fn collect(mut self) -> Result<Vec<String>, StatsError> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await {
            lines.push(line?);
        }
        Ok(lines)
    }

    /// Returns true once the terminator has been read.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn closed(&mut self, when: &str) -> StatsError {
        self.finished = true;
        StatsError::Protocol(format!(
            "{} closed the connection {}",
            self.socket.description, when
        ))
    }

    fn fail(&mut self, err: StatsError) -> StatsError {
        self.finished = true;
        err
    }
}

fn chomp(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

/// Opens control socket connections with fixed settings.
#[derive(Debug, Clone)]
pub struct Connector {
    path: PathBuf,
    read_timeout: Option<Duration>,
}

impl Connector {
    pub fn new(path: impl Into<PathBuf>, read_timeout: Option<Duration>) -> Self {
        Self {
            path: path.into(),
            read_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub async fn connect(&self) -> Result<ControlSocket, StatsError> {
        ControlSocket::open(&self.path, self.read_timeout).await
    }
}

impl Default for Connector {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_PATH, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    const HEADER: &[u8] = b"SourceName;SourceId;SourceInstance;State;Type;Number\n";

    #[tokio::test]
    async fn test_reads_until_terminator() {
        let mock = Builder::new()
            .write(b"STATS CSV\n")
            .read(HEADER)
            .read(b"destination;d_mail;;a;processed;531\nglobal;internal_source;;a;dropped;0\n.\n")
            .build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        let lines = socket.request_stats().await.unwrap().collect().await.unwrap();
        assert_eq!(
            lines,
            vec![
                "destination;d_mail;;a;processed;531",
                "global;internal_source;;a;dropped;0"
            ]
        );
        assert!(!socket.is_broken());
    }

    #[tokio::test]
    async fn test_empty_response() {
        let mock = Builder::new().write(b"STATS CSV\n").read(HEADER).read(b".\n").build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        let mut lines = socket.request_stats().await.unwrap();
        assert!(lines.next_line().await.is_none());
        assert!(lines.is_finished());
        assert!(lines.next_line().await.is_none());
    }

    #[tokio::test]
    async fn test_header_is_discarded_even_if_it_looks_like_data() {
        let mock = Builder::new()
            .write(b"STATS CSV\n")
            .read(b"a;b;c;d;e;1\nx;y;z;a;queued;2\n.\n")
            .build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        let lines = socket.request_stats().await.unwrap().collect().await.unwrap();
        assert_eq!(lines, vec!["x;y;z;a;queued;2"]);
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let mock = Builder::new()
            .write(b"STATS CSV\n")
            .read(b"header\r\nsource;s_sys;;a;processed;1\r\n.\r\n")
            .build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        let lines = socket.request_stats().await.unwrap().collect().await.unwrap();
        assert_eq!(lines, vec!["source;s_sys;;a;processed;1"]);
    }

    #[tokio::test]
    async fn test_eof_before_terminator_is_protocol_error() {
        let mock = Builder::new()
            .write(b"STATS CSV\n")
            .read(HEADER)
            .read(b"source;s_sys;;a;processed;1\n")
            .build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        let mut lines = socket.request_stats().await.unwrap();
        assert_eq!(
            lines.next_line().await.unwrap().unwrap(),
            "source;s_sys;;a;processed;1"
        );
        let err = lines.next_line().await.unwrap().unwrap_err();
        assert!(matches!(err, StatsError::Protocol(_)), "{err}");
        assert!(lines.next_line().await.is_none());
        assert!(socket.is_broken());
    }

    #[tokio::test]
    async fn test_eof_before_header_is_protocol_error() {
        let mock = Builder::new().write(b"STATS CSV\n").build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        let err = socket.request_stats().await.unwrap().collect().await.unwrap_err();
        assert!(matches!(err, StatsError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_broken_connection_fails_fast() {
        let mock = Builder::new().write(b"STATS CSV\n").read(HEADER).build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        assert!(socket.request_stats().await.unwrap().collect().await.is_err());
        assert!(socket.is_broken());

        // Nothing else is scripted: touching the stream would fail the mock.
        let err = socket.send_command(STATS_COMMAND).await.unwrap_err();
        assert!(matches!(err, StatsError::Connection(_)));
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn test_read_error_breaks_connection() {
        let mock = Builder::new()
            .write(b"STATS CSV\n")
            .read_error(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        let err = socket.request_stats().await.unwrap().collect().await.unwrap_err();
        assert!(matches!(err, StatsError::Connection(_)));
        assert!(socket.is_broken());
    }

    #[tokio::test]
    async fn test_write_error_breaks_connection() {
        let mock = Builder::new()
            .write_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe"))
            .build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        let err = socket.send_command(STATS_COMMAND).await.unwrap_err();
        assert!(matches!(err, StatsError::Connection(_)));
        assert!(socket.is_broken());
    }

    #[tokio::test]
    async fn test_unread_response_blocks_next_command() {
        let mock = Builder::new()
            .write(b"STATS CSV\n")
            .read(HEADER)
            .read(b"source;s_sys;;a;processed;1\n.\n")
            .build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        {
            let mut lines = socket.request_stats().await.unwrap();
            assert!(lines.next_line().await.unwrap().is_ok());
        }

        let err = socket.send_command(STATS_COMMAND).await.unwrap_err();
        assert!(err.to_string().contains("not fully read"));
        assert!(socket.is_broken());
    }

    #[tokio::test]
    async fn test_drain_keeps_connection_usable() {
        let mock = Builder::new()
            .write(b"STATS CSV\n")
            .read(HEADER)
            .read(b"a;b;c;d;e;1\na;b;c;d;e;2\na;b;c;d;e;3\n.\n")
            .write(b"STATS CSV\n")
            .read(HEADER)
            .read(b"a;b;c;d;e;4\n.\n")
            .build();
        let mut socket = ControlSocket::from_stream(mock, "mock", None);

        let mut lines = socket.request_stats().await.unwrap();
        assert!(lines.next_line().await.unwrap().is_ok());
        assert_eq!(lines.drain().await.unwrap(), 2);

        let lines = socket.request_stats().await.unwrap().collect().await.unwrap();
        assert_eq!(lines, vec!["a;b;c;d;e;4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_timeout() {
        let mock = Builder::new()
            .write(b"STATS CSV\n")
            .read(HEADER)
            .wait(Duration::from_secs(60))
            .build();
        let mut socket = ControlSocket::from_stream(mock, "mock", Some(Duration::from_secs(5)));

        let err = socket.request_stats().await.unwrap().collect().await.unwrap_err();
        assert!(matches!(err, StatsError::Timeout(d) if d == Duration::from_secs(5)));
        assert!(socket.is_broken());
    }

    #[tokio::test]
    async fn test_open_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ctl");

        let err = ControlSocket::open(&path, None).await.unwrap_err();
        assert!(matches!(err, StatsError::Connection(_)));
        assert!(err.to_string().contains("missing.ctl"));
    }

    #[test]
    fn test_chomp() {
        let mut line = "abc\r\n".to_string();
        chomp(&mut line);
        assert_eq!(line, "abc");

        let mut line = "abc".to_string();
        chomp(&mut line);
        assert_eq!(line, "abc");

        let mut line = ".\n".to_string();
        chomp(&mut line);
        assert_eq!(line, TERMINATOR);
    }

    #[test]
    fn test_connector_defaults() {
        let connector = Connector::default();
        assert_eq!(connector.path(), Path::new(DEFAULT_SOCKET_PATH));
        assert_eq!(connector.read_timeout(), None);
    }
}
