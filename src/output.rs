//! Output backends for emitting events.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ngstat_types::Event;
use tokio::io::AsyncWriteExt;

use crate::error::StatsError;

/// Destination for emitted events.
///
/// Every backend writes one JSON object per event, in the order given.
#[derive(Debug)]
pub enum Output {
    /// Write events to standard output.
    Stdout,

    /// Append events to a file.
    File(PathBuf),

    /// Send events to a TCP server.
    ///
    /// One connection is made per batch; events are newline-delimited JSON.
    Tcp(String),

    /// Send events through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(tokio::sync::mpsc::Sender<Event>),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ngstat::Output;
    ///
    /// let output = Output::file("events.jsonl");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a TCP output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ngstat::Output;
    ///
    /// let output = Output::tcp("localhost:5555");
    /// ```
    pub fn tcp(addr: impl Into<String>) -> Self {
        Output::Tcp(addr.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// This is useful for embedding the agent and handling events yourself.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ngstat::Output;
    ///
    /// let (output, mut rx) = Output::channel(64);
    ///
    /// // Later, receive events
    /// // while let Some(event) = rx.recv().await {
    /// //     println!("{} = {}", event.service, event.metric);
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, tokio::sync::mpsc::Receiver<Event>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Emit a batch of events to this output.
    pub async fn emit(&self, events: &[Event]) -> Result<(), StatsError> {
        if events.is_empty() {
            return Ok(());
        }

        match self {
            Output::Stdout => {
                let mut stdout = tokio::io::stdout();
                stdout
                    .write_all(&encode(events)?)
                    .await
                    .map_err(|e| self.failed(e))?;
                stdout.flush().await.map_err(|e| self.failed(e))?;
            }
            Output::File(path) => {
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .map_err(|e| self.failed(e))?;
                file.write_all(&encode(events)?)
                    .await
                    .map_err(|e| self.failed(e))?;
                file.flush().await.map_err(|e| self.failed(e))?;
            }
            Output::Tcp(addr) => {
                use tokio::net::TcpStream;

                let mut stream = TcpStream::connect(addr).await.map_err(|e| self.failed(e))?;
                stream
                    .write_all(&encode(events)?)
                    .await
                    .map_err(|e| self.failed(e))?;
                stream.shutdown().await.map_err(|e| self.failed(e))?;
            }
            Output::Channel(tx) => {
                for event in events {
                    tx.send(event.clone())
                        .await
                        .map_err(|_| StatsError::Output("event receiver dropped".to_string()))?;
                }
            }
        }
        Ok(())
    }

    fn failed(&self, err: std::io::Error) -> StatsError {
        StatsError::Output(format!("{}: {}", self, err))
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("stdout"),
            Output::File(path) => write!(f, "file:{}", path.display()),
            Output::Tcp(addr) => write!(f, "tcp:{}", addr),
            Output::Channel(_) => f.write_str("channel"),
        }
    }
}

impl FromStr for Output {
    type Err = String;

    /// Parse `stdout`, `file:PATH` or `tcp:HOST:PORT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "stdout" || s == "-" {
            return Ok(Output::Stdout);
        }
        if let Some(path) = s.strip_prefix("file:") {
            if path.is_empty() {
                return Err("file output needs a path".to_string());
            }
            return Ok(Output::file(path));
        }
        if let Some(addr) = s.strip_prefix("tcp:") {
            if !addr.contains(':') {
                return Err(format!("tcp output needs HOST:PORT, got '{}'", addr));
            }
            return Ok(Output::tcp(addr));
        }
        Err(format!(
            "unknown output '{}' (expected stdout, file:PATH or tcp:HOST:PORT)",
            s
        ))
    }
}

/// Newline-delimited JSON for a batch of events.
fn encode(events: &[Event]) -> Result<Vec<u8>, StatsError> {
    let mut buf = Vec::new();
    for event in events {
        serde_json::to_writer(&mut buf, event)
            .map_err(|e| StatsError::Output(format!("cannot encode event: {}", e)))?;
        buf.push(b'\n');
    }
    Ok(buf)
}
