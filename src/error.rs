//! Error types for the statistics pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::data::format::FormatError;

/// Errors that can occur while polling the control socket.
///
/// Every variant aborts the current tick. Whether the connection survives
/// is reported by [`StatsError::breaks_connection`].
#[derive(Debug, Error)]
pub enum StatsError {
    /// Cannot establish the connection, or it has been lost.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Response stream ended before the terminator line.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// No response line arrived within the configured read timeout.
    #[error("Read timed out after {0:?}")]
    Timeout(Duration),

    /// A data line does not parse into a statistic record.
    #[error("Malformed record '{line}': {reason}")]
    MalformedRecord { line: String, reason: String },

    /// Service name template is invalid.
    #[error("Invalid service format: {0}")]
    Format(#[from] FormatError),

    /// Reporting sink rejected an event.
    #[error("Output failed: {0}")]
    Output(String),
}

impl StatsError {
    /// Returns true if the connection must be discarded after this error.
    pub fn breaks_connection(&self) -> bool {
        matches!(
            self,
            StatsError::Connection(_) | StatsError::Protocol(_) | StatsError::Timeout(_)
        )
    }
}
