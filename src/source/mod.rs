//! Control socket transport.
//!
//! This module talks to the daemon: it opens the local control socket,
//! sends a command line and hands back the response as a lazy sequence of
//! lines.
//!
//! # Example
//!
//! ```no_run
//! use ngstat::source::Connector;
//!
//! # tokio_test::block_on(async {
//! let connector = Connector::new("/var/lib/syslog-ng/syslog-ng.ctl", None);
//! let mut socket = connector.connect().await?;
//!
//! let mut lines = socket.request_stats().await?;
//! while let Some(line) = lines.next_line().await {
//!     println!("{}", line?);
//! }
//! # Ok::<(), ngstat::StatsError>(())
//! # });
//! ```

mod control;

pub use control::{
    ControlSocket, Connector, ResponseLines, DEFAULT_SOCKET_PATH, STATS_COMMAND, TERMINATOR,
};
