//! # ngstat
//!
//! A polling agent that reads syslog-ng's internal statistics from its
//! control socket, grades them, and forwards each one as a monitoring event.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              Agent                               │
//! │  ┌─────────┐    ┌───────────┐    ┌──────────┐    ┌────────────┐  │
//! │  │ source  │───▶│   poll    │───▶│   data   │───▶│   output   │  │
//! │  │ (socket)│    │  (cycle)  │    │(records) │    │  (events)  │  │
//! │  └─────────┘    └───────────┘    └──────────┘    └────────────┘  │
//! │       ▲                                                          │
//! │       └── ControlSocket ◀── Connector (path, read timeout)       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The control socket transport - sends `STATS CSV` and
//!   yields the response lines up to the `.` terminator
//! - **[`data`]**: Record parsing, per-column allow-lists, health grading and
//!   service name templates
//! - **[`poll`]**: One polling round ([`PollCycle`]) turning a snapshot into events
//! - **[`output`]**: Where events go - stdout, a file, TCP or a channel
//! - **[`agent`]**: Connection ownership, reconnects, and the tick schedule
//! - **[`config`]**: Layered settings from defaults, file, environment and flags
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll the default socket every 5 seconds, print events as JSON lines
//! ngstat
//!
//! # Only queue and drop counters of the riemann destination, sent over TCP
//! ngstat --source-name dst.riemann --type queued --type dropped \
//!        --output tcp:collector.example.com:5555
//!
//! # One poll, then exit
//! ngstat --once
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use ngstat::{Agent, Connector, Output, PollCycle};
//!
//! # tokio_test::block_on(async {
//! let (output, mut rx) = Output::channel(64);
//! let connector = Connector::new("/var/lib/syslog-ng/syslog-ng.ctl", None);
//! let mut agent = Agent::new(connector, PollCycle::default(), output);
//!
//! agent.tick().await?;
//! while let Ok(event) = rx.try_recv() {
//!     println!("{} {} {}", event.service, event.metric, event.state);
//! }
//! # Ok::<(), ngstat::StatsError>(())
//! # });
//! ```

pub mod agent;
pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod poll;
pub mod source;

// Re-export main types for convenience
pub use agent::Agent;
pub use config::Settings;
pub use data::{Filter, FilterSet, FormatError, ServiceTemplate, Thresholds};
pub use error::StatsError;
pub use output::Output;
pub use poll::{EventAttributes, PollCycle};
pub use source::{Connector, ControlSocket, ResponseLines};

pub use ngstat_types::{Event, HealthState, StatField, StatisticRecord};
