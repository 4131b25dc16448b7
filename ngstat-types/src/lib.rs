//! # ngstat-types
//!
//! Core types for syslog-ng statistics monitoring. This crate defines the
//! records read from the daemon's control socket, the health states derived
//! from them, and the events handed to a reporting sink.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to serialize events
//! - **Explicit absence**: Unknown statistic types are [`HealthState::Unclassified`],
//!   never a sentinel string
//!
//! ## Example
//!
//! ```rust
//! use ngstat_types::{Event, HealthState, StatField, StatisticRecord};
//!
//! let record = StatisticRecord::new("global", "internal_source", "", "a", "dropped", 0.0);
//! assert_eq!(record.field(StatField::SourceId), "internal_source");
//!
//! let event = Event::new("global;internal_source;;a;dropped", record.metric, HealthState::Ok);
//! assert_eq!(event.state.as_str(), Some("ok"));
//! ```

mod event;
mod health;
mod record;

pub use event::*;
pub use health::*;
pub use record::*;
