//! Record processing for `STATS CSV` snapshots.
//!
//! This module turns raw response lines into graded, named statistics.
//!
//! ## Submodules
//!
//! - [`record`]: Parsing of data lines into [`StatisticRecord`](ngstat_types::StatisticRecord)s
//! - [`filter`]: Per-column allow-lists ([`FilterSet`])
//! - [`classify`]: Health grading of `dropped` and `queued` counters ([`Thresholds`])
//! - [`format`]: Service name templates ([`ServiceTemplate`])
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "5s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! "dst.riemann;d_riemann#1;...;a;queued;404"
//!        │
//!        ▼
//! parse_record()  ──▶ StatisticRecord
//!        │
//!        ▼
//! FilterSet::accepts()  (dropped if any allow-list rejects it)
//!        │
//!        ├──▶ Thresholds::classify()   ──▶ HealthState::Warning
//!        │
//!        └──▶ ServiceTemplate::render() ──▶ "dst.riemann;d_riemann#1;...;a;queued"
//! ```

pub mod classify;
pub mod duration;
pub mod filter;
pub mod format;
pub mod record;

pub use classify::Thresholds;
pub use filter::{Filter, FilterSet};
pub use format::{FormatError, ServiceTemplate, DEFAULT_TEMPLATE};
pub use record::parse_record;
