//! Statistic records - one row of the daemon's counter snapshot.

use std::fmt;
use std::str::FromStr;

/// One row of a `STATS CSV` snapshot.
///
/// Records are immutable once parsed and live for a single poll cycle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatisticRecord {
    /// Component kind, e.g. `source`, `dst.riemann`, `global`.
    pub source_name: String,

    /// Component identifier, e.g. `s_sys#0`.
    pub source_id: String,

    /// Component instance; frequently empty.
    pub source_instance: String,

    /// Free-form state tag reported by the daemon (`a`, `d`, `o`, ...).
    ///
    /// This is not a health state.
    pub state: String,

    /// Counter type, e.g. `processed`, `dropped`, `queued`.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,

    /// Counter value.
    pub metric: f64,
}

impl StatisticRecord {
    /// Create a record from its six columns.
    pub fn new(
        source_name: impl Into<String>,
        source_id: impl Into<String>,
        source_instance: impl Into<String>,
        state: impl Into<String>,
        kind: impl Into<String>,
        metric: f64,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            source_id: source_id.into(),
            source_instance: source_instance.into(),
            state: state.into(),
            kind: kind.into(),
            metric,
        }
    }

    /// Value of one of the textual columns.
    pub fn field(&self, field: StatField) -> &str {
        match field {
            StatField::SourceName => &self.source_name,
            StatField::SourceId => &self.source_id,
            StatField::SourceInstance => &self.source_instance,
            StatField::State => &self.state,
            StatField::Type => &self.kind,
        }
    }
}

/// The textual columns of a [`StatisticRecord`].
///
/// These are the columns that can be filtered on and substituted into a
/// service name template. The metric column is neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatField {
    SourceName,
    SourceId,
    SourceInstance,
    State,
    Type,
}

impl StatField {
    /// All textual columns, in wire order.
    pub const ALL: [StatField; 5] = [
        StatField::SourceName,
        StatField::SourceId,
        StatField::SourceInstance,
        StatField::State,
        StatField::Type,
    ];

    /// Name used in configuration keys and templates.
    pub fn name(&self) -> &'static str {
        match self {
            StatField::SourceName => "source_name",
            StatField::SourceId => "source_id",
            StatField::SourceInstance => "source_instance",
            StatField::State => "state",
            StatField::Type => "type",
        }
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name a [`StatField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field '{}'", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for StatField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}
