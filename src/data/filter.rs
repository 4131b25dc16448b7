//! Allow-list filtering of statistic records.

use std::collections::BTreeSet;

use ngstat_types::{StatField, StatisticRecord};

/// Inclusion filter for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    /// No constraint on the column.
    #[default]
    Unset,
    /// The column value must be one of these.
    AllowList(BTreeSet<String>),
}

impl Filter {
    /// Build a filter from configured values.
    ///
    /// Missing or empty value lists impose no constraint.
    pub fn from_values<I, T>(values: Option<I>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let allowed: BTreeSet<String> = values
            .into_iter()
            .flatten()
            .map(Into::into)
            .collect();
        if allowed.is_empty() {
            Filter::Unset
        } else {
            Filter::AllowList(allowed)
        }
    }

    /// Returns true if `value` passes this filter.
    pub fn allows(&self, value: &str) -> bool {
        match self {
            Filter::Unset => true,
            Filter::AllowList(allowed) => allowed.contains(value),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Filter::Unset)
    }
}

/// One [`Filter`] per textual column.
///
/// Built once at startup and read-only afterwards. A record is accepted
/// only if every column passes its filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    pub source_name: Filter,
    pub source_id: Filter,
    pub source_instance: Filter,
    pub state: Filter,
    pub kind: Filter,
}

impl FilterSet {
    /// A filter set that accepts every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter for one column.
    pub fn with(mut self, field: StatField, filter: Filter) -> Self {
        *self.get_mut(field) = filter;
        self
    }

    /// Filter for one column.
    pub fn get(&self, field: StatField) -> &Filter {
        match field {
            StatField::SourceName => &self.source_name,
            StatField::SourceId => &self.source_id,
            StatField::SourceInstance => &self.source_instance,
            StatField::State => &self.state,
            StatField::Type => &self.kind,
        }
    }

    fn get_mut(&mut self, field: StatField) -> &mut Filter {
        match field {
            StatField::SourceName => &mut self.source_name,
            StatField::SourceId => &mut self.source_id,
            StatField::SourceInstance => &mut self.source_instance,
            StatField::State => &mut self.state,
            StatField::Type => &mut self.kind,
        }
    }

    /// Returns true if the record passes every active filter.
    pub fn accepts(&self, record: &StatisticRecord) -> bool {
        StatField::ALL
            .into_iter()
            .all(|field| self.get(field).allows(record.field(field)))
    }

    /// Number of columns with an allow-list.
    pub fn active_count(&self) -> usize {
        StatField::ALL
            .into_iter()
            .filter(|field| !self.get(*field).is_unset())
            .count()
    }
}
