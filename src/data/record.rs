//! Record parsing for `STATS CSV` data lines.

use ngstat_types::StatisticRecord;

use crate::error::StatsError;

/// Column separator of the `STATS CSV` format.
pub const SEPARATOR: char = ';';

/// Number of columns in a data line.
pub const COLUMNS: usize = 6;

/// Parse one data line into a [`StatisticRecord`].
///
/// The line must hold exactly six `;`-separated columns, the last of which
/// is a floating point number. Columns are not trimmed and may be empty.
pub fn parse_record(line: &str) -> Result<StatisticRecord, StatsError> {
    let columns: Vec<&str> = line.split(SEPARATOR).collect();

    let &[source_name, source_id, source_instance, state, kind, metric] = columns.as_slice() else {
        return Err(malformed(
            line,
            format!("expected {} fields, found {}", COLUMNS, columns.len()),
        ));
    };

    let metric: f64 = metric
        .parse()
        .map_err(|_| malformed(line, format!("metric '{}' is not a number", metric)))?;

    Ok(StatisticRecord::new(
        source_name,
        source_id,
        source_instance,
        state,
        kind,
        metric,
    ))
}

fn malformed(line: &str, reason: String) -> StatsError {
    StatsError::MalformedRecord {
        line: line.to_string(),
        reason,
    }
}
