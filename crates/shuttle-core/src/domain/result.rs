//! Result model: the parsed output of the external executor.
//!
//! The executor writes a tab-delimited table with four columns. Lines starting
//! with `#` are comments. The persisted result maps the row index (counting
//! only data rows) to the four column values.

use std::collections::BTreeMap;

/// Number of columns kept per row.
pub const RESULT_COLUMNS: usize = 4;

/// Marker that starts a comment line in executor output.
pub const COMMENT_MARKER: char = '#';

/// One row of the result table. Missing trailing columns are `None`.
pub type ResultRow = [Option<String>; RESULT_COLUMNS];

/// Row index -> row. Serialized as a JSON object keyed by the index.
pub type ResultRows = BTreeMap<usize, ResultRow>;

/// Parses executor output into result rows.
///
/// Blank lines and comment lines are skipped; columns past the fourth are
/// dropped.
pub fn parse_table(output: &str) -> ResultRows {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.starts_with(COMMENT_MARKER))
        .map(parse_row)
        .enumerate()
        .collect()
}

fn parse_row(line: &str) -> ResultRow {
    let mut row: ResultRow = Default::default();
    for (slot, column) in row.iter_mut().zip(line.split('\t')) {
        *slot = Some(column.to_string());
    }
    row
}
