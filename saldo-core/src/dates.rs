//! Day-first date parsing for optional date columns.

use chrono::NaiveDate;
use tracing::debug;

use crate::dataset::{Cell, Dataset};

/// Suffix of the derived column holding the parsed date.
pub const PARSED_SUFFIX: &str = "_parsed";

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y", "%Y-%m-%d", "%d/%m/%y"];

/// Parse `dd/mm/yyyy` style text (day first). A trailing time is ignored.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn cell_to_date(cell: &Cell) -> Cell {
    match cell {
        Cell::Date(d) => Cell::Date(*d),
        Cell::Text(s) => parse_day_first(s).map(Cell::Date).unwrap_or(Cell::Empty),
        _ => Cell::Empty,
    }
}

/// For each listed column that exists, add `<column>_parsed` with the date.
///
/// Absent columns are skipped; unparseable values become `Empty`.
pub fn parse_date_columns<S: AsRef<str>>(mut dataset: Dataset, columns: &[S]) -> Dataset {
    for column in columns {
        let Some(src) = dataset.column_index(column.as_ref()) else {
            continue;
        };
        let target = format!("{}{}", column.as_ref().trim(), PARSED_SUFFIX);
        let mut missed = 0usize;
        dataset.derive_column(&target, |row| {
            let parsed = cell_to_date(row.cell(src));
            if parsed == Cell::Empty && !row.cell(src).is_blank() {
                missed += 1;
            }
            parsed
        });
        debug!(column = %target, unparseable = missed, "parsed date column");
    }
    dataset
}
