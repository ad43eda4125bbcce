//! Excel / OpenDocument workbooks into a Dataset.
//!
//! The first worksheet is read and its first row is the header. String
//! cells stay text; numeric cells arrive as numbers and date-formatted cells
//! as dates, so a value the workbook already stores as 1500.5 never goes
//! through the separator heuristics.

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, TimeDelta};
use saldo_core::{Cell, Dataset};
use std::path::Path;
use tracing::debug;

/// Day zero of the 1900 date system, as used by Excel and LibreOffice.
fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Calendar date of a serial day number; the time of day is dropped.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = TimeDelta::try_days(serial.floor() as i64)?;
    serial_epoch()?.checked_add_signed(days)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_raw(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => serial_to_date(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Empty),
    }
}

/// Header text of column `index`; blank headers are named like pandas does.
fn header_name(data: &Data, index: usize) -> String {
    let name = data.to_string();
    if name.trim().is_empty() {
        format!("Unnamed: {index}")
    } else {
        name
    }
}

pub fn read_workbook_path(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening {}", path.display()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("{} has no worksheets", path.display()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("reading sheet '{sheet}' of {}", path.display()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| anyhow!("sheet '{sheet}' of {} is empty", path.display()))?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, d)| header_name(d, i))
        .collect();
    let mut dataset = Dataset::new(&headers)
        .with_context(|| format!("invalid header row in {}", path.display()))?;

    let mut skipped_blank = 0usize;
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(to_cell).collect();
        if cells.iter().all(Cell::is_blank) {
            skipped_blank += 1;
            continue;
        }
        dataset.push_row(cells)?;
    }

    debug!(sheet = %sheet, rows = dataset.len(), skipped_blank, "parsed workbook");
    Ok(dataset)
}
