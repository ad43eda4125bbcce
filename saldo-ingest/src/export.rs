//! Write a cleaned dataset back out as delimited text.

use anyhow::{Context, Result};
use saldo_core::Dataset;
use std::io::Write;
use std::path::Path;

/// Numbers are written with `.` as the decimal mark, dates as ISO.
pub fn write_table<W: Write>(dataset: &Dataset, writer: W, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    wtr.write_record(dataset.columns())?;
    for row in dataset.rows() {
        wtr.write_record(row.cells().iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_table_path(dataset: &Dataset, path: impl AsRef<Path>, delimiter: u8) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_table(dataset, file, delimiter).with_context(|| format!("writing {}", path.display()))
}
