pub mod delimited;
pub mod xlsx;

use anyhow::Result;
use saldo_core::Dataset;
use std::path::Path;

use crate::types::Delimiter;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Whether `path` names a spreadsheet workbook rather than a text export.
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read an upload by extension. `delimiter` only applies to text exports.
pub fn read_table_path(path: impl AsRef<Path>, delimiter: Delimiter) -> Result<Dataset> {
    let path = path.as_ref();
    if is_workbook(path) {
        xlsx::read_workbook_path(path)
    } else {
        delimited::read_delimited_path(path, delimiter)
    }
}
