//! Delimited text exports (CSV / semicolon CSV) into a text-only Dataset.
//!
//! Every field is read as text; numeric interpretation is left to the
//! pipeline. Handles the quirks of spreadsheet exports:
//! - byte order marks (UTF-8, and UTF-16 from "Unicode text" saves)
//! - Windows-1252 bytes from legacy pt-BR Excel exports
//! - fully blank trailing rows
//! - rows shorter or longer than the header

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use saldo_core::{Cell, Dataset};
use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::types::Delimiter;

/// Decode the whole buffer with one encoding.
///
/// A BOM names the encoding; otherwise UTF-8 when the bytes are valid,
/// else Windows-1252.
fn decode_export(data: &[u8]) -> (Cow<'_, str>, &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(data) {
        let (text, _) = encoding.decode_without_bom_handling(&data[bom_len..]);
        return (text, encoding);
    }
    match UTF_8.decode_without_bom_handling_and_without_replacement(data) {
        Some(text) => (text, UTF_8),
        None => (WINDOWS_1252.decode_without_bom_handling(data).0, WINDOWS_1252),
    }
}

/// Parse a whole export held in memory.
pub fn parse_table_bytes(data: &[u8], delimiter: Delimiter) -> Result<Dataset> {
    let (text, encoding) = decode_export(data);
    let first_line = text.lines().next().unwrap_or_default();
    let sep = delimiter.resolve(first_line);
    debug!(delimiter = %(sep as char), encoding = encoding.name(), "resolved input format");

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(sep)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .map(str::to_string)
        .collect();
    let mut dataset = Dataset::new(&headers).context("invalid header row")?;
    let width = headers.len();

    let mut skipped_blank = 0usize;
    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading row {}", i + 2))?;
        let mut fields: Vec<&str> = record.iter().collect();

        if fields.iter().all(|f| f.trim().is_empty()) {
            skipped_blank += 1;
            continue;
        }
        if fields.len() > width {
            if fields[width..].iter().any(|f| !f.trim().is_empty()) {
                warn!(row = i + 2, extra = fields.len() - width, "row has more fields than header; extra values ignored");
            }
            fields.truncate(width);
        }
        fields.resize(width, "");

        dataset.push_row(fields.into_iter().map(Cell::from_raw).collect())?;
    }

    debug!(rows = dataset.len(), skipped_blank, "parsed table");
    Ok(dataset)
}

pub fn read_table<R: Read>(mut reader: R, delimiter: Delimiter) -> Result<Dataset> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).context("reading table")?;
    parse_table_bytes(&data, delimiter)
}

pub fn read_delimited_path(path: impl AsRef<Path>, delimiter: Delimiter) -> Result<Dataset> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("opening {}", path.display()))?;
    parse_table_bytes(&data, delimiter).with_context(|| format!("parsing {}", path.display()))
}
