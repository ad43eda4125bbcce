//! In-memory table: an ordered sequence of records sharing one schema.
//!
//! Every pipeline stage takes a `Dataset` by value and hands back the
//! transformed one, so a stage owns the table exclusively while it works.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, SaldoError};

/// One field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Wrap a raw text field; the empty string becomes `Empty`.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// True for `Empty` and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Stringified, trimmed form used for lookups, filters and grouping.
    ///
    /// Integral numbers print without a fractional part, so a code read as
    /// `42.0` still matches the key `"42"`.
    pub fn key(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Cell {
    fn from(raw: &str) -> Self {
        Cell::from_raw(raw)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
        }
    }
}

/// One row of the table. Cells are positional, matching `Dataset::columns`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    cells: Vec<Cell>,
}

impl Record {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    /// Create an empty dataset. Column names are trimmed and must be unique.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for c in columns {
            let name = c.as_ref().trim().to_string();
            if !seen.insert(name.clone()) {
                return Err(SaldoError::DuplicateColumn(name));
            }
            names.push(name);
        }
        Ok(Self {
            columns: names,
            rows: Vec::new(),
        })
    }

    /// Build a dataset of raw text rows, as an upload would arrive.
    pub fn from_text_rows<I, S>(columns: I, rows: &[Vec<&str>]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ds = Self::new(columns)?;
        for row in rows {
            ds.push_row(row.iter().map(|s| Cell::from_raw(s)).collect())?;
        }
        Ok(ds)
    }

    pub fn push_row(&mut self, cells: Vec<Cell>) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(SaldoError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(Record::new(cells));
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Index of a column that must exist.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| SaldoError::MissingColumn(name.trim().to_string()))
    }

    /// Index of `name`, appending it (filled with `Empty`) when absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.trim().to_string());
        for row in &mut self.rows {
            row.cells.push(Cell::Empty);
        }
        self.columns.len() - 1
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r.cell(idx))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Cell>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|r| r.cell(idx)).collect())
    }

    /// Rewrite every cell of column `index` in place.
    pub fn map_column<F>(&mut self, index: usize, mut f: F)
    where
        F: FnMut(&Cell) -> Cell,
    {
        for row in &mut self.rows {
            let next = f(&row.cells[index]);
            row.cells[index] = next;
        }
    }

    /// Write column `target` from a function of each whole record.
    pub fn derive_column<F>(&mut self, target: &str, mut f: F)
    where
        F: FnMut(&Record) -> Cell,
    {
        let idx = self.ensure_column(target);
        for row in &mut self.rows {
            let value = f(row);
            row.cells[idx] = value;
        }
    }

    /// Keep only rows matching `keep`. Schema is unchanged.
    pub fn retain<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        self.rows.retain(|r| keep(r));
        self
    }

    /// Reorder columns. `order` must be a permutation of the current schema.
    pub fn reorder_columns<S: AsRef<str>>(self, order: &[S]) -> Result<Self> {
        let mut indices = Vec::with_capacity(order.len());
        for name in order {
            indices.push(self.require_column(name.as_ref())?);
        }
        let unique: HashSet<_> = indices.iter().collect();
        if indices.len() != self.columns.len() || unique.len() != indices.len() {
            return Err(SaldoError::InvalidConfig(
                "column order must list every column exactly once".to_string(),
            ));
        }

        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|mut r| {
                let cells = indices
                    .iter()
                    .map(|&i| std::mem::take(&mut r.cells[i]))
                    .collect();
                Record::new(cells)
            })
            .collect();
        Ok(Self { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_text_rows(
            [" code ", "amt"],
            &[vec!["MA", "1.500,00"], vec!["42", ""]],
        )
        .unwrap()
    }

    #[test]
    fn test_headers_are_trimmed() {
        let ds = sample();
        assert_eq!(ds.columns(), &["code".to_string(), "amt".to_string()]);
        assert!(ds.has_column("code "));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Dataset::new(["a", " a"]).unwrap_err();
        assert_eq!(err, SaldoError::DuplicateColumn("a".to_string()));
    }

    #[test]
    fn test_row_width_checked() {
        let mut ds = Dataset::new(["a", "b"]).unwrap();
        let err = ds.push_row(vec![Cell::Empty]).unwrap_err();
        assert!(matches!(err, SaldoError::RowWidth { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_empty_text_becomes_empty_cell() {
        let ds = sample();
        assert_eq!(ds.get(1, "amt"), Some(&Cell::Empty));
    }

    #[test]
    fn test_key_stringifies_integral_numbers() {
        assert_eq!(Cell::Number(42.0).key(), "42");
        assert_eq!(Cell::Number(-200.5).key(), "-200.5");
        assert_eq!(Cell::Text("  MA ".into()).key(), "MA");
        assert_eq!(Cell::Empty.key(), "");
    }

    #[test]
    fn test_ensure_column_appends_empty() {
        let mut ds = sample();
        let idx = ds.ensure_column("Category");
        assert_eq!(idx, 2);
        assert_eq!(ds.get(0, "Category"), Some(&Cell::Empty));
        assert_eq!(ds.ensure_column("Category"), 2);
    }

    #[test]
    fn test_reorder_columns() {
        let ds = sample().reorder_columns(&["amt", "code"]).unwrap();
        assert_eq!(ds.columns()[0], "amt");
        assert_eq!(ds.get(0, "code"), Some(&Cell::Text("MA".into())));
        assert_eq!(ds.rows()[0].cell(0), &Cell::Text("1.500,00".into()));
    }

    #[test]
    fn test_reorder_requires_permutation() {
        assert!(sample().reorder_columns(&["amt"]).is_err());
        assert!(sample().reorder_columns(&["amt", "amt"]).is_err());
    }

    #[test]
    fn test_cell_serializes_to_json() {
        let cells = vec![
            Cell::Empty,
            Cell::Number(1.5),
            Cell::Text("x".into()),
            Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,1.5,"x","2024-03-01"]"#);
    }
}
