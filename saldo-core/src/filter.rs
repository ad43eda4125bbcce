//! Row selection: user filters and blank-key removal.

use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::dataset::{Cell, Dataset};
use crate::error::Result;

/// Keep rows whose `field` key is one of `allowed`.
///
/// An empty selection means "everything", like an untouched multi-select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    field: String,
    allowed: BTreeSet<String>,
}

impl RowFilter {
    pub fn new<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            field: field.into().trim().to_string(),
            allowed: values
                .into_iter()
                .map(|v| v.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_active(&self) -> bool {
        !self.allowed.is_empty()
    }

    pub fn matches(&self, cell: &Cell) -> bool {
        !self.is_active() || self.allowed.contains(&cell.key())
    }
}

/// Apply every active filter (logical AND). Fails on a missing field.
pub fn filter_rows(dataset: Dataset, filters: &[RowFilter]) -> Result<Dataset> {
    let active = filters
        .iter()
        .filter(|f| f.is_active())
        .map(|f| dataset.require_column(f.field()).map(|idx| (idx, f)))
        .collect::<Result<Vec<_>>>()?;

    if active.is_empty() {
        return Ok(dataset);
    }

    let before = dataset.len();
    let kept = dataset.retain(|row| active.iter().all(|(idx, f)| f.matches(row.cell(*idx))));
    debug!(before, after = kept.len(), filters = active.len(), "applied row filters");
    Ok(kept)
}

/// Drop rows whose `field` is blank. Returns the dataset and the number dropped.
pub fn drop_blank_keys(dataset: Dataset, field: &str) -> Result<(Dataset, usize)> {
    let idx = dataset.require_column(field)?;
    let before = dataset.len();
    let kept = dataset.retain(|row| !row.cell(idx).is_blank());
    let dropped = before - kept.len();
    if dropped > 0 {
        info!(field, before, after = kept.len(), "dropped rows with blank key");
    }
    Ok((kept, dropped))
}

/// Sorted distinct non-blank keys of a column: the choices a filter offers.
pub fn distinct_values(dataset: &Dataset, field: &str) -> Result<Vec<String>> {
    let values: BTreeSet<String> = dataset
        .column(field)?
        .into_iter()
        .filter(|c| !c.is_blank())
        .map(Cell::key)
        .collect();
    Ok(values.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaldoError;

    fn ds() -> Dataset {
        Dataset::from_text_rows(
            ["Reference", "Customer", "Category"],
            &[
                vec!["R1", "ACME", "peças"],
                vec!["", "ACME", "Frota"],
                vec!["  ", "Beta", "peças"],
                vec!["R4", "Beta ", "Unknown"],
                vec!["R5", "", "Frota"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_drop_blank_keys() {
        let (kept, dropped) = drop_blank_keys(ds(), "Reference").unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let out = filter_rows(ds(), &[RowFilter::new("Customer", Vec::<String>::new())]).unwrap();
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_filters_are_anded() {
        let filters = [
            RowFilter::new("Customer", ["Beta"]),
            RowFilter::new("Category", ["peças", "Unknown"]),
        ];
        let out = filter_rows(ds(), &filters).unwrap();
        let refs: Vec<String> = out.column("Reference").unwrap().iter().map(|c| c.key()).collect();
        assert_eq!(refs, vec!["", "R4"]);
    }

    #[test]
    fn test_inactive_filter_on_missing_column_is_ignored() {
        let out = filter_rows(ds(), &[RowFilter::new("Nope", Vec::<&str>::new())]).unwrap();
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_active_filter_on_missing_column_fails() {
        let err = filter_rows(ds(), &[RowFilter::new("Nope", ["x"])]).unwrap_err();
        assert_eq!(err, SaldoError::MissingColumn("Nope".to_string()));
    }

    #[test]
    fn test_distinct_values() {
        assert_eq!(distinct_values(&ds(), "Customer").unwrap(), vec!["ACME", "Beta"]);
    }
}
