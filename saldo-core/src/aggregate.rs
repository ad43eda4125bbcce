//! Grouped and grand totals over a (filtered) dataset.
//!
//! Aggregation is a pure function of its input: call it again after every
//! filter change instead of patching an earlier result.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::classify::SignBucket;
use crate::dataset::Dataset;
use crate::error::{Result, SaldoError};

/// What to total.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregationSpec {
    /// Signed amount used for grand totals and grouped sums.
    pub amount_field: Option<String>,
    /// Each field is grouped together with the sign bucket of `amount_field`.
    pub group_by: Vec<String>,
    /// Columns summed on their own.
    pub column_totals: Vec<String>,
    /// (expected, paid) column pairs living on the same row.
    pub pairs: Vec<(String, String)>,
}

impl AggregationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, field: impl Into<String>) -> Self {
        self.amount_field = Some(field.into());
        self
    }

    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by.push(field.into());
        self
    }

    pub fn total(mut self, field: impl Into<String>) -> Self {
        self.column_totals.push(field.into());
        self
    }

    pub fn pair(mut self, expected: impl Into<String>, paid: impl Into<String>) -> Self {
        self.pairs.push((expected.into(), paid.into()));
        self
    }

    /// Every column this spec reads.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = self.amount_field.iter().map(String::as_str).collect();
        cols.extend(self.group_by.iter().map(String::as_str));
        cols.extend(self.column_totals.iter().map(String::as_str));
        for (e, p) in &self.pairs {
            cols.push(e);
            cols.push(p);
        }
        cols
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSum {
    pub key: String,
    pub bucket: SignBucket,
    pub total: f64,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GrandTotals {
    /// Sum of strictly positive amounts.
    pub received: f64,
    /// Sum of strictly negative amounts (itself negative or zero).
    pub paid: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTotal {
    pub column: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedTotal {
    pub expected_field: String,
    pub expected: f64,
    pub paid_field: String,
    pub paid: f64,
}

impl PairedTotal {
    pub fn outstanding(&self) -> f64 {
        self.expected - self.paid
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregationResult {
    pub rows: usize,
    /// Group field -> one entry per (key, bucket) pair present, sorted.
    pub groups: BTreeMap<String, Vec<GroupSum>>,
    pub totals: Option<GrandTotals>,
    pub column_totals: Vec<ColumnTotal>,
    pub pairs: Vec<PairedTotal>,
}

impl AggregationResult {
    pub fn group(&self, field: &str) -> &[GroupSum] {
        self.groups.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn column_total(&self, column: &str) -> Option<f64> {
        self.column_totals
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.total)
    }
}

fn sum_column(dataset: &Dataset, column: &str) -> Result<f64> {
    Ok(dataset
        .column(column)?
        .iter()
        .filter_map(|c| c.as_number())
        .sum())
}

/// Compute every total named by `spec` over `dataset`.
pub fn aggregate(dataset: &Dataset, spec: &AggregationSpec) -> Result<AggregationResult> {
    if !spec.group_by.is_empty() && spec.amount_field.is_none() {
        return Err(SaldoError::InvalidConfig(
            "grouped sums need an amount field".to_string(),
        ));
    }
    for col in spec.referenced_columns() {
        dataset.require_column(col)?;
    }

    let mut result = AggregationResult {
        rows: dataset.len(),
        ..Default::default()
    };

    if let Some(amount_field) = &spec.amount_field {
        let amount_idx = dataset.require_column(amount_field)?;
        let amounts: Vec<f64> = dataset
            .rows()
            .iter()
            .map(|r| r.cell(amount_idx).as_number().unwrap_or(0.0))
            .collect();

        let mut totals = GrandTotals::default();
        for &a in &amounts {
            if a > 0.0 {
                totals.received += a;
            } else if a < 0.0 {
                totals.paid += a;
            }
            totals.net += a;
        }
        result.totals = Some(totals);

        for field in &spec.group_by {
            let idx = dataset.require_column(field)?;
            let mut sums: BTreeMap<(String, SignBucket), (f64, usize)> = BTreeMap::new();
            for (row, &a) in dataset.rows().iter().zip(&amounts) {
                let entry = sums
                    .entry((row.cell(idx).key(), SignBucket::of(a)))
                    .or_insert((0.0, 0));
                entry.0 += a;
                entry.1 += 1;
            }
            let groups = sums
                .into_iter()
                .map(|((key, bucket), (total, rows))| GroupSum {
                    key,
                    bucket,
                    total,
                    rows,
                })
                .collect();
            result.groups.insert(field.trim().to_string(), groups);
        }
    }

    for column in &spec.column_totals {
        result.column_totals.push(ColumnTotal {
            column: column.trim().to_string(),
            total: sum_column(dataset, column)?,
        });
    }

    for (expected, paid) in &spec.pairs {
        result.pairs.push(PairedTotal {
            expected_field: expected.trim().to_string(),
            expected: sum_column(dataset, expected)?,
            paid_field: paid.trim().to_string(),
            paid: sum_column(dataset, paid)?,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;

    fn ds() -> Dataset {
        let mut ds = Dataset::new(["Category", "Customer", "Amount", "Esperado", "Pago"]).unwrap();
        let rows = [
            ("peças", "ACME", 1500.0, 10.0, 5.0),
            ("Unknown", "ACME", -200.5, 0.0, 0.0),
            ("Frota", "", 0.0, 2.5, 2.5),
            ("peças", "Beta", 100.0, 1.0, 0.0),
            ("peças", "Beta", -50.0, 0.0, 1.0),
        ];
        for (cat, cust, amt, e, p) in rows {
            ds.push_row(vec![
                Cell::from_raw(cat),
                Cell::from_raw(cust),
                Cell::Number(amt),
                Cell::Number(e),
                Cell::Number(p),
            ])
            .unwrap();
        }
        ds
    }

    fn spec() -> AggregationSpec {
        AggregationSpec::new()
            .amount("Amount")
            .group_by("Category")
            .group_by("Customer")
            .pair("Esperado", "Pago")
            .total("Esperado")
    }

    #[test]
    fn test_grand_totals() {
        let r = aggregate(&ds(), &spec()).unwrap();
        let t = r.totals.unwrap();
        assert_eq!(t.received, 1600.0);
        assert_eq!(t.paid, -250.5);
        assert_eq!(t.net, 1349.5);
        assert_eq!(r.rows, 5);
    }

    #[test]
    fn test_grouped_sums_present_pairs_only() {
        let r = aggregate(&ds(), &spec()).unwrap();
        let cats = r.group("Category");
        assert_eq!(cats.len(), 4);
        let pecas_paid = cats
            .iter()
            .find(|g| g.key == "peças" && g.bucket == SignBucket::Paid)
            .unwrap();
        assert_eq!(pecas_paid.total, -50.0);
        assert_eq!(pecas_paid.rows, 1);
        assert!(!cats.iter().any(|g| g.key == "Frota" && g.bucket == SignBucket::Received));
    }

    #[test]
    fn test_grouped_sums_add_up_to_net() {
        let r = aggregate(&ds(), &spec()).unwrap();
        let net = r.totals.unwrap().net;
        for field in ["Category", "Customer"] {
            let sum: f64 = r.group(field).iter().map(|g| g.total).sum();
            let rows: usize = r.group(field).iter().map(|g| g.rows).sum();
            assert!((sum - net).abs() < 1e-9, "{field}: {sum} != {net}");
            assert_eq!(rows, 5);
        }
    }

    #[test]
    fn test_blank_group_key_kept() {
        let r = aggregate(&ds(), &spec()).unwrap();
        assert!(r.group("Customer").iter().any(|g| g.key.is_empty()));
    }

    #[test]
    fn test_pairs_and_column_totals() {
        let r = aggregate(&ds(), &spec()).unwrap();
        assert_eq!(r.pairs.len(), 1);
        assert_eq!(r.pairs[0].expected, 13.5);
        assert_eq!(r.pairs[0].paid, 8.5);
        assert_eq!(r.pairs[0].outstanding(), 5.0);
        assert_eq!(r.column_total("Esperado"), Some(13.5));
    }

    #[test]
    fn test_empty_dataset() {
        let empty = Dataset::new(["Category", "Customer", "Amount", "Esperado", "Pago"]).unwrap();
        let r = aggregate(&empty, &spec()).unwrap();
        assert_eq!(r.totals, Some(GrandTotals::default()));
        assert!(r.group("Category").is_empty());
    }

    #[test]
    fn test_group_without_amount_is_invalid() {
        let spec = AggregationSpec::new().group_by("Category");
        assert!(matches!(
            aggregate(&ds(), &spec),
            Err(SaldoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_column() {
        let spec = AggregationSpec::new().total("Valor de Nota Fiscal");
        assert_eq!(
            aggregate(&ds(), &spec).unwrap_err(),
            SaldoError::MissingColumn("Valor de Nota Fiscal".to_string())
        );
    }
}
