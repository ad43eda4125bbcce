//! Ledger profile: receipts and payments from an accounting export.
//!
//! Expected columns: Reference, Customer, Amount in local currency, and the
//! key field of the chosen scheme (Document Type or Conta). Document Date,
//! Net due date and Entry Date are parsed when present.

use anyhow::{Context, Result};
use saldo_core::{
    AggregationSpec, AmountNormalizer, CATEGORY_COLUMN, Cell, ClassificationStep, Dataset,
    Diagnostics, GrandTotals, GroupSum, MonetaryColumnSet, Pipeline, PipelineConfig, RowFilter,
    SeparatorHeuristic, distinct_values,
};
use saldo_ingest::Schema;
use serde::Serialize;
use tracing::info;

use crate::category_tables::{SchemeKind, account_description};

pub const REFERENCE: &str = "Reference";
pub const CUSTOMER: &str = "Customer";
pub const AMOUNT: &str = "Amount in local currency";
pub const ACCOUNT_DESCRIPTION: &str = "Account Description";
pub const DATE_COLUMNS: [&str; 3] = ["Document Date", "Net due date", "Entry Date"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerOptions {
    pub scheme: SchemeKind,
    pub heuristic: SeparatorHeuristic,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            scheme: SchemeKind::DocumentType,
            heuristic: SeparatorHeuristic::CommaDecimal,
        }
    }
}

/// Selected filter values. Empty lists select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSelection {
    pub customers: Vec<String>,
    pub categories: Vec<String>,
}

impl LedgerSelection {
    pub fn filters(&self) -> Vec<RowFilter> {
        vec![
            RowFilter::new(CUSTOMER, &self.customers),
            RowFilter::new(CATEGORY_COLUMN, &self.categories),
        ]
    }
}

pub fn ledger_pipeline(opts: &LedgerOptions) -> Pipeline {
    Pipeline::new(PipelineConfig {
        required_columns: vec![CUSTOMER.to_string()],
        required_key: Some(REFERENCE.to_string()),
        monetary: MonetaryColumnSet::new([AMOUNT]),
        normalizer: AmountNormalizer::new(opts.heuristic),
        date_columns: DATE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        classification: Some(ClassificationStep {
            scheme: opts.scheme.scheme(),
            amount_field: AMOUNT.to_string(),
        }),
        aggregation: AggregationSpec::new()
            .amount(AMOUNT)
            .group_by(CATEGORY_COLUMN)
            .group_by(CUSTOMER),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerReport {
    pub scheme: String,
    pub heuristic: String,
    pub diagnostics: Diagnostics,
    /// Filter choices offered by the prepared (unfiltered) data.
    pub customers: Vec<String>,
    pub categories: Vec<String>,
    /// Rows left after filtering.
    pub rows: usize,
    pub totals: GrandTotals,
    pub by_category: Vec<GroupSum>,
    pub by_customer: Vec<GroupSum>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRun {
    pub report: LedgerReport,
    /// Filtered, cleaned rows, ready for export.
    pub dataset: Dataset,
}

/// Prepare, filter and total a raw ledger upload.
pub fn run_ledger(raw: Dataset, opts: &LedgerOptions, selection: &LedgerSelection) -> Result<LedgerRun> {
    let pipeline = ledger_pipeline(opts);
    Schema::new(pipeline.config().expected_columns()).check(&raw)?;

    let mut prepared = pipeline.prepare(raw).context("preparing ledger")?;
    if opts.scheme == SchemeKind::AccountCode {
        let key_idx = prepared.dataset.require_column(opts.scheme.key_field())?;
        prepared.dataset.derive_column(ACCOUNT_DESCRIPTION, |row| {
            account_description(&row.cell(key_idx).key())
                .map(Cell::from_raw)
                .unwrap_or(Cell::Empty)
        });
    }

    let customers = distinct_values(&prepared.dataset, CUSTOMER)?;
    let categories = distinct_values(&prepared.dataset, CATEGORY_COLUMN)?;

    let refined = pipeline
        .refine(&prepared.dataset, &selection.filters())
        .context("aggregating ledger")?;
    let agg = refined.aggregation;
    info!(rows = agg.rows, "ledger aggregated");

    let report = LedgerReport {
        scheme: opts.scheme.to_string(),
        heuristic: opts.heuristic.to_string(),
        diagnostics: prepared.diagnostics,
        customers,
        categories,
        rows: agg.rows,
        totals: agg.totals.unwrap_or_default(),
        by_category: agg.group(CATEGORY_COLUMN).to_vec(),
        by_customer: agg.group(CUSTOMER).to_vec(),
    };

    Ok(LedgerRun {
        report,
        dataset: refined.dataset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use saldo_core::{BUCKET_COLUMN, SaldoError, SignBucket};

    fn raw() -> Dataset {
        Dataset::from_text_rows(
            [REFERENCE, CUSTOMER, "Document Type", AMOUNT, "Entry Date"],
            &[
                vec!["100", "ACME", "MA", "R$ 1.500,00", "02/01/2024"],
                vec!["101", "ACME", "ZZ", "-200,50", "03/01/2024"],
                vec!["102", "Beta", "42", "", "x"],
                vec!["", "Beta", "MA", "999,00", ""],
                vec!["103", "Beta", "RV", "8.698,71", ""],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_run_ledger_unfiltered() {
        let run = run_ledger(raw(), &LedgerOptions::default(), &LedgerSelection::default()).unwrap();
        let r = &run.report;
        assert_eq!(r.diagnostics.rows_read, 5);
        assert_eq!(r.diagnostics.rows_kept, 4);
        assert_eq!(r.diagnostics.unknown_category, 1);
        assert_eq!(r.rows, 4);
        assert_eq!(r.totals.received, 1500.0 + 8698.71);
        assert_eq!(r.totals.paid, -200.5);
        assert_eq!(r.customers, vec!["ACME", "Beta"]);
        assert!(r.categories.contains(&"Unknown".to_string()));
        assert!(run.dataset.has_column("Entry Date_parsed"));
        assert!(run.dataset.has_column(BUCKET_COLUMN));
    }

    #[test]
    fn test_run_ledger_filtered_by_customer() {
        let selection = LedgerSelection {
            customers: vec!["Beta".into()],
            categories: vec![],
        };
        let run = run_ledger(raw(), &LedgerOptions::default(), &selection).unwrap();
        assert_eq!(run.dataset.len(), 2);
        assert_eq!(run.report.totals.net, 8698.71);
        assert!(run.report.by_customer.iter().all(|g| g.key == "Beta"));
        // Choices still come from the full dataset
        assert_eq!(run.report.customers, vec!["ACME", "Beta"]);
    }

    #[test]
    fn test_run_ledger_filtered_by_category() {
        let selection = LedgerSelection {
            customers: vec![],
            categories: vec!["Frota".into(), "Unknown".into()],
        };
        let run = run_ledger(raw(), &LedgerOptions::default(), &selection).unwrap();
        assert_eq!(run.report.rows, 2);
        assert_eq!(run.report.totals.received, 0.0);
        assert!(run.report.by_category.iter().all(|g| g.bucket == SignBucket::Paid));
    }

    #[test]
    fn test_missing_amount_column_is_fatal() {
        let raw = Dataset::from_text_rows([REFERENCE, CUSTOMER, "Document Type"], &[vec!["1", "A", "MA"]])
            .unwrap();
        let err = run_ledger(raw, &LedgerOptions::default(), &LedgerSelection::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SaldoError>(),
            Some(&SaldoError::MissingColumn(AMOUNT.to_string()))
        );
    }

    #[test]
    fn test_account_code_scheme_adds_description() {
        let raw = Dataset::from_text_rows(
            [REFERENCE, CUSTOMER, "Conta", AMOUNT],
            &[vec!["1", "A", "301301", "10,00"], vec!["2", "A", "1", "5,00"]],
        )
        .unwrap();
        let opts = LedgerOptions {
            scheme: SchemeKind::AccountCode,
            ..Default::default()
        };
        let run = run_ledger(raw, &opts, &LedgerSelection::default()).unwrap();
        assert_eq!(run.dataset.get(0, CATEGORY_COLUMN), Some(&Cell::Text("Cars".into())));
        assert_eq!(
            run.dataset.get(0, ACCOUNT_DESCRIPTION),
            Some(&Cell::Text("Sale new cars, ngc".into()))
        );
        assert_eq!(run.dataset.get(1, ACCOUNT_DESCRIPTION), Some(&Cell::Empty));
        assert_eq!(run.report.diagnostics.unknown_category, 1);
    }
}
