//! The full transform: validate -> drop blank keys -> coerce -> dates ->
//! classify, then filter -> re-coerce -> aggregate on every filter change.

use serde::Serialize;
use tracing::info;

use crate::aggregate::{AggregationResult, AggregationSpec, aggregate};
use crate::amount::AmountNormalizer;
use crate::classify::{ClassificationScheme, classify};
use crate::coerce::{MonetaryColumnSet, coerce_columns};
use crate::dataset::Dataset;
use crate::dates::parse_date_columns;
use crate::error::Result;
use crate::filter::{RowFilter, drop_blank_keys, filter_rows};

/// Classification step: which scheme, and which amount decides the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationStep {
    pub scheme: ClassificationScheme,
    pub amount_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    /// Columns that must exist, beyond those implied by the other steps.
    pub required_columns: Vec<String>,
    /// Rows where this field is blank are dropped.
    pub required_key: Option<String>,
    pub monetary: MonetaryColumnSet,
    pub normalizer: AmountNormalizer,
    /// Optional day-first date columns.
    pub date_columns: Vec<String>,
    pub classification: Option<ClassificationStep>,
    pub aggregation: AggregationSpec,
}

impl PipelineConfig {
    /// Every column the raw upload must carry.
    pub fn expected_columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = self.required_columns.clone();
        cols.extend(self.required_key.iter().cloned());
        cols.extend(self.monetary.columns().iter().cloned());
        if let Some(step) = &self.classification {
            cols.push(step.scheme.key_field.clone());
            cols.push(step.amount_field.clone());
        }
        let mut seen = Vec::with_capacity(cols.len());
        for c in cols {
            let c = c.trim().to_string();
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        seen
    }
}

/// Informational counts gathered while preparing a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Diagnostics {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub unknown_category: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub dataset: Dataset,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Refined {
    pub dataset: Dataset,
    pub aggregation: AggregationResult,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Check the schema up front: the first missing column fails the run.
    pub fn validate(&self, raw: &Dataset) -> Result<()> {
        for col in self.config.expected_columns() {
            raw.require_column(&col)?;
        }
        Ok(())
    }

    /// Turn a raw upload into a clean, classified dataset.
    pub fn prepare(&self, raw: Dataset) -> Result<Prepared> {
        self.validate(&raw)?;
        let rows_read = raw.len();
        info!(rows = rows_read, "rows read");

        let dataset = match &self.config.required_key {
            Some(key) => {
                let (kept, _) = drop_blank_keys(raw, key)?;
                info!(field = %key, rows = kept.len(), "rows after dropping blank keys");
                kept
            }
            None => raw,
        };
        let rows_kept = dataset.len();

        let dataset = coerce_columns(dataset, &self.config.monetary, &self.config.normalizer)?;
        let dataset = parse_date_columns(dataset, &self.config.date_columns);

        let (dataset, unknown_category) = match &self.config.classification {
            Some(step) => {
                let (ds, summary) = classify(dataset, &step.scheme, &step.amount_field)?;
                (ds, summary.unknown)
            }
            None => (dataset, 0),
        };

        Ok(Prepared {
            dataset,
            diagnostics: Diagnostics {
                rows_read,
                rows_kept,
                unknown_category,
            },
        })
    }

    /// Filter a prepared dataset and total it from scratch.
    ///
    /// Coercion runs again after filtering so aggregation never sees text.
    pub fn refine(&self, prepared: &Dataset, filters: &[RowFilter]) -> Result<Refined> {
        let filtered = filter_rows(prepared.clone(), filters)?;
        let dataset = coerce_columns(filtered, &self.config.monetary, &self.config.normalizer)?;
        let aggregation = aggregate(&dataset, &self.config.aggregation)?;
        Ok(Refined {
            dataset,
            aggregation,
        })
    }
}
