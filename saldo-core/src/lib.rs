//! saldo-core: dataset model and the normalize / classify / aggregate pipeline

pub mod aggregate;
pub mod amount;
pub mod classify;
pub mod coerce;
pub mod dataset;
pub mod dates;
pub mod error;
pub mod filter;
pub mod pipeline;

pub use aggregate::{AggregationResult, AggregationSpec, GrandTotals, GroupSum, PairedTotal, aggregate};
pub use amount::{AmountNormalizer, SeparatorHeuristic, parse_amount};
pub use classify::{
    BUCKET_COLUMN, CATEGORY_COLUMN, ClassificationMap, ClassificationScheme, SignBucket,
    UNKNOWN_CATEGORY, classify,
};
pub use coerce::{MonetaryColumnSet, coerce_columns, is_coerced};
pub use dataset::{Cell, Dataset, Record};
pub use error::{Result, SaldoError};
pub use filter::{RowFilter, distinct_values, drop_blank_keys, filter_rows};
pub use pipeline::{ClassificationStep, Diagnostics, Pipeline, PipelineConfig, Prepared, Refined};
