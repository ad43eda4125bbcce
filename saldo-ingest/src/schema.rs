//! Up-front schema check for an uploaded table.

use anyhow::Result;
use saldo_core::{Dataset, SaldoError};

/// Column names an upload must carry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    required: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            required: required
                .into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Required columns absent from `dataset`, in declaration order.
    pub fn missing(&self, dataset: &Dataset) -> Vec<String> {
        self.required
            .iter()
            .filter(|c| !dataset.has_column(c))
            .cloned()
            .collect()
    }

    /// Fail with every missing column listed, before any processing runs.
    pub fn check(&self, dataset: &Dataset) -> Result<()> {
        let missing = self.missing(dataset);
        if let Some(first) = missing.first() {
            return Err(anyhow::Error::new(SaldoError::MissingColumn(first.clone())).context(
                format!(
                    "upload is missing {} required column(s): {}",
                    missing.len(),
                    missing.join(", ")
                ),
            ));
        }
        Ok(())
    }
}
