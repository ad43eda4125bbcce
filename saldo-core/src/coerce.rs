//! Column coercion: force declared monetary columns to finite numbers.

use tracing::debug;

use crate::amount::AmountNormalizer;
use crate::dataset::{Cell, Dataset};
use crate::error::Result;

/// The named columns that must hold numbers after coercion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonetaryColumnSet {
    columns: Vec<String>,
}

impl MonetaryColumnSet {
    /// Names are trimmed; duplicates keep their first position.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for c in columns {
            let name = c.as_ref().trim().to_string();
            if !out.contains(&name) {
                out.push(name);
            }
        }
        Self { columns: out }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.columns.iter().any(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Rewrite every declared column so each cell is a finite `Cell::Number`.
///
/// Fails only when a declared column is missing from the schema, and that
/// check runs before any cell is touched. Running this twice is the same
/// as running it once.
pub fn coerce_columns(
    mut dataset: Dataset,
    set: &MonetaryColumnSet,
    normalizer: &AmountNormalizer,
) -> Result<Dataset> {
    let indices = set
        .columns()
        .iter()
        .map(|c| dataset.require_column(c))
        .collect::<Result<Vec<_>>>()?;

    for (name, idx) in set.columns().iter().zip(indices) {
        let mut converted = 0usize;
        let mut zeroed = 0usize;
        dataset.map_column(idx, |cell| match cell {
            Cell::Number(n) if n.is_finite() => Cell::Number(*n),
            other => {
                let value = normalizer.normalize(other);
                converted += 1;
                if value == 0.0 && !other.is_blank() {
                    zeroed += 1;
                }
                Cell::Number(value)
            }
        });
        debug!(column = %name, converted, zeroed, "coerced monetary column");
    }

    Ok(dataset)
}

/// True when every declared column exists and holds only finite numbers.
pub fn is_coerced(dataset: &Dataset, set: &MonetaryColumnSet) -> bool {
    set.columns().iter().all(|c| match dataset.column(c) {
        Ok(cells) => cells
            .iter()
            .all(|cell| matches!(cell, Cell::Number(n) if n.is_finite())),
        Err(_) => false,
    })
}
