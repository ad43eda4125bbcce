//! Lookup-table classification and sign buckets.
//!
//! A [`ClassificationScheme`] pairs a key field with a code -> category map,
//! so document-type and account-code tables share one code path. Lookup is
//! total: unmapped keys land in [`UNKNOWN_CATEGORY`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use crate::dataset::{Cell, Dataset};
use crate::error::Result;

/// Fallback label for keys with no mapping.
pub const UNKNOWN_CATEGORY: &str = "Unknown";
/// Column written by [`classify`] with the category label.
pub const CATEGORY_COLUMN: &str = "Category";
/// Column written by [`classify`] with the sign bucket label.
pub const BUCKET_COLUMN: &str = "Sign Bucket";

/// Received vs paid, from the sign of an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignBucket {
    #[serde(rename = "Received(+)")]
    Received,
    #[serde(rename = "Paid(-)")]
    Paid,
}

impl SignBucket {
    /// Strictly positive is received. Zero counts as paid.
    pub fn of(amount: f64) -> Self {
        if amount > 0.0 {
            SignBucket::Received
        } else {
            SignBucket::Paid
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignBucket::Received => "Received(+)",
            SignBucket::Paid => "Paid(-)",
        }
    }
}

impl fmt::Display for SignBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Static code -> category table. Keys are stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassificationMap {
    entries: BTreeMap<String, String>,
}

impl ClassificationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl AsRef<str>, category: impl Into<String>) {
        self.entries
            .insert(key.as_ref().trim().to_string(), category.into());
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key.trim()).map(String::as_str)
    }

    /// Category for `key`, or [`UNKNOWN_CATEGORY`].
    pub fn category_for(&self, key: &str) -> &str {
        self.lookup(key).unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ClassificationMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = ClassificationMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A key field plus the table used to classify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationScheme {
    pub name: String,
    pub key_field: String,
    pub map: ClassificationMap,
}

impl ClassificationScheme {
    pub fn new(name: impl Into<String>, key_field: impl Into<String>, map: ClassificationMap) -> Self {
        Self {
            name: name.into(),
            key_field: key_field.into().trim().to_string(),
            map,
        }
    }

    pub fn category_of(&self, key: &Cell) -> &str {
        self.map.category_for(&key.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassificationSummary {
    pub rows: usize,
    pub unknown: usize,
}

/// Write [`CATEGORY_COLUMN`] and [`BUCKET_COLUMN`] on every row.
///
/// `amount_field` should already be coerced; a non-numeric cell is read as
/// zero and therefore lands in [`SignBucket::Paid`].
pub fn classify(
    mut dataset: Dataset,
    scheme: &ClassificationScheme,
    amount_field: &str,
) -> Result<(Dataset, ClassificationSummary)> {
    let key_idx = dataset.require_column(&scheme.key_field)?;
    let amount_idx = dataset.require_column(amount_field)?;

    let mut unknown = 0usize;
    dataset.derive_column(CATEGORY_COLUMN, |row| {
        let category = scheme.category_of(row.cell(key_idx));
        if category == UNKNOWN_CATEGORY {
            unknown += 1;
        }
        Cell::Text(category.to_string())
    });
    dataset.derive_column(BUCKET_COLUMN, |row| {
        let amount = row.cell(amount_idx).as_number().unwrap_or(0.0);
        Cell::Text(SignBucket::of(amount).label().to_string())
    });

    let summary = ClassificationSummary {
        rows: dataset.len(),
        unknown,
    };
    info!(
        scheme = %scheme.name,
        unknown = summary.unknown,
        rows = summary.rows,
        "rows without a category mapping"
    );
    Ok((dataset, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaldoError;

    fn scheme() -> ClassificationScheme {
        let map: ClassificationMap = [("MA", "peças"), (" 42 ", "Frota")].into_iter().collect();
        ClassificationScheme::new("document-type", "Document Type", map)
    }

    fn dataset() -> Dataset {
        let mut ds = Dataset::new(["Document Type", "Amount"]).unwrap();
        ds.push_row(vec![Cell::Text(" MA".into()), Cell::Number(1500.0)]).unwrap();
        ds.push_row(vec![Cell::Text("ZZ".into()), Cell::Number(-200.5)]).unwrap();
        ds.push_row(vec![Cell::Number(42.0), Cell::Number(0.0)]).unwrap();
        ds.push_row(vec![Cell::Empty, Cell::Number(3.0)]).unwrap();
        ds
    }

    #[test]
    fn test_classify_with_fallback() {
        let (ds, summary) = classify(dataset(), &scheme(), "Amount").unwrap();
        let cats: Vec<String> = ds.column(CATEGORY_COLUMN).unwrap().iter().map(|c| c.key()).collect();
        assert_eq!(cats, vec!["peças", "Unknown", "Frota", "Unknown"]);
        assert_eq!(summary, ClassificationSummary { rows: 4, unknown: 2 });
    }

    #[test]
    fn test_every_row_gets_a_category() {
        let (ds, _) = classify(dataset(), &scheme(), "Amount").unwrap();
        assert!(ds.column(CATEGORY_COLUMN).unwrap().iter().all(|c| !c.is_blank()));
    }

    #[test]
    fn test_zero_amount_is_paid() {
        // Boundary: only strictly positive amounts are "Received(+)".
        assert_eq!(SignBucket::of(0.0), SignBucket::Paid);
        assert_eq!(SignBucket::of(-0.0), SignBucket::Paid);
        assert_eq!(SignBucket::of(0.01), SignBucket::Received);

        let (ds, _) = classify(dataset(), &scheme(), "Amount").unwrap();
        let buckets: Vec<String> = ds.column(BUCKET_COLUMN).unwrap().iter().map(|c| c.key()).collect();
        assert_eq!(buckets, vec!["Received(+)", "Paid(-)", "Paid(-)", "Received(+)"]);
    }

    #[test]
    fn test_missing_key_field() {
        let other = ClassificationScheme::new("account-code", "Conta", ClassificationMap::new());
        let err = classify(dataset(), &other, "Amount").unwrap_err();
        assert_eq!(err, SaldoError::MissingColumn("Conta".to_string()));
    }

    #[test]
    fn test_reclassify_overwrites() {
        let (ds, _) = classify(dataset(), &scheme(), "Amount").unwrap();
        let width = ds.columns().len();
        let (ds, _) = classify(ds, &scheme(), "Amount").unwrap();
        assert_eq!(ds.columns().len(), width);
    }

    #[test]
    fn test_bucket_serializes_with_label() {
        let json = serde_json::to_string(&SignBucket::Received).unwrap();
        assert_eq!(json, r#""Received(+)""#);
    }
}
