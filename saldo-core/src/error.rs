use thiserror::Error;

/// Errors raised by the dataset pipeline.
///
/// Only schema-shape problems live here. Unparseable monetary text is never
/// an error; it normalizes to zero.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaldoError {
    /// A declared column is absent from the dataset schema.
    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// Two columns share the same (trimmed) name.
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A row does not have one cell per schema column.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A configuration value is missing or invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SaldoError>;
