//! saldo-ingest: spreadsheet and delimited-text ingestion, schema checks, and export.

pub mod export;
pub mod parsers;
pub mod schema;
pub mod types;

pub use export::{write_table, write_table_path};
pub use parsers::delimited::{parse_table_bytes, read_delimited_path, read_table};
pub use parsers::read_table_path;
pub use parsers::xlsx::read_workbook_path;
pub use schema::Schema;
pub use types::Delimiter;
