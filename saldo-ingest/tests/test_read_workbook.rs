use chrono::NaiveDate;
use saldo_core::Cell;
use saldo_ingest::{Delimiter, Schema, read_table_path};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn test_ledger_workbook_cells() {
    let ds = read_table_path(fixture("razao.xlsx"), Delimiter::Auto).unwrap();
    assert_eq!(
        ds.columns(),
        &["Reference", "Customer", "Document Type", "Amount in local currency", "Entry Date"]
    );
    // The blank fourth sheet row is skipped
    assert_eq!(ds.len(), 4);

    assert_eq!(ds.get(0, "Reference"), Some(&Cell::Number(100.0)));
    assert_eq!(ds.get(0, "Document Type"), Some(&Cell::Text("MA".into())));
    assert_eq!(ds.get(0, "Amount in local currency"), Some(&Cell::Number(1500.0)));
    assert_eq!(
        ds.get(0, "Entry Date"),
        Some(&Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()))
    );

    assert_eq!(ds.get(1, "Reference"), Some(&Cell::Text("101".into())));
    assert_eq!(ds.get(1, "Amount in local currency"), Some(&Cell::Text("-200,50".into())));
    assert_eq!(ds.get(1, "Entry Date"), Some(&Cell::Empty));

    assert_eq!(ds.get(2, "Document Type").map(Cell::key), Some("42".to_string()));
    assert_eq!(ds.get(2, "Amount in local currency"), Some(&Cell::Empty));
    assert_eq!(ds.get(3, "Amount in local currency"), Some(&Cell::Number(8698.71)));
}

#[test]
fn test_workbook_schema_check() {
    let ds = read_table_path(fixture("razao.xlsx"), Delimiter::Auto).unwrap();
    assert!(Schema::new(["Reference", "Customer", "Amount in local currency"]).check(&ds).is_ok());
    let err = Schema::new(["Conta"]).check(&ds).unwrap_err();
    assert!(format!("{err:#}").contains("Conta"));
}
