//! saldo-finance: ledger and order-book profiles plus their classification tables

pub mod category_tables;
pub mod ledger;
pub mod orders;

pub use category_tables::SchemeKind;
pub use ledger::{LedgerOptions, LedgerReport, LedgerRun, LedgerSelection, run_ledger};
pub use orders::{OrdersOptions, OrdersReport, OrdersRun, PaymentLine, run_orders};
