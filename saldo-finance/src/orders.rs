//! Order-book profile: invoice value and expected vs paid per payment method.

use anyhow::{Context, Result};
use saldo_core::{
    AggregationSpec, AmountNormalizer, Dataset, Diagnostics, MonetaryColumnSet, PairedTotal,
    Pipeline, PipelineConfig, RowFilter, SeparatorHeuristic, distinct_values,
};
use saldo_ingest::Schema;
use serde::Serialize;
use tracing::info;

pub const ORDER_NUMBER: &str = "Número do Pedido";
pub const INVOICE_VALUE: &str = "Valor de Nota Fiscal";

/// (expected, paid) per payment method, in display order.
pub const PAYMENT_PAIRS: [(&str, &str); 5] = [
    ("Valor Esperado Sinal", "Valor Pago Sinal"),
    ("Valor Esperado à Vista", "Valor Pago à Vista"),
    ("Valor Esperado Usado", "Valor Pago Usado"),
    ("Valor Esperado Financiado", "Valor Pago Financiado"),
    ("Valor Esperado Leasing", "Valor Pago Leasing"),
];

const EXPECTED_PREFIX: &str = "Valor Esperado ";

/// Invoice value followed by every expected/paid column.
pub fn financial_columns() -> Vec<&'static str> {
    let mut cols = vec![INVOICE_VALUE];
    for (expected, paid) in PAYMENT_PAIRS {
        cols.push(expected);
        cols.push(paid);
    }
    cols
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdersOptions {
    pub heuristic: SeparatorHeuristic,
}

impl Default for OrdersOptions {
    fn default() -> Self {
        Self {
            heuristic: SeparatorHeuristic::DotThousands,
        }
    }
}

pub fn orders_pipeline(opts: &OrdersOptions) -> Pipeline {
    let mut aggregation = AggregationSpec::new().total(INVOICE_VALUE);
    for (expected, paid) in PAYMENT_PAIRS {
        aggregation = aggregation.pair(expected, paid);
    }
    Pipeline::new(PipelineConfig {
        required_columns: vec![ORDER_NUMBER.to_string()],
        monetary: MonetaryColumnSet::new(financial_columns()),
        normalizer: AmountNormalizer::new(opts.heuristic),
        aggregation,
        ..Default::default()
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentLine {
    /// "Sinal", "à Vista", ...
    pub method: String,
    pub expected_field: String,
    pub expected: f64,
    pub paid_field: String,
    pub paid: f64,
    pub outstanding: f64,
}

impl From<&PairedTotal> for PaymentLine {
    fn from(p: &PairedTotal) -> Self {
        let method = p
            .expected_field
            .strip_prefix(EXPECTED_PREFIX)
            .unwrap_or(&p.expected_field)
            .to_string();
        Self {
            method,
            expected_field: p.expected_field.clone(),
            expected: p.expected,
            paid_field: p.paid_field.clone(),
            paid: p.paid,
            outstanding: p.outstanding(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrdersReport {
    pub heuristic: String,
    pub diagnostics: Diagnostics,
    /// Order numbers available to filter on.
    pub order_numbers: Vec<String>,
    pub rows: usize,
    pub invoice_total: f64,
    pub payments: Vec<PaymentLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrdersRun {
    pub report: OrdersReport,
    /// Filtered rows; descriptive columns first, financial columns last.
    pub dataset: Dataset,
}

/// Move the financial columns to the end, keeping their declared order.
fn financial_columns_last(dataset: Dataset) -> Result<Dataset> {
    let financial = financial_columns();
    let mut order: Vec<String> = dataset
        .columns()
        .iter()
        .filter(|c| !financial.iter().any(|f| *f == c.as_str()))
        .cloned()
        .collect();
    order.extend(financial.iter().map(|c| c.to_string()));
    Ok(dataset.reorder_columns(&order)?)
}

/// Prepare, filter by order number and total a raw order-book upload.
pub fn run_orders(raw: Dataset, opts: &OrdersOptions, orders: &[String]) -> Result<OrdersRun> {
    let pipeline = orders_pipeline(opts);
    Schema::new(pipeline.config().expected_columns()).check(&raw)?;

    let prepared = pipeline.prepare(raw).context("preparing orders")?;
    let order_numbers = distinct_values(&prepared.dataset, ORDER_NUMBER)?;

    let filters = [RowFilter::new(ORDER_NUMBER, orders)];
    let refined = pipeline
        .refine(&prepared.dataset, &filters)
        .context("aggregating orders")?;
    info!(rows = refined.aggregation.rows, selected = orders.len(), "orders aggregated");

    let report = OrdersReport {
        heuristic: opts.heuristic.to_string(),
        diagnostics: prepared.diagnostics,
        order_numbers,
        rows: refined.aggregation.rows,
        invoice_total: refined.aggregation.column_total(INVOICE_VALUE).unwrap_or(0.0),
        payments: refined.aggregation.pairs.iter().map(PaymentLine::from).collect(),
    };

    Ok(OrdersRun {
        report,
        dataset: financial_columns_last(refined.dataset)?,
    })
}
