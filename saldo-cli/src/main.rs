use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use saldo_core::{GroupSum, SeparatorHeuristic};
use saldo_finance::{
    LedgerOptions, LedgerReport, LedgerSelection, OrdersOptions, OrdersReport, SchemeKind,
    run_ledger, run_orders,
};
use saldo_ingest::{Delimiter, read_table_path, write_table_path};
use std::path::{Path, PathBuf};

mod config;
mod format;
mod logging;

use config::Config;
use format::format_brl;

#[derive(Parser, Debug)]
#[command(
    name = "saldo",
    version,
    about = "Normalize, classify and total financial spreadsheet exports"
)]
struct Cli {
    /// Config file (default: ~/.saldo/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (default from config)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Receipts and payments by category and customer
    Ledger(LedgerArgs),

    /// Expected vs paid totals per payment method
    Orders(OrdersArgs),

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Spreadsheet upload (.xlsx, .xls, .ods) or delimited text export
    #[arg(long)]
    file: PathBuf,

    /// Field delimiter for text exports: auto, comma, semicolon, tab
    #[arg(long)]
    delimiter: Option<Delimiter>,

    /// Separator heuristic: comma-decimal or dot-thousands
    #[arg(long)]
    heuristic: Option<SeparatorHeuristic>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the filtered, cleaned rows to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LedgerArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Classification table: document-type or account-code
    #[arg(long)]
    scheme: Option<SchemeKind>,

    /// Keep only these customers (repeatable)
    #[arg(long = "customer")]
    customers: Vec<String>,

    /// Keep only these categories (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,
}

#[derive(Args, Debug)]
struct OrdersArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Keep only these order numbers (repeatable)
    #[arg(long = "order")]
    orders: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(cli.config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or(&cfg.logging.level);
    logging::init_logging(level)?;

    match cli.command {
        Command::Ledger(args) => ledger(args, &cfg)?,
        Command::Orders(args) => orders(args, &cfg)?,
        Command::Config { command } => match command {
            ConfigCommand::Init => {
                let (path, created) = config::init_config(cli.config.as_deref())?;
                if created {
                    println!("Wrote {}", path.display());
                } else {
                    println!("Config already exists: {}", path.display());
                }
            }
            ConfigCommand::Show => {
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn load_input(input: &InputArgs, cfg: &Config) -> Result<saldo_core::Dataset> {
    if !input.file.exists() {
        bail!("file not found: {} (pass --file <path>)", input.file.display());
    }
    let delimiter = input.delimiter.unwrap_or(cfg.input.delimiter);
    read_table_path(&input.file, delimiter)
}

fn export(dataset: &saldo_core::Dataset, path: &Path, input: &InputArgs) -> Result<()> {
    let delimiter = input.delimiter.and_then(|d| d.byte()).unwrap_or(b',');
    write_table_path(dataset, path, delimiter)?;
    println!("\nWrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

fn ledger(args: LedgerArgs, cfg: &Config) -> Result<()> {
    let raw = load_input(&args.input, cfg)?;
    let opts = LedgerOptions {
        scheme: args.scheme.unwrap_or(cfg.ledger.scheme),
        heuristic: args.input.heuristic.unwrap_or(cfg.normalizer.ledger_heuristic),
    };
    let selection = LedgerSelection {
        customers: args.customers,
        categories: args.categories,
    };

    let run = run_ledger(raw, &opts, &selection)
        .with_context(|| format!("processing {}", args.input.file.display()))?;

    if args.input.json {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
    } else {
        print_ledger(&run.report, &args.input.file);
    }

    if let Some(path) = &args.input.export {
        export(&run.dataset, path, &args.input)?;
    }
    Ok(())
}

fn orders(args: OrdersArgs, cfg: &Config) -> Result<()> {
    let raw = load_input(&args.input, cfg)?;
    let opts = OrdersOptions {
        heuristic: args.input.heuristic.unwrap_or(cfg.normalizer.orders_heuristic),
    };

    let run = run_orders(raw, &opts, &args.orders)
        .with_context(|| format!("processing {}", args.input.file.display()))?;

    if args.input.json {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
    } else {
        print_orders(&run.report, &args.input.file, &args.orders);
    }

    if let Some(path) = &args.input.export {
        export(&run.dataset, path, &args.input)?;
    }
    Ok(())
}

fn print_groups(title: &str, groups: &[GroupSum]) {
    println!("## {title}\n");
    if groups.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let width = groups.iter().map(|g| g.key.chars().count()).max().unwrap_or(0).max(8);
    for g in groups {
        let key = if g.key.is_empty() { "(blank)" } else { g.key.as_str() };
        println!(
            "- {:<width$}  {:<12} {:>18}  ({} rows)",
            key,
            g.bucket.label(),
            format_brl(g.total),
            g.rows,
        );
    }
    println!();
}

fn print_ledger(report: &LedgerReport, file: &Path) {
    let d = &report.diagnostics;
    println!("Read {} rows from {}", d.rows_read, file.display());
    println!("Rows after dropping blank Reference: {}", d.rows_kept);
    println!(
        "Unclassified ({}): {} / {}  [scheme: {}, separators: {}]\n",
        saldo_core::UNKNOWN_CATEGORY,
        d.unknown_category,
        d.rows_kept,
        report.scheme,
        report.heuristic
    );

    print_groups("By category", &report.by_category);
    print_groups("By customer", &report.by_customer);

    println!("## Totals ({} rows)\n", report.rows);
    println!("Received (+): {}", format_brl(report.totals.received));
    println!("Paid (-):     {}", format_brl(report.totals.paid));
    println!("Net:          {}", format_brl(report.totals.net));
}

fn print_orders(report: &OrdersReport, file: &Path, selected: &[String]) {
    let d = &report.diagnostics;
    println!("Read {} rows from {} [separators: {}]", d.rows_read, file.display(), report.heuristic);
    if selected.is_empty() {
        println!("Orders: all ({})\n", report.order_numbers.len());
    } else {
        println!("Orders: {} ({} rows)\n", selected.join(", "), report.rows);
    }

    println!("## Invoice\n");
    println!("Valor de Nota Fiscal: {}\n", format_brl(report.invoice_total));

    println!("## Expected vs paid\n");
    for p in &report.payments {
        println!(
            "- {:<12} expected {:>18}  paid {:>18}  outstanding {:>18}",
            p.method,
            format_brl(p.expected),
            format_brl(p.paid),
            format_brl(p.outstanding),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ledger_args() {
        let cli = Cli::try_parse_from([
            "saldo",
            "ledger",
            "--file",
            "razao.csv",
            "--customer",
            "ACME",
            "--customer",
            "Beta",
            "--scheme",
            "account-code",
            "--heuristic",
            "dot-thousands",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Ledger(args) => {
                assert_eq!(args.customers, vec!["ACME", "Beta"]);
                assert_eq!(args.scheme, Some(SchemeKind::AccountCode));
                assert_eq!(args.input.heuristic, Some(SeparatorHeuristic::DotThousands));
                assert!(args.input.json);
                assert!(args.categories.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_orders_args_with_global_flags() {
        let cli = Cli::try_parse_from([
            "saldo",
            "orders",
            "--file",
            "pedidos.csv",
            "--order",
            "1001",
            "--delimiter",
            "semicolon",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Orders(args) => {
                assert_eq!(args.orders, vec!["1001"]);
                assert_eq!(args.input.delimiter, Some(Delimiter::Semicolon));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_heuristic_rejected() {
        let res = Cli::try_parse_from(["saldo", "orders", "--file", "x.csv", "--heuristic", "us"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_ledger_export_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("razao.csv");
        let out = dir.path().join("dados_filtrados.csv");
        std::fs::write(
            &input,
            "Reference;Customer;Document Type;Amount in local currency\n1;ACME;MA;1.500,00\n2;ACME;ZZ;-200,50\n",
        )
        .unwrap();

        let args = LedgerArgs {
            input: InputArgs {
                file: input,
                delimiter: None,
                heuristic: None,
                json: true,
                export: Some(out.clone()),
            },
            scheme: None,
            customers: vec![],
            categories: vec!["peças".into()],
        };
        ledger(args, &Config::default()).unwrap();

        let back = read_table_path(&out, Delimiter::Auto).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(
            back.get(0, "Amount in local currency"),
            Some(&saldo_core::Cell::Text("1500".into()))
        );
        assert_eq!(back.get(0, "Category"), Some(&saldo_core::Cell::Text("peças".into())));
    }
}
