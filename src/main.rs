use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process;
#[macro_use]
extern crate log;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use transaction_analyzer::{
    load_path, Format, Report, ReportParams, TransactionId, TransactionStore,
};

/// Query a list of card transactions.
#[derive(Parser, Debug)]
#[clap(name = "transaction-analyzer", version, about)]
struct Cli {
    /// JSON array or headered CSV of transactions
    #[clap(parse(from_os_str))]
    input: PathBuf,

    /// Input format. Detected from the file extension when omitted
    #[clap(long, arg_enum)]
    format: Option<Format>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Every transaction in input order
    All,
    /// Distinct transaction types
    Types,
    /// Sum of all amounts
    Total,
    /// Sum of amounts whose date matches every given component
    TotalByDate {
        #[clap(long)]
        year: Option<i64>,
        #[clap(long)]
        month: Option<i64>,
        #[clap(long)]
        day: Option<i64>,
    },
    /// Transactions of exactly this type
    ByType { transaction_type: String },
    /// Transactions between two YYYY-MM-DD dates, inclusive
    DateRange { start: String, end: String },
    /// Transactions from exactly this merchant
    ByMerchant { merchant: String },
    /// Mean amount
    Average,
    /// Transactions with min <= amount <= max
    AmountRange {
        #[clap(allow_hyphen_values = true)]
        min: Decimal,
        #[clap(allow_hyphen_values = true)]
        max: Decimal,
    },
    /// Sum of debit amounts
    TotalDebit,
    /// Month ("01".."12") with the most transactions
    BusiestMonth {
        /// Only count debit transactions
        #[clap(long)]
        debit: bool,
    },
    /// Whether debits or credits are more common
    DominantType,
    /// Transactions on or before a YYYY-MM-DD date
    Before { date: String },
    /// First transaction with this id
    Find {
        #[clap(allow_hyphen_values = true)]
        id: i64,
    },
    /// Every description in input order
    Descriptions,
    /// All of the above with the default arguments
    Report,
}

#[derive(Serialize)]
struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{e:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = load_path(&cli.input, cli.format)
        .with_context(|| format!("Unable to load {}", cli.input.display()))?;

    execute(&store, cli.command)
}

fn execute(store: &TransactionStore, command: Command) -> anyhow::Result<()> {
    match command {
        Command::All => emit(&store.all()),
        Command::Types => emit(&store.unique_types().into_iter().collect::<BTreeSet<_>>()),
        Command::Total => emit(&Amount(store.total_amount()?)),
        Command::TotalByDate { year, month, day } => {
            emit(&Amount(store.total_amount_by_date(year, month, day)?))
        }
        Command::ByType { transaction_type } => emit(&store.by_type(&transaction_type)),
        Command::DateRange { start, end } => emit(&store.in_date_range(&start, &end)?),
        Command::ByMerchant { merchant } => emit(&store.by_merchant(&merchant)),
        Command::Average => emit(&Amount(store.average_amount()?)),
        Command::AmountRange { min, max } => emit(&store.by_amount_range(min, max)),
        Command::TotalDebit => emit(&Amount(store.total_debit_amount()?)),
        Command::BusiestMonth { debit: false } => emit(&store.most_frequent_month()?),
        Command::BusiestMonth { debit: true } => emit(&store.most_frequent_debit_month()?),
        Command::DominantType => emit(&store.dominant_type()),
        Command::Before { date } => emit(&store.before_date(&date)?),
        Command::Find { id } => emit(&store.find_by_id(TransactionId::new(id))),
        Command::Descriptions => emit(&store.descriptions()),
        Command::Report => emit(&Report::build(store, &ReportParams::default())?),
    }
}

fn emit<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Unable to serialize result")?;
    println!("{json}");
    Ok(())
}
