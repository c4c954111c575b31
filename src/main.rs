//! finplan main entry point

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use finplan_config::{Config, SymbolPosition};
use finplan_core::{
    Category, Entry, Expense, Income, Ledger, MonthlyReport, RecordRef, Subscription, YearMonth,
};
use finplan_io::{CodecError, CodecRef, JsonCodec, LedgerCodec};
use finplan_utils::{fit, format_percent, MoneyFormat};
use log::{info, warn};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "finplan")]
#[command(version = "0.1.0")]
#[command(
    about = "Track incomes, expenses and subscriptions, and build monthly reports",
    long_about = None
)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monthly report for one calendar month
    Report {
        /// Ledger JSON document
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Month as YYYY-MM
        #[arg(short, long)]
        month: String,
    },
    /// List stored records, newest first
    List {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Kind::All)]
        kind: Kind,
    },
    /// Incomes and expenses inside a date range, or expenses of one category
    Filter {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long, requires = "to", conflicts_with = "category")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
        #[arg(long, required_unless_present = "from")]
        category: Option<Category>,
    },
    /// Check a document without loading it
    Validate {
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Load a document and print it back in normalized form
    Export {
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Print the default configuration
    InitConfig,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Kind {
    Incomes,
    Expenses,
    Subscriptions,
    All,
}

/// Formatting settings taken from the config
struct Render {
    money: MoneyFormat,
    date_format: String,
}

impl Render {
    fn new(config: &Config) -> Self {
        Self {
            money: MoneyFormat {
                symbol: config.currency.symbol.clone(),
                symbol_before: config.currency.symbol_position == SymbolPosition::Before,
                decimal_places: config.currency.decimal_places,
                thousands_separator: config.currency.thousands_separator.clone(),
            },
            date_format: config.display.date_format.clone(),
        }
    }

    fn money(&self, amount: Decimal) -> String {
        self.money.format(amount)
    }

    fn date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }

    fn income_row(&self, index: usize, income: &Income) -> String {
        format!(
            "{:>3}. {}  {}  {:>12}",
            index,
            self.date(income.date()),
            fit(income.source(), 24),
            self.money(income.amount())
        )
    }

    fn expense_row(&self, index: usize, expense: &Expense) -> String {
        format!(
            "{:>3}. {}  {}  {}  {:>12}",
            index,
            self.date(expense.date()),
            fit(&expense.category().to_string(), 9),
            fit(expense.note(), 24),
            self.money(expense.amount())
        )
    }

    fn subscription_row(&self, index: usize, subscription: &Subscription) -> String {
        format!(
            "{:>3}. {}  since {}  {:>12}/month  {}",
            index,
            fit(subscription.name(), 20),
            self.date(subscription.start_date()),
            self.money(subscription.monthly_price()),
            if subscription.is_active() { "active" } else { "paused" }
        )
    }

    fn report(&self, period: YearMonth, report: &MonthlyReport) {
        println!(
            "Report {} ({} to {}, {} days)",
            period,
            self.date(report.period_start),
            self.date(report.period_end),
            report.days_in_period
        );
        println!(
            "  Income         {:>12}  ({} entries)",
            self.money(report.income_total),
            report.income_count
        );
        println!(
            "  Expenses       {:>12}  ({} entries)",
            self.money(report.expense_total),
            report.expense_count
        );
        println!(
            "  Subscriptions  {:>12}  ({} active)",
            self.money(report.subscription_total),
            report.active_subscription_count
        );
        println!("  Net            {:>12}", self.money(report.net));
        println!("  Daily average  {:>12}", self.money(report.average_daily_spend));

        if !report.category_breakdown.is_empty() {
            println!();
            println!("By category:");
            for line in &report.category_breakdown {
                println!(
                    "  {}  {:>12}  {:>7}  ({})",
                    fit(&line.category.to_string(), 9),
                    self.money(line.amount),
                    format_percent(line.percentage),
                    line.count
                );
            }
        }

        if let Some(ref largest) = report.largest_expense {
            println!();
            println!(
                "Largest expense: {} on {} ({}, {})",
                self.money(largest.amount()),
                self.date(largest.date()),
                largest.category(),
                largest.note()
            );
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_found = args.config.exists();
    let config = if config_found {
        match Config::load(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {}", args.config.display(), e.to_details());
                return Err(e).with_context(|| {
                    format!("Failed to load configuration {}", args.config.display())
                });
            }
        }
    } else {
        Config::default()
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if !config_found {
        warn!("Config file {} not found, using defaults", args.config.display());
    }

    let codec: CodecRef = Box::new(JsonCodec);
    let render = Render::new(&config);
    let data_path = |data: Option<PathBuf>| data.unwrap_or_else(|| config.data.path.clone());

    match args.command {
        Command::Report { data, month } => {
            let period =
                YearMonth::parse(&month).with_context(|| format!("Invalid month '{}'", month))?;
            let ledger = load_ledger(&codec, &data_path(data))?;
            render.report(period, &ledger.report_for(period));
        }
        Command::List { data, kind } => {
            let ledger = load_ledger(&codec, &data_path(data))?;
            list(&render, &ledger, kind);
        }
        Command::Filter { data, from, to, category } => {
            let ledger = load_ledger(&codec, &data_path(data))?;
            match (from, to, category) {
                (Some(from), Some(to), _) => {
                    let summary = ledger.range_summary(from, to);
                    println!("{}", summary.range.description());
                    print_entries("Incomes", &summary.incomes, |i, e| render.income_row(i, e));
                    print_entries("Expenses", &summary.expenses, |i, e| render.expense_row(i, e));
                    println!();
                    println!("Income total   {:>12}", render.money(summary.income_total));
                    println!("Expense total  {:>12}", render.money(summary.expense_total));
                }
                (_, _, Some(category)) => {
                    let summary = ledger.category_summary(category);
                    print_entries(&category.to_string(), &summary.expenses, |i, e| {
                        render.expense_row(i, e)
                    });
                    println!();
                    println!("Total  {:>12}", render.money(summary.total));
                }
                _ => anyhow::bail!("Give either --from and --to, or --category"),
            }
        }
        Command::Validate { data } => {
            let path = data_path(data);
            let text = read_document(&path)?;
            match codec.stage(&text) {
                Ok(staged) => {
                    let summary = staged.summary();
                    println!(
                        "{}: OK ({} incomes, {} expenses, {} subscriptions)",
                        path.display(),
                        summary.incomes,
                        summary.expenses,
                        summary.subscriptions
                    );
                }
                Err(e) => {
                    report_codec_error(&path, &e);
                    anyhow::bail!("{} is not a valid ledger document", path.display());
                }
            }
        }
        Command::Export { data } => {
            let ledger = load_ledger(&codec, &data_path(data))?;
            let text = codec.export(&ledger).context("Failed to export ledger")?;
            println!("{}", text);
        }
        Command::InitConfig => {
            print!("{}", Config::generate_default());
        }
    }

    Ok(())
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_ledger(codec: &CodecRef, path: &Path) -> Result<Ledger> {
    let text = read_document(path)?;
    let mut ledger = Ledger::new();
    match codec.import(&mut ledger, &text) {
        Ok(summary) => {
            info!("Loaded {} records from {}", summary.total(), path.display());
            Ok(ledger)
        }
        Err(e) => {
            report_codec_error(path, &e);
            Err(e).with_context(|| format!("Failed to load {}", path.display()))
        }
    }
}

fn report_codec_error(path: &Path, error: &CodecError) {
    let records = error.record_errors();
    if records.is_empty() {
        eprintln!("{}: [{}] {}", path.display(), error.code(), error);
        return;
    }
    for record in records {
        eprintln!("{}: {}", path.display(), record.to_details());
    }
}

fn print_entries<T>(title: &str, entries: &[&Entry<T>], row: impl Fn(usize, &T) -> String) {
    println!();
    println!("{} ({})", title, entries.len());
    for (index, entry) in entries.iter().enumerate() {
        println!("{}", row(index + 1, entry.record()));
    }
}

fn list(render: &Render, ledger: &Ledger, kind: Kind) {
    match kind {
        Kind::Incomes => {
            print_entries("Incomes", &ledger.incomes_for_display(), |i, e| render.income_row(i, e))
        }
        Kind::Expenses => {
            print_entries("Expenses", &ledger.expenses_for_display(), |i, e| {
                render.expense_row(i, e)
            })
        }
        Kind::Subscriptions => print_entries(
            "Subscriptions",
            &ledger.subscriptions_for_display(),
            |i, e| render.subscription_row(i, e),
        ),
        Kind::All => {
            for (index, entry) in ledger.timeline().iter().enumerate() {
                let row = match entry.record {
                    RecordRef::Income(income) => render.income_row(index + 1, income),
                    RecordRef::Expense(expense) => render.expense_row(index + 1, expense),
                    RecordRef::Subscription(subscription) => {
                        render.subscription_row(index + 1, subscription)
                    }
                };
                println!("{:<12} {}", entry.record.kind(), row);
            }
        }
    }
}
