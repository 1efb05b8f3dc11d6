use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use pesa_core::normalize::last_day_of_month;
use pesa_core::{
    categorize_or_keep, Categorizer, Source, Statement, Transaction, TransactionStore,
};
use pesa_ingest::pdf::parse_summary_csv;
use pesa_ingest::{parse_pdf, parse_sms_at, parse_sms_batch_at, PdfInput, PdfOptions, RuleCategorizer};
use pesa_query::{build_transaction_filter, extract_query_intent_with, QueryOptions};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod llm;
mod state;
mod store;

use config::Config;
use llm::LlmCategorizer;
use store::JsonFileStore;

#[derive(Parser, Debug)]
#[command(
    name = "pesa",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PESA_BUILD_SHA"), ")"),
    about = "M-Pesa SMS/statement parser and finance question classifier"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse one M-Pesa SMS, or a file with one message per line
    Sms {
        text: Option<String>,

        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Save parsed transactions to the local store
        #[arg(long)]
        save: bool,

        /// Fill categories (LLM when a key is configured, keyword rules otherwise)
        #[arg(long)]
        categorize: bool,

        #[arg(long, default_value = "local")]
        user: String,
    },

    /// Turn a statement summary table into transactions
    Pdf {
        /// Plain text extracted from the statement PDF
        #[arg(long)]
        text: Option<PathBuf>,

        /// CSV with `transaction type,paid in,paid out` columns
        #[arg(long, conflicts_with = "text")]
        rows: Option<PathBuf>,

        /// Statement month, YYYY-MM
        #[arg(long)]
        month: String,

        /// Statement reference (default: PDF<last day of month>)
        #[arg(long = "ref")]
        reference: Option<String>,

        /// Fail on invalid transaction types instead of repairing them
        #[arg(long)]
        strict: bool,

        #[arg(long)]
        save: bool,

        #[arg(long, default_value = "local")]
        user: String,
    },

    /// Classify a question and show the filter it maps to
    Ask {
        question: String,

        #[arg(long, default_value = "local")]
        user: String,
    },

    /// Inspect or prune the local transaction store
    Store {
        #[command(subcommand)]
        command: StoreCommand,
    },

    /// Manage ~/.pesa/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Print stored transactions
    List {
        #[arg(long)]
        user: Option<String>,
    },
    /// Print stored statement envelopes and their totals
    Statements,
    /// Remove a statement and every transaction that references it
    DeleteStatement { id: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write default config (no-op if it exists)
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();

    let cfg = config::load_config()?;

    match cli.command {
        Command::Sms {
            text,
            file,
            save,
            categorize,
            user,
        } => cmd_sms(&cfg, text, file, save, categorize, &user).await?,

        Command::Pdf {
            text,
            rows,
            month,
            reference,
            strict,
            save,
            user,
        } => {
            let input = match (text, rows) {
                (Some(p), _) => PdfInput::Text(
                    fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?,
                ),
                (None, Some(p)) => {
                    let f = fs::File::open(&p).with_context(|| format!("open {}", p.display()))?;
                    PdfInput::Rows(parse_summary_csv(f).with_context(|| format!("parse {}", p.display()))?)
                }
                (None, None) => PdfInput::Absent,
            };
            let opts = PdfOptions {
                statement_ref: reference,
                self_heal: cfg.ingest.self_heal && !strict,
                summary_anchor: cfg.ingest.summary_anchor,
            };
            cmd_pdf(&cfg, input, &month, &opts, save, &user).await?;
        }

        Command::Ask { question, user } => cmd_ask(&cfg, &question, &user).await?,

        Command::Store { command } => {
            let store = JsonFileStore::new(state::transactions_path()?);
            match command {
                StoreCommand::List { user } => {
                    let rows = store.rows(user.as_deref()).await?;
                    print_json(&rows)?;
                }
                StoreCommand::Statements => print_json(&store.statements().await?)?,
                StoreCommand::DeleteStatement { id } => {
                    let removed = store.delete_transactions_by_statement(&id).await?;
                    println!("Removed {removed} transactions for statement {id}");
                }
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Last day of a `YYYY-MM` month.
fn statement_date(month: &str) -> Result<NaiveDate> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .with_context(|| format!("--month must be YYYY-MM, got {month:?}"))?;
    last_day_of_month(first.year(), first.month()).context("month out of range")
}

fn categorizer(cfg: &Config) -> Result<Box<dyn Categorizer>> {
    match LlmCategorizer::from_config(&cfg.llm)? {
        Some(llm) => Ok(Box::new(llm)),
        None => {
            info!(key_env = %cfg.llm.api_key_env, "no API key; using keyword categorizer");
            Ok(Box::new(RuleCategorizer))
        }
    }
}

async fn save_transactions(user: &str, txns: Vec<Transaction>) -> Result<usize> {
    let store = JsonFileStore::new(state::transactions_path()?);
    let rows = store.insert_transactions(user, txns).await?;
    Ok(rows.len())
}

async fn cmd_sms(
    cfg: &Config,
    text: Option<String>,
    file: Option<PathBuf>,
    save: bool,
    categorize: bool,
    user: &str,
) -> Result<()> {
    let now = cfg.now();
    let mut txns = match (text, file) {
        (_, Some(p)) => {
            let block = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
            let batch = parse_sms_batch_at(&block, now);
            print_json(&batch)?;
            batch.transactions()
        }
        (Some(t), None) => {
            let outcome = parse_sms_at(&t, now);
            print_json(&outcome)?;
            outcome.transactions
        }
        (None, None) => bail!("pass the SMS text or --file <path>"),
    };

    if categorize && !txns.is_empty() {
        let c = categorizer(cfg)?;
        txns = categorize_or_keep(c.as_ref(), txns).await;
        print_json(&txns)?;
    }

    if save && !txns.is_empty() {
        let n = save_transactions(user, txns).await?;
        eprintln!("Saved {n} transactions");
    }
    Ok(())
}

async fn cmd_pdf(
    cfg: &Config,
    input: PdfInput,
    month: &str,
    opts: &PdfOptions,
    save: bool,
    user: &str,
) -> Result<()> {
    let date = statement_date(month)?;
    let outcome = parse_pdf(&input, date, opts);
    print_json(&outcome)?;

    if !outcome.ok {
        bail!(
            "statement not parsed: {}",
            outcome.error.map(|e| e.message).unwrap_or_default()
        );
    }

    if save {
        let statement_ref = outcome.statement_ref.clone().unwrap_or_default();
        let store = JsonFileStore::new(state::transactions_path()?);
        let statement = Statement::from_transactions(
            statement_ref.as_str(),
            user,
            Source::Pdf,
            &outcome.transactions,
            cfg.now(),
        );
        store.insert_statement(statement).await?;
        let n = store.insert_transactions(user, outcome.transactions).await?.len();
        eprintln!("Saved statement {statement_ref} with {n} transactions");
    }
    Ok(())
}

#[derive(Serialize)]
struct AskReport<'a> {
    intent: &'a pesa_query::QueryIntent,
    filter: &'a pesa_core::TransactionFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<Vec<pesa_core::StoredTransaction>>,
}

async fn cmd_ask(cfg: &Config, question: &str, user: &str) -> Result<()> {
    let opts = QueryOptions {
        default_window_days: cfg.query.default_window_days,
    };
    let intent = extract_query_intent_with(question, cfg.now(), &opts);
    let filter = build_transaction_filter(user, &intent.entities);

    let path = state::transactions_path()?;
    let matches = if path.exists() {
        Some(JsonFileStore::new(path).find_transactions(&filter).await?)
    } else {
        None
    };

    print_json(&AskReport {
        intent: &intent,
        filter: &filter,
        matches,
    })
}
