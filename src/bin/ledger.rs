use std::{error::Error, fs::OpenOptions, path::PathBuf, process::exit, sync::Arc};

use clap::{Parser, Subcommand};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_ledger::{CategoryId, DEFAULT_CATEGORIES, Ledger, LedgerConfig, Window, currency};

/// Record expenses and see how much you spent today, this month and this year.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the ledger SQLite database.
    #[arg(long, env = "LEDGER_DB_PATH")]
    db_path: PathBuf,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    #[arg(long, env = "LEDGER_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// Also write debug logs to this file.
    #[arg(long, env = "LEDGER_LOG_PATH")]
    log_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and the default categories on first use.
    Init,

    /// Create a new category.
    AddCategory {
        /// The display name of the category.
        #[arg(long)]
        name: String,

        /// An icon identifier for the category.
        #[arg(long, default_value = "")]
        icon: String,
    },

    /// Record a transaction.
    AddTransaction {
        /// The amount spent.
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,

        /// The ID of the category to record the transaction against.
        #[arg(long)]
        category_id: CategoryId,

        /// When the transaction happened as an RFC 3339 timestamp. Defaults to now.
        #[arg(long, value_parser = parse_timestamp)]
        timestamp: Option<OffsetDateTime>,
    },

    /// List the categories.
    Categories {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the spending totals.
    Summary {
        /// Only show the total for this window (day, month or year).
        #[arg(long)]
        window: Option<Window>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging(args.log_path.as_ref())?;

    let config = LedgerConfig {
        local_timezone: args.timezone,
    };

    let ledger = match Ledger::open(&args.db_path, &config) {
        Ok(ledger) => ledger,
        Err(error) => {
            eprintln!("Could not open the ledger at {:#?}: {error}", args.db_path);
            exit(1);
        }
    };

    match args.command {
        Command::Init => {
            if ledger.run_first_time_setup(&DEFAULT_CATEGORIES)? {
                println!("Created {} default categories.", DEFAULT_CATEGORIES.len());
            } else {
                println!("Ledger is already set up.");
            }
        }
        Command::AddCategory { name, icon } => {
            let id = ledger.add_category(&name, &icon)?;
            println!("Created category {id}.");
        }
        Command::AddTransaction {
            amount,
            category_id,
            timestamp,
        } => {
            let timestamp = timestamp.unwrap_or_else(OffsetDateTime::now_utc);
            let id = ledger.add_transaction(amount, timestamp, category_id)?;
            println!("Recorded transaction {id}.");
        }
        Command::Categories { json } => {
            let categories = ledger.list_categories()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&categories)?);
            } else {
                for category in categories {
                    println!(
                        "{:>4}  {:<20} {}",
                        category.id, category.name, category.icon
                    );
                }
            }
        }
        Command::Summary { window, json } => {
            let totals = ledger.summary_totals(OffsetDateTime::now_utc())?;
            let breakdown = ledger.category_breakdown()?;

            if json {
                let summary = serde_json::json!({
                    "totals": totals,
                    "categories": breakdown,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            let windows = match window {
                Some(window) => vec![window],
                None => Window::ALL.to_vec(),
            };
            for window in windows {
                println!("{:<12} {}", window.label(), currency(totals.get(window)));
            }

            if !breakdown.is_empty() {
                println!();
                for category_total in breakdown {
                    println!(
                        "{:<20} {}",
                        category_total.category.name,
                        currency(category_total.total)
                    );
                }
            }
        }
    }

    Ok(())
}

fn parse_timestamp(text: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(text, &Rfc3339)
        .map_err(|error| format!("expected an RFC 3339 timestamp: {error}"))
}

fn setup_logging(log_path: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_filter(stdout_filter);

    let debug_log = match log_path {
        Some(log_path) => {
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(false)
                    .with_writer(Arc::new(log_file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
}
