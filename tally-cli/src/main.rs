use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use tally_core::SystemClock;
use tally_ingest::FreeTextParser;
use tally_ledger::{
    LedgerError, LedgerStore, TransactionRecord, extract_transactions, list_all_transactions,
    list_transactions, write_csv,
};
use tracing_subscriber::EnvFilter;

mod config;
mod setup;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Turn pasted bank statements into a ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One-time interactive setup: user id, personal organization, timezone
    Setup,

    /// Parse statement text (file or stdin) and save the transactions found
    Extract {
        /// Read text from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,

        /// Organization to save into (default: ledger.default_organization)
        #[arg(long)]
        org: Option<String>,

        /// Print the saved transactions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show saved transactions, newest first
    History {
        #[arg(long)]
        org: Option<String>,

        /// Id of the last transaction from the previous page
        #[arg(long)]
        cursor: Option<String>,

        /// Page size (default: history.page_size, max 100)
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Write every saved transaction as CSV to stdout
    Export {
        #[arg(long)]
        org: Option<String>,
    },

    /// Organization management
    Org {
        #[command(subcommand)]
        command: OrgCommand,
    },

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum OrgCommand {
    /// Create an organization with you as its first member
    Create { name: String },

    /// Add a user to an organization you belong to
    AddMember { org: String, user: String },

    /// List organizations you belong to
    List,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,

    /// Print the effective config
    Show,
}

#[derive(Serialize)]
struct ExtractOutput<'a> {
    success: bool,
    count: usize,
    transactions: &'a [TransactionRecord],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Setup => setup::run_setup()?,

        Command::Extract { file, org, json } => {
            let cfg = config::load_config()?;
            let org = resolve_org(&cfg, org)?;
            let text = read_input(file)?;
            let clock = SystemClock::from_tz_name(&cfg.clock.timezone)?;
            let parser = FreeTextParser::new()?;
            let mut store = open_store(&cfg)?;

            let saved = extract_transactions(&mut store, &parser, &clock, &org, &cfg.user.id, &text)?;
            store.save().context("saving ledger")?;

            if json {
                let out = ExtractOutput {
                    success: true,
                    count: saved.len(),
                    transactions: &saved,
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let location = store
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("Saved {} transactions to {} ({})\n", saved.len(), org, location);
                print_records(&saved);
            }
        }

        Command::History {
            org,
            cursor,
            limit,
            json,
        } => {
            let cfg = config::load_config()?;
            let org = resolve_org(&cfg, org)?;
            let store = open_store(&cfg)?;
            let limit = limit.unwrap_or(cfg.history.page_size);

            let page = list_transactions(&store, &org, &cfg.user.id, cursor.as_deref(), Some(limit))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else if page.transactions.is_empty() {
                println!("No transactions yet.");
            } else {
                print_records(&page.transactions);
                if let Some(next) = &page.next_cursor {
                    println!("\nMore: tally history --org {} --cursor {}", org, next);
                }
            }
        }

        Command::Export { org } => {
            let cfg = config::load_config()?;
            let org = resolve_org(&cfg, org)?;
            let store = open_store(&cfg)?;
            let records = list_all_transactions(&store, &org, &cfg.user.id)?;
            write_csv(&records, io::stdout().lock())?;
        }

        Command::Org { command } => {
            let cfg = config::load_config()?;
            let mut store = open_store(&cfg)?;
            match command {
                OrgCommand::Create { name } => {
                    let clock = SystemClock::from_tz_name(&cfg.clock.timezone)?;
                    let org = store.create_organization(&name, &cfg.user.id, &clock)?;
                    store.save().context("saving ledger")?;
                    println!("Created organization {} ({})", org.name, org.id);
                }
                OrgCommand::AddMember { org, user } => {
                    store.require_member(&org, &cfg.user.id)?;
                    store.add_member(&org, &user)?;
                    store.save().context("saving ledger")?;
                    println!("{} is a member of {}", user, org);
                }
                OrgCommand::List => {
                    let default = cfg.ledger.default_organization.as_deref();
                    for org in store.organizations_for(&cfg.user.id) {
                        let marker = if Some(org.id.as_str()) == default { "*" } else { " " };
                        println!(
                            "{} {:<24} {} ({} members)",
                            marker,
                            org.id,
                            org.name,
                            org.members.len()
                        );
                    }
                }
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn resolve_org(cfg: &Config, org: Option<String>) -> Result<String> {
    org.or_else(|| cfg.ledger.default_organization.clone())
        .ok_or(LedgerError::OrganizationRequired)
        .context("pass --org or run `tally setup`")
}

fn open_store(cfg: &Config) -> Result<LedgerStore> {
    let path = cfg.ledger_path()?;
    tracing::debug!(path = %path.display(), "opening ledger");
    LedgerStore::open(&path).with_context(|| format!("opening ledger {}", path.display()))
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(p) => std::fs::read_to_string(&p).with_context(|| format!("read {}", p.display())),
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s).context("read stdin")?;
            Ok(s)
        }
    }
}

fn print_records(records: &[TransactionRecord]) {
    for r in records {
        println!(
            "{} | {} | {:<7} | {:>10.2} | {} | confidence={:.2}",
            r.id, r.date, r.kind, r.amount, r.description, r.confidence
        );
    }
}
