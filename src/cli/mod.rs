use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};

use crate::api;
use crate::application::LedgerService;
use crate::domain::{Entry, compute_balance, format_rupiah, parse_timestamp};

/// Saku - a tiny personal finance ledger
#[derive(Parser)]
#[command(name = "saku")]
#[command(about = "Record income and expenses in shorthand and keep a running balance")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SAKU_DATABASE", default_value = "saku.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record an entry from shorthand text, e.g. "+Rp 60.000 PC Gaming"
    Add {
        /// Signed amount followed by a label: "-Rp 15.500 Lunch"
        #[arg(allow_hyphen_values = true)]
        shorthand: String,

        /// When it happened (RFC 3339, YYYY-MM-DDTHH:MM or YYYY-MM-DD; defaults to now)
        #[arg(long)]
        date: Option<String>,

        /// Free-text description
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// List all entries, most recent first, under the current balance
    List,

    /// Show balance with income and expense totals
    Balance,

    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, env = "SAKU_HOST", default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 4060)]
        port: u16,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                let service = LedgerService::init(&self.database).await?;
                service.close().await;
                println!("Database initialized: {}", self.database);
            }

            Commands::Add {
                shorthand,
                date,
                description,
            } => {
                let service = LedgerService::init(&self.database).await?;

                let datetime = match date {
                    Some(date_str) => parse_timestamp(&date_str).with_context(|| {
                        format!(
                            "Invalid date '{}'. Use YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339",
                            date_str
                        )
                    })?,
                    None => Utc::now(),
                };

                let result = service
                    .record_shorthand(&shorthand, datetime, description)
                    .await;
                service.close().await;
                let entry = result?;

                println!(
                    "Recorded: {} {} ({})",
                    format_signed(entry.price),
                    entry.name,
                    entry.id
                );
            }

            Commands::List => {
                let service = LedgerService::init(&self.database).await?;
                let result = run_list_command(&service).await;
                service.close().await;
                result?;
            }

            Commands::Balance => {
                let service = LedgerService::init(&self.database).await?;
                let result = run_balance_command(&service).await;
                service.close().await;
                result?;
            }

            Commands::Serve { host, port } => {
                let service = LedgerService::init(&self.database).await?;
                api::serve(Arc::new(service), SocketAddr::new(host, port)).await?;
            }
        }

        Ok(())
    }
}

async fn run_list_command(service: &LedgerService) -> Result<()> {
    let entries = service.list_entries().await?;
    let balance = compute_balance(&entries);

    println!("{}", format_rupiah(balance));
    println!();

    if entries.is_empty() {
        println!("No entries yet.");
        return Ok(());
    }

    println!(
        "{:<20} {:>16} {:<24} DESCRIPTION",
        "DATE", "AMOUNT", "NAME"
    );
    println!("{}", "-".repeat(76));
    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

async fn run_balance_command(service: &LedgerService) -> Result<()> {
    let summary = service.summary().await?;

    println!("Balance: {}", format_rupiah(summary.balance));
    println!("Income:  {}", format_rupiah(summary.income));
    println!("Expense: {}", format_rupiah(summary.expense));
    println!("Entries: {}", summary.entry_count);
    Ok(())
}

fn print_entry(entry: &Entry) {
    println!(
        "{:<20} {:>16} {:<24} {}",
        format_local(&entry.datetime),
        format_signed(entry.price),
        truncate(&entry.name, 24),
        truncate(&entry.description, 30)
    );
}

/// Amount with an explicit sign: "+Rp 60.000" or "-Rp 15.500".
fn format_signed(price: f64) -> String {
    let sign = if price < 0.0 { "-" } else { "+" };
    format!("{}{}", sign, format_rupiah(price.abs()))
}

fn format_local(datetime: &DateTime<Utc>) -> String {
    datetime
        .with_timezone(&Local)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
