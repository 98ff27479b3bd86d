use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::{Entry, LedgerSummary, NewEntry, parse_shorthand, summarize};
use crate::storage::Repository;

use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, HTTP API, tests).
#[derive(Clone)]
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Release all database connections.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    /// Validate and store a new entry.
    /// Nothing is written when validation fails.
    pub async fn append_entry(&self, input: NewEntry) -> Result<Entry, AppError> {
        let valid = input.validate().inspect_err(|err| {
            tracing::warn!(field = err.field(), "rejected entry: {}", err);
        })?;

        let entry = self.repo.append_entry(valid).await.inspect_err(|err| {
            tracing::error!("failed to store entry: {:#}", err);
        })?;

        tracing::info!(id = %entry.id, name = %entry.name, price = entry.price, "entry recorded");
        Ok(entry)
    }

    /// Parse shorthand text like `-Rp 15.500 Lunch` and store the result.
    pub async fn record_shorthand(
        &self,
        raw: &str,
        datetime: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<Entry, AppError> {
        let parsed = parse_shorthand(raw)?;

        let mut input = NewEntry::new(
            parsed.name,
            datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            parsed.price,
        );
        if let Some(desc) = description {
            input = input.with_description(desc);
        }

        self.append_entry(input).await
    }

    /// List all entries, most recent first.
    pub async fn list_entries(&self) -> Result<Vec<Entry>, AppError> {
        Ok(self.repo.list_entries().await.inspect_err(|err| {
            tracing::error!("failed to list entries: {:#}", err);
        })?)
    }

    /// Derive the balance and totals from the full entry set.
    pub async fn summary(&self) -> Result<LedgerSummary, AppError> {
        let entries = self.list_entries().await?;
        Ok(summarize(&entries))
    }
}
