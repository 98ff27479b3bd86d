use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Entry, ValidEntry};

use super::MIGRATION_001_ENTRIES;

/// How long a writer waits for a competing writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Repository for persisting and querying ledger entries.
///
/// Holds a connection pool; each operation acquires a connection for its own
/// duration and returns it to the pool when the call completes or fails.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run more than once.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_ENTRIES)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Persist a validated entry under a freshly assigned id.
    pub async fn append_entry(&self, entry: ValidEntry) -> Result<Entry> {
        let entry = entry.into_entry(Uuid::new_v4());

        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO entries (id, name, description, datetime, price)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.name)
        .bind(&entry.description)
        .bind(format_datetime(&entry.datetime))
        .bind(entry.price)
        .execute(&mut *tx)
        .await
        .context("Failed to save entry")?;

        tx.commit().await.context("Failed to commit entry")?;

        tracing::debug!(id = %entry.id, price = entry.price, "entry stored");
        Ok(entry)
    }

    /// List all entries, most recent first. Entries sharing a datetime keep
    /// their insertion order.
    pub async fn list_entries(&self) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, datetime, price
            FROM entries
            ORDER BY datetime DESC, sequence ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<Entry> {
        let id_str: String = row.get("id");
        let datetime_str: String = row.get("datetime");

        Ok(Entry {
            id: Uuid::parse_str(&id_str).context("Invalid entry ID")?,
            name: row.get("name"),
            description: row.get("description"),
            datetime: DateTime::parse_from_rfc3339(&datetime_str)
                .context("Invalid entry datetime")?
                .with_timezone(&Utc),
            price: row.get("price"),
        })
    }
}

/// Fixed-width UTC representation so that text ordering matches time ordering.
fn format_datetime(datetime: &DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Micros, true)
}
