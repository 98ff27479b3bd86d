// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use saku::application::LedgerService;
use saku::domain::{Entry, NewEntry};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Record a structured entry with no description
pub async fn record(
    service: &LedgerService,
    name: &str,
    datetime: &str,
    price: i64,
) -> Result<Entry> {
    Ok(service
        .append_entry(NewEntry::new(name, datetime, price))
        .await?)
}
