use serde::{Deserialize, Serialize};

use super::Entry;

/// Totals derived from a set of entries. Never stored; recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub balance: f64,
    /// Sum of positive prices
    pub income: f64,
    /// Sum of negative prices (zero or negative)
    pub expense: f64,
    pub entry_count: usize,
}

/// Compute the balance as the plain sum of all entry prices.
pub fn compute_balance(entries: &[Entry]) -> f64 {
    entries.iter().map(|entry| entry.price).sum()
}

/// Compute balance plus income and expense totals in a single pass.
pub fn summarize(entries: &[Entry]) -> LedgerSummary {
    entries.iter().fold(
        LedgerSummary {
            balance: 0.0,
            income: 0.0,
            expense: 0.0,
            entry_count: 0,
        },
        |mut summary, entry| {
            summary.balance += entry.price;
            if entry.is_income() {
                summary.income += entry.price;
            } else if entry.is_expense() {
                summary.expense += entry.price;
            }
            summary.entry_count += 1;
            summary
        },
    )
}
