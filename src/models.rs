//! Core data models for the finance assistant

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Goal applied whenever the stored cell is empty or unreadable.
pub const DEFAULT_SPENDING_GOAL: f64 = 1000.00;

//
// ================= Transaction =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Label stored in the ledger's `Tipo` column.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "receita",
            TransactionKind::Expense => "gasto",
        }
    }

    /// Case-insensitive parse of a `Tipo` cell.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "receita" => Some(TransactionKind::Income),
            "gasto" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One ledger row. Immutable once stored; created only via append,
/// never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
}

impl Transaction {
    pub fn income(amount: f64, description: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            amount,
            kind: TransactionKind::Income,
            category: "Receita".to_string(),
            description: description.into(),
        }
    }

    pub fn expense(
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            amount,
            kind: TransactionKind::Expense,
            category: category.into(),
            description: description.into(),
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Calendar-month match against a wall-clock month number (1-12).
    pub fn in_month(&self, month: u32) -> bool {
        self.timestamp.month() == month
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_labels_round_trip() {
        assert_eq!(TransactionKind::from_label("receita"), Some(TransactionKind::Income));
        assert_eq!(TransactionKind::from_label("GASTO"), Some(TransactionKind::Expense));
        assert_eq!(TransactionKind::from_label(" Gasto "), Some(TransactionKind::Expense));
        assert_eq!(TransactionKind::from_label("transferência"), None);
    }

    #[test]
    fn test_month_filter_ignores_year() {
        // Matches the ledger query semantics: month number only.
        let mut tx = Transaction::expense(10.0, "Food", "lunch");
        tx.timestamp = Utc.with_ymd_and_hms(2023, 5, 10, 12, 0, 0).unwrap();
        assert!(tx.in_month(5));
        assert!(!tx.in_month(6));
    }
}
