//! Persistence layer for the ledger and the spending goal
//!
//! The ledger is append-only: rows are created once and never updated or
//! deleted. The goal is a single mutable cell. Both live in Google Sheets
//! in production; the in-memory store backs tests and local runs.

mod sheets;

pub use sheets::SheetsStore;

use crate::models::Transaction;
use crate::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Append-only and query access to the transaction ledger.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append(&self, tx: &Transaction) -> Result<()>;
    /// All records, in store order. Filtering by kind or month is the
    /// caller's job, never the store's.
    async fn all(&self) -> Result<Vec<Transaction>>;
}

/// Single-cell read/write of the spending goal.
#[async_trait::async_trait]
pub trait GoalStore: Send + Sync {
    /// Ok(None) when the cell is empty or not a number.
    async fn read_goal(&self) -> Result<Option<f64>>;
    async fn write_goal(&self, value: f64) -> Result<()>;
}

/// In-memory store for tests and local development
pub struct InMemoryStore {
    transactions: Arc<RwLock<Vec<Transaction>>>,
    goal: Arc<RwLock<Option<f64>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            transactions: Arc::new(RwLock::new(Vec::new())),
            goal: Arc::new(RwLock::new(None)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryStore {
    async fn append(&self, tx: &Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.push(tx.clone());
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.clone())
    }
}

#[async_trait::async_trait]
impl GoalStore for InMemoryStore {
    async fn read_goal(&self) -> Result<Option<f64>> {
        let goal = self.goal.read().await;
        Ok(*goal)
    }

    async fn write_goal(&self, value: f64) -> Result<()> {
        let mut goal = self.goal.write().await;
        *goal = Some(value);
        Ok(())
    }
}
