//! Finance Chat Assistant
//!
//! A message-driven personal finance assistant that:
//! - Receives inbound chat messages via a Twilio-style webhook
//! - Interprets user intent through the Gemini API
//! - Persists and queries transactions in a Google-Sheets-backed ledger
//! - Enforces a closed action vocabulary before any financial mutation
//! - Replies with formatted text (currency totals, goal comparisons)
//!
//! PIPELINE:
//! MESSAGE → CONTEXT → MODEL → ROUTE → STORE → FORMAT → REPLY

pub mod config;
pub mod error;
pub mod formatter;
pub mod gemini;
pub mod handler;
pub mod http;
pub mod models;
pub mod router;
pub mod store;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use router::{route, Intent};
