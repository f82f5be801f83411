//! Intent router
//!
//! Classifies the model's free-text reply into a closed set of actions by
//! case-insensitive substring matching against a fixed marker table,
//! evaluated in priority order (first match wins). Financial mutations
//! never ride on unstructured model output alone: matched branches still
//! run a strict payload sub-parse before anything touches the store.

use chrono::{Datelike, Utc};

use crate::error::AssistantError;
use crate::Result;

/// One routed action with its extracted parameters. Produced per inbound
/// message, consumed immediately, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    RegisterIncome { amount: f64, description: String },
    QueryTotalExpenses,
    QueryMonthExpenses { month: u32 },
    QueryTopCategory,
    ListAllPurchases,
    SetSpendingGoal { amount: f64 },
    /// No marker matched; the raw model text becomes the reply.
    Passthrough(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    RegisterIncome,
    QueryTotalExpenses,
    QueryMonthExpenses,
    QueryTopCategory,
    ListAllPurchases,
    SetSpendingGoal,
}

/// Marker table, in priority order. An explicit table keeps the order
/// auditable and testable away from any network call.
const MARKERS: &[(&str, Action)] = &[
    ("registrar receita", Action::RegisterIncome),
    ("consultar valor total de gastos", Action::QueryTotalExpenses),
    ("consultar gastos do mês", Action::QueryMonthExpenses),
    ("consultar categoria com mais gastos", Action::QueryTopCategory),
    ("listar todas as compras", Action::ListAllPurchases),
    ("definir meta de gastos", Action::SetSpendingGoal),
];

const INCOME_MARKER: &str = "registrar receita";
const GOAL_MARKER: &str = "definir meta de gastos";

/// Route a model reply, resolving "this month" against the wall clock.
pub fn route(reply: &str) -> Result<Intent> {
    route_at(reply, Utc::now().month())
}

/// Route a model reply with an explicit current month (1-12).
pub fn route_at(reply: &str, current_month: u32) -> Result<Intent> {
    let lowered = reply.to_lowercase();

    let matched = MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker));

    let Some((_, action)) = matched else {
        return Ok(Intent::Passthrough(reply.to_string()));
    };

    match action {
        Action::RegisterIncome => parse_income(reply),
        Action::QueryTotalExpenses => Ok(Intent::QueryTotalExpenses),
        Action::QueryMonthExpenses => Ok(Intent::QueryMonthExpenses {
            month: current_month,
        }),
        Action::QueryTopCategory => Ok(Intent::QueryTopCategory),
        Action::ListAllPurchases => Ok(Intent::ListAllPurchases),
        Action::SetSpendingGoal => parse_goal(reply),
    }
}

/// Byte offset just past the first case-insensitive occurrence of an
/// ASCII marker. Matched bytes are ASCII, so the offset is always a
/// char boundary of the original reply.
fn find_ascii_marker_end(reply: &str, marker: &str) -> Option<usize> {
    let marker = marker.as_bytes();
    reply
        .as_bytes()
        .windows(marker.len())
        .position(|window| window.eq_ignore_ascii_case(marker))
        .map(|pos| pos + marker.len())
}

/// Income payload: `<amount> | <description>` after the marker. Both
/// halves come from one split of the text following the marker, so a
/// stray pipe earlier in the reply cannot skew the stored description.
fn parse_income(reply: &str) -> Result<Intent> {
    let after_marker = find_ascii_marker_end(reply, INCOME_MARKER)
        .map(|end| &reply[end..])
        .unwrap_or(reply);

    let Some((amount_text, description)) = after_marker.split_once('|') else {
        return Err(AssistantError::MalformedIncomePayload);
    };

    let amount = amount_text
        .trim()
        .parse::<f64>()
        .map_err(|_| AssistantError::MalformedIncomePayload)?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(AssistantError::MalformedIncomePayload);
    }

    let description = description.trim();
    if description.is_empty() {
        return Err(AssistantError::MalformedIncomePayload);
    }

    Ok(Intent::RegisterIncome {
        amount,
        description: description.to_string(),
    })
}

/// Goal payload: a decimal following the marker text.
fn parse_goal(reply: &str) -> Result<Intent> {
    let after_marker = find_ascii_marker_end(reply, GOAL_MARKER)
        .map(|end| &reply[end..])
        .unwrap_or(reply);

    let amount = after_marker
        .trim()
        .parse::<f64>()
        .map_err(|_| AssistantError::MalformedGoalPayload)?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(AssistantError::MalformedGoalPayload);
    }

    Ok(Intent::SetSpendingGoal { amount })
}
