//! Webhook orchestrator
//!
//! Receives Twilio-style form POSTs, assembles the model context, routes
//! the model reply into an action, performs the store operation and
//! answers with a TwiML text envelope. Every failure path still returns
//! HTTP 200 with a formatted reply; errors never surface as status codes.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::formatter;
use crate::gemini::{self, GeminiClient};
use crate::models::{Transaction, DEFAULT_SPENDING_GOAL};
use crate::router::{self, Intent};
use crate::store::{GoalStore, LedgerStore};
use crate::Result;

/// Reply for an inbound request with no message text.
pub const EMPTY_MESSAGE_PROMPT: &str = "Envie uma mensagem para interagir com o assistente.";

/// =============================
/// Shared State
/// =============================

#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<GeminiClient>,
    pub ledger: Arc<dyn LedgerStore>,
    pub goals: Arc<dyn GoalStore>,
    /// Spending goal cache. Single process-wide value; the lock keeps
    /// concurrent set-goal and read-goal requests ordered.
    pub goal_cache: Arc<RwLock<f64>>,
}

/// Read the persisted goal once at startup, defaulting when the cell is
/// empty or unreadable.
pub async fn load_initial_goal(goals: &dyn GoalStore) -> f64 {
    match goals.read_goal().await {
        Ok(Some(value)) => value,
        Ok(None) => DEFAULT_SPENDING_GOAL,
        Err(e) => {
            error!("Failed to read spending goal, using default: {}", e);
            DEFAULT_SPENDING_GOAL
        }
    }
}

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
}

/// =============================
/// Helpers
/// =============================

fn stable_uuid_from_string(input: &str) -> uuid::Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    uuid::Uuid::from_bytes(bytes)
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Wrap a reply in the messaging gateway's TwiML envelope.
fn twiml(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        xml_escape(text)
    )
}

/// =============================
/// Context Prompt
/// =============================

/// Context sent ahead of every user message. The feature list teaches the
/// model the marker phrases the router recognizes.
fn build_context(goal: f64) -> String {
    format!(
        "Você é um assistente financeiro que ajuda os usuários a gerenciar suas finanças.\n\
         Aqui estão as funcionalidades disponíveis:\n\
         - Registrar uma receita (ex: 'receita 2000 salário')\n\
         - Consultar valor total de gastos (ex: 'qual é o valor total de gasto?')\n\
         - Consultar gastos do mês (ex: 'qual é o valor total desse mês?')\n\
         - Consultar categoria com mais gastos (ex: 'qual categoria teve mais gastos?')\n\
         - Listar todas as compras (ex: 'listar todas as compras')\n\
         - Definir meta de gastos (ex: 'definir meta de gastos 1000')\n\n\
         Meta atual de gastos: {}",
        formatter::brl(goal)
    )
}

/// =============================
/// Pipeline
/// =============================

/// Full per-message pipeline: context → model → route → store → format.
/// Always resolves to reply text, never to an error.
pub async fn process_message(state: &AppState, message: &str) -> String {
    let goal = *state.goal_cache.read().await;
    let context = build_context(goal);

    let model_reply = match state.gemini.generate(&context, message).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Model call failed: {}", e);
            return gemini::FALLBACK_REPLY.to_string();
        }
    };

    match router::route(&model_reply) {
        Ok(intent) => match dispatch(state, intent).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Action failed: {}", e);
                format!("Erro ao processar a mensagem: {}", e)
            }
        },
        Err(e) if e.is_malformed_payload() => {
            warn!("Malformed action payload in model reply");
            e.to_string()
        }
        Err(e) => format!("Erro ao processar a mensagem: {}", e),
    }
}

/// Execute a routed intent against the stores and format the reply.
pub async fn dispatch(state: &AppState, intent: Intent) -> Result<String> {
    match intent {
        Intent::RegisterIncome {
            amount,
            description,
        } => {
            let tx = Transaction::income(amount, description);
            state.ledger.append(&tx).await?;
            info!("Registered income of {}", formatter::brl(amount));
            Ok(formatter::income_registered(amount))
        }

        Intent::QueryTotalExpenses => {
            let records = state.ledger.all().await?;
            let goal = *state.goal_cache.read().await;
            Ok(formatter::total_expenses(&records, goal))
        }

        Intent::QueryMonthExpenses { month } => {
            let records = state.ledger.all().await?;
            Ok(formatter::month_expenses(&records, month))
        }

        Intent::QueryTopCategory => {
            let records = state.ledger.all().await?;
            Ok(formatter::top_category(&records))
        }

        Intent::ListAllPurchases => {
            let records = state.ledger.all().await?;
            Ok(formatter::list_purchases(&records))
        }

        Intent::SetSpendingGoal { amount } => {
            // The guard stays held across the persist so concurrent
            // set-goal requests cannot interleave the cache update and
            // the store write and leave the two values diverged.
            let mut goal = state.goal_cache.write().await;
            *goal = amount;
            // A failed persist is loud even though the reply confirms.
            if let Err(e) = state.goals.write_goal(amount).await {
                error!("Failed to persist spending goal {}: {}", amount, e);
            }
            drop(goal);
            info!("Spending goal set to {}", formatter::brl(amount));
            Ok(formatter::goal_set(amount))
        }

        Intent::Passthrough(text) => Ok(text),
    }
}

/// =============================
/// Endpoints
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn webhook(State(state): State<AppState>, Form(form): Form<WebhookForm>) -> Response {
    let sender = form
        .from
        .as_deref()
        .map(stable_uuid_from_string)
        .unwrap_or_else(uuid::Uuid::nil);
    info!("Inbound message from sender {}", sender);

    let reply = match form.body.as_deref().filter(|b| !b.trim().is_empty()) {
        Some(body) => process_message(&state, body).await,
        None => EMPTY_MESSAGE_PROMPT.to_string(),
    };

    ([(header::CONTENT_TYPE, "text/xml")], twiml(&reply)).into_response()
}

/// =============================
/// Router / Server Startup
/// =============================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(
    state: AppState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Webhook server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
