use finance_chat_assistant::{
    config::Config,
    gemini::GeminiClient,
    handler::{self, AppState},
    store::SheetsStore,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables. Missing required configuration is a
    // startup failure, never a per-request error.
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    info!("Finance Chat Assistant - Webhook Server");
    info!("Port: {}", config.port);

    // External clients
    let gemini = Arc::new(GeminiClient::new(
        config.gemini_api_key,
        config.gemini_api_url,
    )?);
    let store = Arc::new(SheetsStore::new(
        config.sheets_api_url,
        config.spreadsheet_id,
        config.sheets_access_token,
    )?);

    // The goal is read once at startup and cached behind a lock.
    let initial_goal = handler::load_initial_goal(store.as_ref()).await;
    info!("Spending goal loaded: {:.2}", initial_goal);

    let state = AppState {
        gemini,
        ledger: store.clone(),
        goals: store,
        goal_cache: Arc::new(RwLock::new(initial_goal)),
    };

    handler::start_server(state, config.port).await?;

    Ok(())
}
