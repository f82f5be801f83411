//! Gemini API client
//!
//! Turns an inbound chat message (plus the assistant context prompt) into
//! a free-text model reply that the router then classifies.
//! Uses a long-lived reqwest::Client for connection pooling.

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use reqwest::Client;

use crate::error::AssistantError;
use crate::http;

/// Fixed reply used whenever the model call fails terminally. Raw errors
/// never reach the user.
pub const FALLBACK_REPLY: &str = "Desculpe, ocorreu um erro ao processar sua mensagem.";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String) -> crate::Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AssistantError::ConfigError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        Ok(Self {
            client: http::build_client()?,
            api_key,
            base_url,
        })
    }

    /// Generate a reply for a message, with the assistant context prepended.
    pub async fn generate(&self, context: &str, message: &str) -> crate::Result<String> {
        let url = format!("{}?key={}", self.base_url, self.api_key);

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{}\n\n{}", context, message),
                }],
            }],
        };

        info!("Calling Gemini API");

        let response = http::send_with_retry(self.client.post(&url).json(&request))
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                AssistantError::LlmError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response ({}): {}", status, error_text);
            return Err(AssistantError::LlmError(format!(
                "Gemini API returned {}",
                status
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            AssistantError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        let reply = gemini_response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| AssistantError::LlmError("Empty response from Gemini".to_string()))?;

        info!("Gemini reply received ({} chars)", reply.len());

        Ok(reply)
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
