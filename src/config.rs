//! Environment-driven configuration
//!
//! All credentials and service identities come from the process environment
//! (loaded via dotenv in main). A missing required value is a startup
//! failure, never a per-request error.

use crate::error::AssistantError;
use crate::Result;

pub const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub spreadsheet_id: String,
    pub sheets_access_token: String,
    pub sheets_api_url: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                AssistantError::ConfigError(format!("PORT is not a valid port number: {}", raw))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_api_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string()),
            spreadsheet_id: require("SPREADSHEET_ID")?,
            sheets_access_token: require("SHEETS_ACCESS_TOKEN")?,
            sheets_api_url: std::env::var("SHEETS_API_URL")
                .unwrap_or_else(|_| DEFAULT_SHEETS_API_URL.to_string()),
            port,
        })
    }
}

fn require(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AssistantError::ConfigError(format!(
            "{} not set in environment",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_missing_var_is_config_error() {
        let err = require("FINANCE_ASSISTANT_DOES_NOT_EXIST").unwrap_err();
        assert!(matches!(err, AssistantError::ConfigError(_)));
        assert!(err.to_string().contains("FINANCE_ASSISTANT_DOES_NOT_EXIST"));
    }
}
