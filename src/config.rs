//! Runtime configuration
//!
//! Plain structs populated from environment variables. The CLI binary calls
//! `dotenvy::dotenv()` before building these; library consumers can also
//! construct them directly.

use std::env;

use crate::error::{LibraryError, Result};

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Mail relay settings.
///
/// The relay is an HTTP service accepting (recipient, subject, HTML body)
/// and answering success or failure.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Base URL of the relay, e.g. `https://mail.example.com`
    pub relay_url: String,
    /// Bearer token for the relay
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            relay_url: env_or("MAIL_RELAY_URL", "http://localhost:8025"),
            api_key: env_or("MAIL_RELAY_API_KEY", ""),
            sender_email: env_or("MAIL_SENDER_EMAIL", "library@example.edu"),
            sender_name: env_or("MAIL_SENDER_NAME", "University Library"),
        }
    }
}

/// Text-generation service settings (OpenAI-compatible chat endpoint).
#[derive(Debug, Clone)]
pub struct TextGenConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl TextGenConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_or("TEXTGEN_BASE_URL", "https://api.openai.com/v1"),
            api_key: env_or("TEXTGEN_API_KEY", ""),
            model: env_or("TEXTGEN_MODEL", "gpt-4o-mini"),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the SQLite database file
    pub database_path: String,
    /// Local wall-clock hour (0-23) at which the daily sweep fires
    pub reminder_hour: u32,
    pub mail: MailConfig,
    pub textgen: TextGenConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let reminder_hour = env_or("REMINDER_HOUR", "0").parse::<u32>().map_err(|_| {
            LibraryError::InvalidConfiguration("REMINDER_HOUR must be an integer".to_string())
        })?;
        if reminder_hour > 23 {
            return Err(LibraryError::InvalidConfiguration(format!(
                "REMINDER_HOUR must be 0-23, got {reminder_hour}"
            )));
        }

        Ok(Self {
            database_path: env_or("DATABASE_PATH", "./shelfwise.db"),
            reminder_hour,
            mail: MailConfig::from_env(),
            textgen: TextGenConfig::from_env(),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "./shelfwise.db".to_string(),
            reminder_hour: 0,
            mail: MailConfig {
                relay_url: "http://localhost:8025".to_string(),
                api_key: String::new(),
                sender_email: "library@example.edu".to_string(),
                sender_name: "University Library".to_string(),
            },
            textgen: TextGenConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                api_key: String::new(),
                model: "gpt-4o-mini".to_string(),
            },
        }
    }
}
