use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Values that must never reach production as credentials.
const PLACEHOLDER_TOKENS: &[&str] = &["", "changeme", "change-me", "dev-secret-change-me", "token", "secret"];

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub admin_token: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub api_base: String,
    pub pin_emoji: String,
    pub bot_name: String,
    pub webhook_name: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bot_token = lookup("PINMIRROR_BOT_TOKEN").context("PINMIRROR_BOT_TOKEN is not set")?;
        let admin_token = lookup("PINMIRROR_ADMIN_TOKEN").context("PINMIRROR_ADMIN_TOKEN is not set")?;
        for (key, value) in [("PINMIRROR_BOT_TOKEN", &bot_token), ("PINMIRROR_ADMIN_TOKEN", &admin_token)] {
            if PLACEHOLDER_TOKENS.contains(&value.trim().to_ascii_lowercase().as_str()) {
                bail!("{} is empty or a placeholder", key);
            }
        }

        let port = var("PINMIRROR_PORT", "3000")
            .parse()
            .context("PINMIRROR_PORT must be a port number")?;
        let timeout_secs: u64 = var("PINMIRROR_HTTP_TIMEOUT_SECS", "10")
            .parse()
            .context("PINMIRROR_HTTP_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            bot_token,
            admin_token,
            db_path: PathBuf::from(var("PINMIRROR_DB_PATH", "pinmirror.db")),
            host: var("PINMIRROR_HOST", "0.0.0.0"),
            port,
            api_base: var("PINMIRROR_API_BASE", "https://discord.com/api/v10"),
            pin_emoji: var("PINMIRROR_PIN_EMOJI", "📌"),
            bot_name: var("PINMIRROR_BOT_NAME", "PinMirror"),
            webhook_name: var("PINMIRROR_WEBHOOK_NAME", "PinMirror (Webhook)"),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
