use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use rollcall_core::paths;

/// Environment variable overriding the configured bot token.
const BOT_TOKEN_ENV: &str = "ROLLCALL_BOT_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BotConfig {
    /// Bot token from @BotFather
    pub bot_token: Option<String>,
    /// Telegram long-polling timeout in seconds
    pub poll_timeout_secs: Option<u32>,
}

impl BotConfig {
    /// Load `~/.rollcall/config.toml`, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("Warning: Failed to parse config: {err}");
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("Warning: Failed to read config: {err}");
                Self::default()
            }
        }
    }

    pub fn config_path() -> PathBuf {
        paths::resolve_rollcall_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("config.toml")
    }

    /// Resolve the bot token: environment variable first, then config file.
    /// Blank values count as absent.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(BOT_TOKEN_ENV)
            .ok()
            .or_else(|| self.bot_token.clone())
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}
