//! Telegram Channel Implementation
//!
//! Implements bidirectional communication with Telegram via Bot API.
//! Receives via getUpdates long-polling, sends text and document uploads.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::traits::Channel;
use super::types::{InboundMessage, OutboundMessage};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org/bot";
/// Default timeout for Telegram API calls (seconds)
const API_TIMEOUT_SECS: u64 = 30;

/// Telegram channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    pub bot_token: String,
    /// Polling timeout in seconds (default: 30)
    #[serde(default = "default_polling_timeout")]
    pub polling_timeout: u32,
}

fn default_polling_timeout() -> u32 {
    30
}

impl TelegramConfig {
    /// Create a new config with just the bot token
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            polling_timeout: default_polling_timeout(),
        }
    }

    /// Set polling timeout
    pub fn with_polling_timeout(mut self, timeout: u32) -> Self {
        self.polling_timeout = timeout;
        self
    }
}

/// Telegram channel implementation
pub struct TelegramChannel {
    config: TelegramConfig,
    client: Client,
    /// Whether polling is active
    polling_active: Arc<AtomicBool>,
    /// Last update ID for long-polling
    last_update_id: Arc<AtomicI64>,
}

impl TelegramChannel {
    /// Create a new Telegram channel
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            polling_active: Arc::new(AtomicBool::new(false)),
            last_update_id: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Create with just bot token
    pub fn with_token(bot_token: impl Into<String>) -> Self {
        Self::new(TelegramConfig::new(bot_token))
    }

    /// Stop the polling loop
    pub fn stop_polling(&self) {
        self.polling_active.store(false, Ordering::SeqCst);
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}{}/{}", TELEGRAM_API_BASE, self.config.bot_token, method)
    }

    /// Send message via Telegram API
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = self.api_url("sendMessage");

        let params = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(&url)
            .json(&params)
            .timeout(std::time::Duration::from_secs(API_TIMEOUT_SECS))
            .send()
            .await?;

        if response.status().is_success() {
            let api_response: TelegramResponse<TelegramMessageResponse> = response.json().await?;
            if api_response.ok {
                Ok(())
            } else {
                Err(anyhow!(
                    "Telegram API error: {}",
                    api_response.description.unwrap_or_default()
                ))
            }
        } else {
            let error = response.text().await.unwrap_or_default();
            Err(anyhow!("Telegram HTTP error: {}", error))
        }
    }

    /// Upload a local file via sendDocument
    async fn send_document_upload(
        &self,
        chat_id: &str,
        path: &Path,
        caption: &str,
    ) -> Result<()> {
        let url = self.api_url("sendDocument");

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(std::time::Duration::from_secs(API_TIMEOUT_SECS))
            .send()
            .await?;

        if response.status().is_success() {
            let api_response: TelegramResponse<TelegramMessageResponse> = response.json().await?;
            if api_response.ok {
                Ok(())
            } else {
                Err(anyhow!(
                    "Telegram API error: {}",
                    api_response.description.unwrap_or_default()
                ))
            }
        } else {
            let error = response.text().await.unwrap_or_default();
            Err(anyhow!("Telegram HTTP error: {}", error))
        }
    }

    /// Poll for updates using long-polling
    async fn poll_updates(&self) -> Result<Vec<TelegramUpdate>> {
        let url = self.api_url("getUpdates");

        let offset = self.last_update_id.load(Ordering::SeqCst);
        let params = serde_json::json!({
            "offset": if offset > 0 { offset + 1 } else { 0 },
            "timeout": self.config.polling_timeout,
            "allowed_updates": ["message"],
        });

        let response = self
            .client
            .post(&url)
            .json(&params)
            .timeout(std::time::Duration::from_secs(
                self.config.polling_timeout as u64 + 10,
            ))
            .send()
            .await?;

        let body: TelegramResponse<Vec<TelegramUpdate>> = response.json().await?;

        if !body.ok {
            return Err(anyhow!(
                "Telegram API error: {:?}",
                body.description.unwrap_or_default()
            ));
        }

        let updates = body.result.unwrap_or_default();

        if let Some(last) = updates.last() {
            self.last_update_id.store(last.update_id, Ordering::SeqCst);
        }

        Ok(updates)
    }

    /// Convert Telegram update to InboundMessage (text messages only)
    fn convert_update(update: TelegramUpdate) -> Option<InboundMessage> {
        let message = update.message?;
        let from = message.from?;
        let text = message.text?;

        let sender_name = from
            .username
            .clone()
            .or(from.first_name.clone())
            .unwrap_or_default();

        let inbound = InboundMessage::new(
            format!("tg_{}", message.message_id),
            from.id.to_string(),
            message.chat.id.to_string(),
            text,
        );

        if sender_name.is_empty() {
            Some(inbound)
        } else {
            Some(inbound.with_sender_name(sender_name))
        }
    }

    /// Test the connection by calling getMe
    pub async fn test_connection(&self) -> Result<TelegramUser> {
        let url = self.api_url("getMe");
        let response = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(API_TIMEOUT_SECS))
            .send()
            .await?;

        let body: TelegramResponse<TelegramUser> = response.json().await?;

        if body.ok {
            body.result
                .ok_or_else(|| anyhow!("Telegram returned ok but no result"))
        } else {
            Err(anyhow!(
                "Telegram API error: {}",
                body.description.unwrap_or_default()
            ))
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn is_configured(&self) -> bool {
        !self.config.bot_token.is_empty()
    }

    async fn send(&self, message: OutboundMessage) -> Result<()> {
        let formatted = message.formatted_content();
        self.send_message(&message.conversation_id, &formatted).await
    }

    async fn send_document(
        &self,
        conversation_id: &str,
        path: &Path,
        caption: &str,
    ) -> Result<()> {
        self.send_document_upload(conversation_id, path, caption)
            .await
    }

    fn start_receiving(&self) -> Option<Pin<Box<dyn Stream<Item = InboundMessage> + Send>>> {
        if !self.is_configured() {
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let polling_active = self.polling_active.clone();
        let last_update_id = self.last_update_id.clone();
        let config = self.config.clone();
        let client = self.client.clone();

        // Spawn polling task
        tokio::spawn(async move {
            polling_active.store(true, Ordering::SeqCst);
            info!("Starting Telegram polling");

            let channel = TelegramChannel {
                config,
                client,
                polling_active: polling_active.clone(),
                last_update_id,
            };

            while polling_active.load(Ordering::SeqCst) {
                match channel.poll_updates().await {
                    Ok(updates) => {
                        for update in updates {
                            if let Some(message) = Self::convert_update(update) {
                                debug!(
                                    "Received Telegram message: {} from {}",
                                    message.id, message.sender_id
                                );
                                if tx.send(message).is_err() {
                                    warn!("Message receiver dropped, stopping polling");
                                    polling_active.store(false, Ordering::SeqCst);
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        error!("Telegram polling error: {}", e);
                        // Back off on error
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    }
                }
            }

            info!("Telegram polling stopped");
        });

        Some(Box::pin(
            tokio_stream::wrappers::UnboundedReceiverStream::new(rx),
        ))
    }
}

// ============================================================================
// Telegram API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
    from: Option<TelegramUser>,
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TelegramMessageResponse {
    #[allow(dead_code)]
    message_id: i64,
}
