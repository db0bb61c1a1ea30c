//! Channel Message Types
//!
//! Core types for the transport-agnostic messaging layer.

use serde::{Deserialize, Serialize};

/// Message level for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl MessageLevel {
    /// Get emoji representation for the message level
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Info => "ℹ️",
            Self::Success => "✅",
            Self::Warning => "⚠️",
            Self::Error => "❌",
        }
    }
}

/// Inbound message from the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Unique message ID
    pub id: String,
    /// Sender identifier (user ID in the channel)
    pub sender_id: String,
    /// Sender display name (if available)
    pub sender_name: Option<String>,
    /// Conversation identifier (chat id)
    pub conversation_id: String,
    /// Message content
    pub content: String,
    /// Timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

impl InboundMessage {
    /// Create a new inbound message
    pub fn new(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        conversation_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender_id: sender_id.into(),
            sender_name: None,
            conversation_id: conversation_id.into(),
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Set sender name
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }
}

/// Outbound message to the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Conversation identifier
    pub conversation_id: String,
    /// Message content (plain text)
    pub content: String,
    /// Message level for formatting
    pub level: MessageLevel,
}

impl OutboundMessage {
    /// Create a new outbound message
    pub fn new(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            content: content.into(),
            level: MessageLevel::Info,
        }
    }

    /// Set message level
    pub fn with_level(mut self, level: MessageLevel) -> Self {
        self.level = level;
        self
    }

    /// Create a success message
    pub fn success(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(conversation_id, content).with_level(MessageLevel::Success)
    }

    /// Create an error message
    pub fn error(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(conversation_id, content).with_level(MessageLevel::Error)
    }

    /// Create a warning message
    pub fn warning(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(conversation_id, content).with_level(MessageLevel::Warning)
    }

    /// Format the message with emoji prefix based on level
    pub fn formatted_content(&self) -> String {
        match self.level {
            MessageLevel::Info => self.content.clone(),
            level => format!("{} {}", level.emoji(), self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_level_emoji() {
        assert_eq!(MessageLevel::Success.emoji(), "✅");
        assert_eq!(MessageLevel::Warning.emoji(), "⚠️");
        assert_eq!(MessageLevel::Error.emoji(), "❌");
    }

    #[test]
    fn test_info_messages_are_not_prefixed() {
        let msg = OutboundMessage::new("123", "What is your name?");
        assert_eq!(msg.formatted_content(), "What is your name?");
    }

    #[test]
    fn test_outbound_message_formatting() {
        let msg = OutboundMessage::success("123", "Saved!");
        let formatted = msg.formatted_content();
        assert!(formatted.contains("✅"));
        assert!(formatted.contains("Saved!"));
    }

    #[test]
    fn test_inbound_message_builder() {
        let msg = InboundMessage::new("msg-1", "user-123", "chat-456", "Hello").with_sender_name("Ann");

        assert_eq!(msg.id, "msg-1");
        assert_eq!(msg.sender_id, "user-123");
        assert_eq!(msg.conversation_id, "chat-456");
        assert_eq!(msg.sender_name, Some("Ann".to_string()));
    }
}
