//! Channel Trait Definition
//!
//! Defines the narrow interface the core uses to talk to a remote client.

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use std::path::Path;
use std::pin::Pin;

use super::types::{InboundMessage, OutboundMessage};

/// Transport channel trait
///
/// The conversational core only ever sees this interface: an inbound stream
/// of messages and the ability to send text or a file back to a conversation.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Check if the channel is properly configured
    fn is_configured(&self) -> bool;

    /// Send a message to the channel
    async fn send(&self, message: OutboundMessage) -> Result<()>;

    /// Send a simple text message
    async fn send_text(&self, conversation_id: &str, text: &str) -> Result<()> {
        self.send(OutboundMessage::new(conversation_id, text)).await
    }

    /// Send a local file to a conversation with a caption
    async fn send_document(&self, conversation_id: &str, path: &Path, caption: &str)
    -> Result<()>;

    /// Start receiving messages (returns None if the channel cannot receive)
    ///
    /// The returned stream should be consumed from a background task.
    /// Messages are yielded as they arrive from the transport.
    fn start_receiving(&self) -> Option<Pin<Box<dyn Stream<Item = InboundMessage> + Send>>>;
}
