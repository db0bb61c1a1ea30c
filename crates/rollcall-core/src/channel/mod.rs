//! Transport channel layer: message types, the channel trait, and the
//! Telegram implementation.

pub mod telegram;
pub mod traits;
pub mod types;

pub use telegram::{TelegramChannel, TelegramConfig};
pub use traits::Channel;
pub use types::{InboundMessage, MessageLevel, OutboundMessage};
