//! Rollcall Core - the conversational student registry.
//!
//! The core collects one student record per dialogue (name, age, grade),
//! persists completed records through `rollcall-storage`, and supports
//! listing recent entries and exporting the table as CSV. The transport is
//! consumed through the narrow `Channel` trait; a Telegram implementation
//! lives in `channel::telegram`.

pub mod channel;
pub mod dialogue;
pub mod export;
pub mod paths;
pub mod repo;
pub mod runtime;

pub use channel::{Channel, InboundMessage, OutboundMessage, TelegramChannel, TelegramConfig};
pub use dialogue::DialogueMachine;
pub use export::{ExportError, ExportWriter};
pub use repo::{StudentRepository, StudentStore};
pub use runtime::{BotContext, start_message_handler};
