//! Runtime wiring: the inbound event loop and command handling.

pub mod commands;
pub mod handler;

use std::sync::Arc;

use crate::dialogue::DialogueMachine;
use crate::export::ExportWriter;
use crate::repo::StudentStore;

pub use handler::start_message_handler;

/// Shared application state handed to every message handler.
pub struct BotContext {
    pub machine: DialogueMachine,
    pub repo: Arc<dyn StudentStore>,
    pub exporter: ExportWriter,
}

impl BotContext {
    pub fn new(repo: Arc<dyn StudentStore>, exporter: ExportWriter) -> Arc<Self> {
        Arc::new(Self {
            machine: DialogueMachine::new(repo.clone()),
            repo,
            exporter,
        })
    }
}
