//! Bot Command Handler
//!
//! Handles command messages (/start, /cancel, /students, /export_csv, /help)
//! and routes free text into the dialogue machine.

use anyhow::Result;
use tracing::{debug, error};

use crate::channel::{Channel, InboundMessage, OutboundMessage};
use crate::repo::StudentStore;

use super::BotContext;

/// How many records /students shows.
const RECENT_LIMIT: usize = 10;

/// Handle command messages
///
/// Parses the command and executes the appropriate action.
pub async fn handle_command(
    channel: &dyn Channel,
    ctx: &BotContext,
    message: &InboundMessage,
) -> Result<()> {
    let parts: Vec<&str> = message.content.split_whitespace().collect();
    let command = parts.first().map(|s| s.to_lowercase()).unwrap_or_default();

    debug!("Handling command: {} from {}", command, message.sender_id);

    match command.as_str() {
        "/start" => ctx.machine.on_start(channel, message).await,
        "/cancel" => ctx.machine.on_cancel(channel, message).await,
        "/help" => cmd_help(channel, message).await,
        "/students" => cmd_list_students(channel, ctx, message).await,
        "/export_csv" => cmd_export_csv(channel, ctx, message).await,
        _ => cmd_unknown(channel, message, &command).await,
    }
}

/// Handle a non-command text message
///
/// Feeds the text into the sender's dialogue; if the sender has no active
/// dialogue, answers with a short hint instead.
pub async fn handle_text(
    channel: &dyn Channel,
    ctx: &BotContext,
    message: &InboundMessage,
) -> Result<()> {
    if ctx.machine.on_text(channel, message).await? {
        return Ok(());
    }

    debug!("Text without active dialogue from {}", message.sender_id);
    channel
        .send_text(
            &message.conversation_id,
            "Hi! Use /start to register a student, or /help for all commands.",
        )
        .await
}

/// Send help message
async fn cmd_help(channel: &dyn Channel, message: &InboundMessage) -> Result<()> {
    let text = "Available commands:\n\
        /start - begin registering a student\n\
        /cancel - cancel the current registration\n\
        /students - show recent entries\n\
        /export_csv - export all students as CSV";

    channel.send_text(&message.conversation_id, text).await
}

/// List the most recent student records
async fn cmd_list_students(
    channel: &dyn Channel,
    ctx: &BotContext,
    message: &InboundMessage,
) -> Result<()> {
    let students = ctx.repo.list_recent(RECENT_LIMIT).await?;

    if students.is_empty() {
        return channel
            .send_text(
                &message.conversation_id,
                "The list is empty. There are no records in the students table yet.",
            )
            .await;
    }

    let mut lines = vec![format!("Recent entries (up to {RECENT_LIMIT}):")];
    for student in &students {
        lines.push(format!(
            "• #{}: {}, age {}, grade {}",
            student.id, student.name, student.age, student.grade
        ));
    }

    channel
        .send_text(&message.conversation_id, &lines.join("\n"))
        .await
}

/// Export all students to CSV and send the file back
async fn cmd_export_csv(
    channel: &dyn Channel,
    ctx: &BotContext,
    message: &InboundMessage,
) -> Result<()> {
    match ctx.exporter.export().await {
        Ok(path) => {
            channel
                .send_document(&message.conversation_id, &path, "Student export (CSV).")
                .await
        }
        Err(e) => {
            error!("CSV export failed: {}", e);
            channel
                .send(OutboundMessage::error(
                    &message.conversation_id,
                    "Failed to create the CSV export. Please try again later.",
                ))
                .await
        }
    }
}

/// Handle unknown command
async fn cmd_unknown(channel: &dyn Channel, message: &InboundMessage, command: &str) -> Result<()> {
    channel
        .send(
            OutboundMessage::warning(
                &message.conversation_id,
                format!("Unknown command: {command}\n\nUse /help for available commands."),
            ),
        )
        .await
}
