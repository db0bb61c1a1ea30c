mod cli;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::BotConfig;
use rollcall_core::channel::{TelegramChannel, TelegramConfig};
use rollcall_core::{
    BotContext, ExportWriter, StudentRepository, StudentStore, paths, start_message_handler,
};
use rollcall_storage::Storage;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let db_path = match &cli.db_path {
        Some(path) => PathBuf::from(path),
        None => paths::ensure_database_path()?,
    };
    let storage = Storage::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    let repo = Arc::new(StudentRepository::new(storage.students.clone()));
    let exporter = ExportWriter::new(repo.clone(), paths::exports_dir()?);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(repo, exporter).await,
        Commands::Students { limit } => print_students(repo.as_ref(), limit).await,
        Commands::Export => {
            let path = exporter.export().await?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

async fn run_bot(repo: Arc<StudentRepository>, exporter: ExportWriter) -> Result<()> {
    let config = BotConfig::load();
    let Some(token) = config.resolve_token() else {
        bail!(
            "No bot token configured. Set ROLLCALL_BOT_TOKEN or add bot_token to {}",
            BotConfig::config_path().display()
        );
    };

    let mut telegram_config = TelegramConfig::new(token);
    if let Some(timeout) = config.poll_timeout_secs {
        telegram_config = telegram_config.with_polling_timeout(timeout);
    }
    let channel = Arc::new(TelegramChannel::new(telegram_config));

    let me = channel
        .test_connection()
        .await
        .context("failed to reach Telegram; check the bot token")?;
    info!(
        "Connected as @{}",
        me.username.as_deref().unwrap_or("unknown")
    );

    let ctx = BotContext::new(repo, exporter);
    start_message_handler(channel.clone(), ctx);

    info!("Bot is running. Waiting for updates (ctrl-c to stop)...");
    tokio::signal::ctrl_c().await?;
    channel.stop_polling();
    info!("Shutting down");
    Ok(())
}

async fn print_students(repo: &StudentRepository, limit: usize) -> Result<()> {
    let students = repo.list_recent(limit).await?;
    if students.is_empty() {
        println!("No records in the students table yet.");
        return Ok(());
    }

    for student in students {
        println!(
            "#{}: {}, age {}, grade {}",
            student.id, student.name, student.age, student.grade
        );
    }
    Ok(())
}
