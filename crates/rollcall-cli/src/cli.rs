use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(version, about = "Rollcall - Telegram student registry bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Database path (defaults to ~/.rollcall/rollcall.db)
    #[arg(long, global = true, env = "ROLLCALL_DB_PATH")]
    pub db_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (default when no command is given)
    Run,

    /// Print the most recent student records
    Students {
        /// Maximum number of records to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Export all students to a CSV file and print its path
    Export,
}
