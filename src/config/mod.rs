pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "todo-scheduler")]
#[command(about = "A personal task scheduler with repeating tasks")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "scheduler.toml", global = true)]
    pub config: String,

    /// Override the task store path from config
    #[arg(long, global = true)]
    pub store: Option<String>,

    #[arg(short, long, help = "Enable verbose output", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Preview the next date of a repeat rule
    #[command(name = "nextdate")]
    NextDate {
        /// Base date, YYYYMMDD
        #[arg(long)]
        date: String,
        /// Repeat rule, e.g. "d 7", "y", "w 1,5", "m -1 1,7"
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        repeat: String,
        /// Reference date, YYYYMMDD (defaults to today)
        #[arg(long)]
        now: Option<String>,
    },
    /// Add a task
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long, default_value = "")]
        comment: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        repeat: String,
    },
    /// List upcoming tasks
    List,
    /// Search tasks by text or by DD.MM.YYYY date
    Search { query: String },
    /// Show a single task
    Show { id: String },
    /// Replace a task's fields
    Update {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        comment: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        repeat: String,
    },
    /// Mark a task as done
    Done { id: String },
    /// Delete a task
    Delete { id: String },
}
