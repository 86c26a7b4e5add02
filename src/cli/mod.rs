//! Command-line interface.

pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{ask::AskArgs, index::IndexArgs, init::InitArgs, serve::ServeArgs, usage::UsageArgs};

#[derive(Parser, Debug)]
#[command(name = "lesson-assist", version, about = "Study assistant over indexed lesson content")]
pub struct Cli {
    /// Configuration file (replaces .lesson-assist/config.yaml and local.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the project config and database
    Init(InitArgs),
    /// Chunk, embed and store published lessons
    Index(IndexArgs),
    /// Ask the assistant a question as a user
    Ask(AskArgs),
    /// Show a user's question count for today
    Usage(UsageArgs),
    /// Run the HTTP API
    Serve(ServeArgs),
}

/// Report a failed command and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "error": err.to_string(),
            "details": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err}", console::style("Error:").red().bold());
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1);
}
