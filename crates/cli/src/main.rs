//! Skimmer CLI: the main entry point.
//!
//! Commands:
//! - `serve`    - Start the HTTP API server
//! - `chat`     - Process a single message and print the reply
//! - `history`  - Show a session's conversation log
//! - `stats`    - Show a session's entry count and timestamps
//! - `clear`    - Clear a session's log
//! - `classify` - Show how a message would be routed
//! - `init`     - Write the default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "skimmer",
    about = "Skimmer: summarize links and text, then ask follow-up questions",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Path to the config file (defaults to ~/.skimmer/config.toml)
    #[arg(short, long, global = true, env = "SKIMMER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send one message and print the reply
    Chat {
        /// Session to continue (a new one is started if omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// A URL, some text to summarize, or a follow-up question
        message: String,

        /// Print the full turn result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a session's conversation log
    History {
        #[arg(short, long)]
        session: String,

        /// Only show the most recent N entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a session's entry count and timestamps
    Stats {
        #[arg(short, long)]
        session: String,
    },

    /// Clear a session's log
    Clear {
        #[arg(short, long)]
        session: String,
    },

    /// Show how a message would be routed
    Classify {
        text: String,
    },

    /// Write the default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Chat {
            session,
            message,
            json,
        } => commands::chat::run(config_path, session, message, json).await?,
        Commands::History { session, limit } => {
            commands::session::history(config_path, &session, limit).await?
        }
        Commands::Stats { session } => commands::session::stats(config_path, &session).await?,
        Commands::Clear { session } => commands::session::clear(config_path, &session).await?,
        Commands::Classify { text } => commands::classify::run(&text),
        Commands::Init => commands::init::run(config_path)?,
    }

    Ok(())
}
