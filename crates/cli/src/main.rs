//! Tally CLI: the main entry point.
//!
//! Commands:
//! - `init`: Write a default config file
//! - `set-key`: Store the API key in the config file
//! - `status`: Show the effective configuration
//! - `ask`: Ask one question about a dashboard snapshot
//! - `chat`: Interactive conversation about a dashboard snapshot

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Tally — a financial assistant for your expense dashboard",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file if none exists
    Init,

    /// Store the API key in the config file
    SetKey {
        /// The API key (an empty value removes the stored key)
        key: String,
    },

    /// Show the effective configuration
    Status,

    /// Ask a single question and print the reply
    Ask {
        /// JSON file with the dashboard figures
        #[arg(short, long)]
        snapshot: PathBuf,

        /// The question to ask
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Start an interactive conversation
    Chat {
        /// JSON file with the dashboard figures
        #[arg(short, long)]
        snapshot: PathBuf,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Init => "init",
            Commands::SetKey { .. } => "set-key",
            Commands::Status => "status",
            Commands::Ask { .. } => "ask",
            Commands::Chat { .. } => "chat",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so replies on stdout stay clean
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(command = cli.command.name(), "Dispatching command");
    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::SetKey { key } => commands::set_key::run(&key).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Ask { snapshot, question } => {
            commands::ask::run(&snapshot, &question.join(" ")).await?
        }
        Commands::Chat { snapshot } => commands::chat::run(&snapshot).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_joins_question_words() {
        let cli = Cli::try_parse_from([
            "tally", "ask", "--snapshot", "dash.json", "What's", "my", "total?",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask { snapshot, question } => {
                assert_eq!(snapshot, PathBuf::from("dash.json"));
                assert_eq!(question.join(" "), "What's my total?");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn chat_requires_snapshot() {
        assert!(Cli::try_parse_from(["tally", "chat"]).is_err());
    }

    #[test]
    fn command_names_match_subcommands() {
        let cli = Cli::try_parse_from(["tally", "set-key", "sk-123"]).unwrap();
        assert_eq!(cli.command.name(), "set-key");
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["tally", "status", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
