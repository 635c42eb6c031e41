//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mailmate_core::Language;

/// Environment variable consulted for the sender's app password.
pub const DEFAULT_SECRET_ENV: &str = "MAILMATE_APP_PASSWORD";

#[derive(Debug, Parser)]
#[command(
    name = "mailmate",
    version,
    about = "Mail assistant: drafts, research, contacts and encrypted credentials"
)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "MAILMATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the web for a topic and summarize the findings
    Research {
        /// Topic to research
        topic: String,
    },
    /// Break a goal into actionable sub-tasks
    Plan {
        /// The goal to reach
        goal: String,
    },
    /// Order to-do items by importance and urgency (reads stdin if none given)
    Todo {
        /// To-do items
        items: Vec<String>,
    },
    /// Manage the contact directory
    Contacts {
        #[command(subcommand)]
        cmd: ContactsCmd,
    },
    /// Manage the remembered sender credentials
    Credentials {
        #[command(subcommand)]
        cmd: CredentialsCmd,
    },
    /// Generate a mail draft from a description
    Draft(DraftArgs),
    /// Send a draft
    Send(SendArgs),
    /// Show the send log
    Log {
        /// Only entries whose subject or receiver contains this text
        #[arg(long, short)]
        keyword: Option<String>,
    },
    /// Show daily and per-category send counts
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum ContactsCmd {
    /// List all contacts
    List,
    /// Add a contact or change its address
    Add {
        /// Display name
        name: String,
        /// Mail address
        address: String,
    },
    /// Remove a contact
    Remove {
        /// Display name
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CredentialsCmd {
    /// Encrypt and store a sender identity and app password
    Save {
        /// Sender address
        identity: String,
        /// Environment variable holding the app password (stdin if unset)
        #[arg(long, default_value = DEFAULT_SECRET_ENV)]
        secret_env: String,
    },
    /// Show the stored identity
    Show,
    /// Delete the stored credentials
    Forget,
}

#[derive(Debug, Args)]
pub struct DraftArgs {
    /// What the mail should say
    pub description: String,

    /// Language of the draft: zh, en or ja
    #[arg(long, short, default_value = "zh", value_parser = parse_language)]
    pub language: Language,

    /// Writing tone
    #[arg(long, short, default_value = mailmate_core::assistant::DEFAULT_TONE)]
    pub tone: String,

    /// Write the draft as JSON to this file instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Draft JSON produced by `mailmate draft`
    #[arg(long)]
    pub draft: PathBuf,

    /// Contact name or mail address
    #[arg(long)]
    pub to: String,

    /// File to attach
    #[arg(long)]
    pub attach: Option<PathBuf>,

    /// Seconds to wait before sending
    #[arg(long, default_value_t = 0)]
    pub delay: u64,

    /// Store the sender credentials for next time
    #[arg(long)]
    pub remember: bool,

    /// Sender address (defaults to the stored identity)
    #[arg(long)]
    pub from: Option<String>,

    /// Environment variable holding the app password
    #[arg(long, default_value = DEFAULT_SECRET_ENV)]
    pub secret_env: String,
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse().map_err(|e: mailmate_core::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from([
            "mailmate", "send", "--draft", "d.json", "--to", "Alice", "--delay", "30", "--remember",
        ])
        .unwrap();

        let Command::Send(args) = cli.cmd else {
            panic!("expected send");
        };
        assert_eq!(args.to, "Alice");
        assert_eq!(args.delay, 30);
        assert!(args.remember);
        assert!(args.from.is_none());
        assert_eq!(args.secret_env, DEFAULT_SECRET_ENV);
    }

    #[test]
    fn test_parse_draft_language() {
        let cli = Cli::try_parse_from(["mailmate", "draft", "ask for leave", "-l", "ja"]).unwrap();
        let Command::Draft(args) = cli.cmd else {
            panic!("expected draft");
        };
        assert_eq!(args.language, Language::Japanese);
        assert_eq!(args.tone, "formal and polite");

        assert!(Cli::try_parse_from(["mailmate", "draft", "x", "-l", "fr"]).is_err());
    }

    #[test]
    fn test_global_data_dir() {
        let cli = Cli::try_parse_from(["mailmate", "stats", "--data-dir", "/tmp/mm"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/mm")));
        assert!(matches!(cli.cmd, Command::Stats));
    }

    #[test]
    fn test_todo_items_optional() {
        let cli = Cli::try_parse_from(["mailmate", "todo"]).unwrap();
        assert!(matches!(cli.cmd, Command::Todo { ref items } if items.is_empty()));
    }
}
