//! Command handlers.

mod assist;
mod directory;
mod history;
mod mail;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mailmate_core::{
    Assistant, Config, ContactDirectory, CredentialStore, DuckDuckGoSearch, KeyManager,
    OpenRouterClient, RevisionLog, SendLog, StorePaths,
};
use tracing::debug;

use crate::cli::{Cli, Command};

/// The model-backed assistant used by all commands.
pub type LiveAssistant = Assistant<OpenRouterClient, DuckDuckGoSearch>;

/// Resolved configuration and store locations.
pub struct App {
    config: Config,
    paths: StorePaths,
}

impl App {
    fn load(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::load(config_path).context("failed to load configuration")?;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        let paths = config.paths();
        debug!("Using data directory {}", config.data_dir.display());
        Ok(Self { config, paths })
    }

    fn assistant(&self) -> Result<LiveAssistant> {
        let completion = OpenRouterClient::new(&self.config.completion)?;
        let search = DuckDuckGoSearch::new(&self.config.search)?;
        Ok(Assistant::new(
            completion,
            search,
            self.config.search.max_results,
        ))
    }

    fn credential_store(&self) -> Result<CredentialStore> {
        let key = KeyManager::new(&self.paths.key)
            .get_or_create_key()
            .context("failed to load encryption key")?;
        Ok(CredentialStore::new(&self.paths.credentials, key))
    }

    fn contacts(&self) -> ContactDirectory {
        ContactDirectory::new(&self.paths.contacts)
    }

    fn send_log(&self) -> SendLog {
        SendLog::new(&self.paths.send_log)
    }

    fn revisions(&self) -> RevisionLog {
        RevisionLog::new(&self.paths.revisions)
    }
}

/// Runs the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let app = App::load(cli.config.as_deref(), cli.data_dir)?;

    match cli.cmd {
        Command::Research { topic } => assist::research(&app, &topic).await,
        Command::Plan { goal } => assist::plan(&app, &goal).await,
        Command::Todo { items } => assist::todo(&app, items).await,
        Command::Draft(args) => assist::draft(&app, args).await,
        Command::Contacts { cmd } => directory::contacts(&app, cmd),
        Command::Credentials { cmd } => directory::credentials(&app, cmd),
        Command::Send(args) => mail::send(&app, args).await,
        Command::Log { keyword } => history::log(&app, keyword.as_deref()),
        Command::Stats => history::stats(&app),
    }
}
