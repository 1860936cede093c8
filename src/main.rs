mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lc_auth::{AuthService, SessionStore};
use lc_content::{ArticleService, ProgressStore, VideoService};
use lc_core::{ApiClient, ClientConfig, FileStateStorage, StateStorage};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "lectern", about = "Read articles and watch videos from the terminal")]
struct Cli {
    /// API base URL
    #[arg(long, env = "LECTERN_API_URL")]
    api_url: Option<String>,

    /// Path to config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the persisted session and reading progress
    #[arg(long, env = "LECTERN_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Everything a command needs, wired around one session
pub struct App {
    pub session: SessionStore,
    pub progress: ProgressStore,
    pub auth: AuthService,
    pub articles: ArticleService,
    pub videos: VideoService,
}

impl App {
    fn build(cli: &Cli) -> anyhow::Result<Self> {
        let config = ClientConfig::load(cli.config.as_deref())
            .and_then(|c| c.with_api_url_override(cli.api_url.clone()))
            .context("Failed to resolve client configuration")?;

        let state_dir = match &cli.state_dir {
            Some(dir) => dir.clone(),
            None => FileStateStorage::default_storage_dir()
                .context("Failed to determine state directory")?,
        };
        let storage: Arc<dyn StateStorage> = Arc::new(
            FileStateStorage::new(&state_dir)
                .with_context(|| format!("Failed to open state directory {}", state_dir.display()))?,
        );

        debug!(
            "Using API {} with state in {}",
            config.api_url(),
            state_dir.display()
        );

        let session = SessionStore::load(storage.clone());
        let progress = ProgressStore::load(storage);

        let api = ApiClient::new(config)
            .context("Failed to build HTTP client")?
            .with_bearer_auth(Arc::new(session.clone()));

        Ok(Self {
            session,
            progress,
            auth: AuthService::new(api.clone()),
            articles: ArticleService::new(api.clone()),
            videos: VideoService::new(api),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::build(&cli)?;

    cli.command.run(&app).await
}
