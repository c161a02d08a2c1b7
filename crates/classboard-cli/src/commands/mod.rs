//! CLI command definitions and handlers.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use classboard_api::{ClientConfig, HttpBoardApi};
use classboard_core::board::BoardSnapshot;
use classboard_core::session::SESSION_FILE;
use classboard_core::work_item::WorkItem;
use classboard_core::{BoardController, BoardError, Session};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::output;

pub mod board;
pub mod item;
pub mod serve;
pub mod session;
pub mod sprint;

/// Classboard - classroom project board
#[derive(Parser)]
#[command(name = "classboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project directory (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Backend URL (overrides CLASSBOARD_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the sprint board and backlog
    #[command(subcommand)]
    Board(board::BoardCommands),

    /// Work item commands
    #[command(subcommand)]
    Item(item::ItemCommands),

    /// Sprint lifecycle commands
    #[command(subcommand)]
    Sprint(sprint::SprintCommands),

    /// Manage the local session (who you are, which group)
    #[command(subcommand)]
    Session(session::SessionCommands),

    /// Start the development board server
    Serve(serve::ServeArgs),
}

impl Cli {
    pub fn project_dir(&self) -> Result<PathBuf> {
        match &self.project {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Whether stdout must stay machine readable.
    pub fn wants_json(&self) -> bool {
        matches!(
            &self.command,
            Commands::Board(board::BoardCommands::Show { json: true })
        )
    }

    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext {
            project_dir: self.project_dir()?,
            api_url: self.api_url,
        };

        match self.command {
            Commands::Board(cmd) => board::execute(cmd, &ctx).await,
            Commands::Item(cmd) => item::execute(cmd, &ctx).await,
            Commands::Sprint(cmd) => sprint::execute(cmd, &ctx).await,
            Commands::Session(cmd) => session::execute(cmd, &ctx),
            Commands::Serve(args) => serve::execute(args).await,
        }
    }
}

/// Where commands find the session and the backend.
pub struct CommandContext {
    pub project_dir: PathBuf,
    pub api_url: Option<String>,
}

impl CommandContext {
    pub fn session_path(&self) -> PathBuf {
        self.project_dir.join(SESSION_FILE)
    }

    pub fn load_session(&self) -> Result<Session> {
        let path = self.session_path();
        if !path.exists() {
            anyhow::bail!(
                "No session found at {}. Run 'classboard session set' first.",
                path.display()
            );
        }
        Ok(Session::load(&path)?)
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        config
    }

    /// Connect to the backend and load the board.
    pub async fn open_board(&self) -> Result<BoardController<HttpBoardApi>> {
        let session = self.load_session()?;
        let config = self.client_config();
        tracing::debug!(api_url = %config.api_url, "Connecting to board backend");
        let api = HttpBoardApi::new(&config)?;
        let mut controller = BoardController::new(api, session)?;

        let pb = spinner("Loading board...");
        let loaded = controller.load().await.map(|_| ());
        pb.finish_and_clear();
        loaded.map_err(report)?;

        Ok(controller)
    }
}

/// Spinner shown while waiting on the backend.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Tell the user when a confirmed change could not be followed by a reload.
pub fn warn_if_stale(controller: &BoardController<HttpBoardApi>) {
    if controller.is_stale() {
        eprintln!(
            "{} Change saved, but the board could not be refreshed. Run 'classboard board show'.",
            "!".yellow().bold()
        );
    }
}

/// Print any structured issues and hand the error to the top level.
pub fn report(e: BoardError) -> anyhow::Error {
    output::print_issues(e.issues());
    anyhow::Error::new(e)
}

/// Find an item by key (`WI-3`) or numeric id.
pub fn resolve_item<'a>(board: &'a BoardSnapshot, reference: &str) -> Result<&'a WorkItem> {
    let found = board.find_by_key(reference).or_else(|| {
        reference
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|id| board.find_item(id))
    });
    found.ok_or_else(|| BoardError::WorkItemNotFound(reference.to_string()).into())
}

/// Midnight UTC of a calendar date given on the command line.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
