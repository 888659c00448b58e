//! CLI entry point for tasklist.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tasklist_app::{ProjectConfig, TaskStore, ViewSession};
use tasklist_core::{Clock, Filter, SortOrder, SystemClock, TaskId};
use tasklist_store::TierKind;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Task list with local and simulated remote storage tiers.
#[derive(Parser, Debug)]
#[command(
    name = "tasklist",
    version,
    about = "tasklist: a task list persisted to a local and a remote tier"
)]
struct Cli {
    /// Working directory holding `.tasklist/` (defaults to current).
    #[arg(long)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a new task.
    Add {
        label: String,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
    },

    /// Flip a task between open and done.
    Toggle { id: TaskId },

    /// Remove a task.
    Rm { id: TaskId },

    /// Change the label of a task.
    Rename { id: TaskId, label: String },

    /// Set or clear (when omitted) the due date of a task.
    Due { id: TaskId, date: Option<String> },

    /// List tasks. Filter and sort choices are remembered.
    Ls {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long)]
        filter: Option<Filter>,
        #[arg(short, long)]
        sort: Option<SortOrder>,
    },

    /// Mark every task as done.
    CompleteAll,

    /// Remove every done task.
    ClearCompleted,

    /// Replace all tasks with the contents of a JSON file.
    Import { file: PathBuf },

    /// Write all tasks as JSON to a file or stdout.
    Export { file: Option<PathBuf> },

    /// Show tier health and task counts.
    Status,
}

fn main() -> Result<()> {
    let Cli { dir, cmd } = Cli::parse();
    install_tracing();

    let workdir = dir.unwrap_or_else(|| PathBuf::from("."));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(execute(&workdir, cmd))
}

async fn execute(workdir: &Path, command: Command) -> Result<()> {
    let config = ProjectConfig::from_workdir(workdir)?;
    let persistence = config.storage.persistence(workdir)?;
    let mut session = ViewSession::load(persistence.tier(TierKind::Local).cloned()).await;
    let mut store = TaskStore::new(
        TaskStore::demo_records(SystemClock.now_millis()),
        persistence,
    );
    store.fetch_all().await;

    let result = commands::run(command, &mut store, &mut session, &mut io::stdout()).await;
    store.flush().await;
    result
}

fn install_tracing() {
    // RUST_LOG で上書き可能。デフォルトは INFO、出力は stderr。
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
