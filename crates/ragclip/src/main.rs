//! # ragclip CLI
//!
//! ## Usage
//!
//! ```bash
//! ragclip --config ./config/ragclip.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragclip init` | Create the SQLite database and run schema migrations |
//! | `ragclip index` | Index new and changed files in the source directories |
//! | `ragclip ask` | Turn the clipboard question into a prompt with context |
//! | `ragclip listen` | Read `ask` / `index` / `status` / `quit` from stdin |
//! | `ragclip status` | Show tracked files and missing sources |
//!
//! ## Hotkeys
//!
//! Bind `ragclip ask` and `ragclip index` to global shortcuts with the
//! desktop environment (System Settings on macOS, `sxhkd`, AutoHotkey, ...).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ragclip::app::App;
use ragclip::ask::{run_ask, AskOptions};
use ragclip::config;
use ragclip::ingest::{run_index, IndexOptions};
use ragclip::listen::run_listen;
use ragclip::progress::ProgressMode;
use ragclip::status::run_status;
use ragclip_core::retrieve::RetrieveError;

/// ragclip: index local documents, turn the clipboard into a grounded prompt.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ragclip.example.toml` for a full example.
#[derive(Parser)]
#[command(name = "ragclip", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ragclip.toml")]
    config: PathBuf,

    /// Progress output on stderr. Defaults to `human` when stderr is a
    /// terminal, otherwise `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    /// Debug logging (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and its tables. Safe to run
    /// repeatedly.
    Init,

    /// Index new and changed files.
    ///
    /// Files whose normalized text hash is already recorded are skipped;
    /// changed files have their old chunks replaced.
    Index {
        /// Show what would be indexed without writing anything.
        #[arg(long)]
        dry_run: bool,

        /// Process at most this many files.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Build a prompt for the question on the clipboard.
    ///
    /// Retrieves the most relevant chunks and replaces the clipboard with
    /// the question plus that context.
    Ask {
        /// Use this question instead of the clipboard contents.
        #[arg(long)]
        query: Option<String>,

        /// Run an indexing pass first.
        #[arg(long)]
        refresh: bool,

        /// Print the prompt instead of copying it to the clipboard.
        #[arg(long)]
        stdout: bool,
    },

    /// Run a command loop reading `ask`, `index`, `status` and `quit`
    /// from stdin.
    Listen,

    /// Show tracked files, chunk counts and missing source files.
    Status,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;
    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
    let app = App::open(cfg, progress).await?;

    let mut code = ExitCode::SUCCESS;
    match cli.command {
        Commands::Init => {
            println!("Database initialized successfully.");
        }
        Commands::Index { dry_run, limit } => {
            run_index(&app, &IndexOptions { dry_run, limit }).await?.print();
        }
        Commands::Ask {
            query,
            refresh,
            stdout,
        } => {
            let options = AskOptions {
                query,
                refresh,
                stdout,
            };
            match run_ask(&app, &options).await {
                Ok(_) => {}
                Err(RetrieveError::EmptyQuery) => {
                    eprintln!("ask: {}", options.empty_query_message());
                    code = ExitCode::FAILURE;
                }
                Err(RetrieveError::Store(e)) => return Err(e),
            }
        }
        Commands::Listen => {
            run_listen(&app).await?;
        }
        Commands::Status => {
            run_status(&app).await?.print();
        }
    }

    app.close().await;
    Ok(code)
}
