//! Command dispatch loop for `ragclip listen`.
//!
//! Commands arrive on a `tokio::sync::mpsc` channel and run one at a
//! time; the next command is not taken until the previous one finished.
//! [`run_listen`] feeds the channel from stdin lines, so a hotkey daemon
//! (or a user at a terminal) can drive a long-lived process:
//!
//! ```text
//! ask        retrieve for the clipboard question
//! index      incremental indexing pass (alias: refresh)
//! status     tracker summary
//! quit       stop (alias: exit; also end of input or Ctrl-C)
//! ```

use std::io::BufRead;
use std::str::FromStr;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use ragclip_core::retrieve::RetrieveError;

use crate::app::App;
use crate::ask::{run_ask, AskOptions};
use crate::ingest::{run_index, IndexOptions};
use crate::status::run_status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ask,
    Index,
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ask" => Ok(Command::Ask),
            "index" | "refresh" => Ok(Command::Index),
            "status" => Ok(Command::Status),
            "quit" | "exit" => Ok(Command::Quit),
            other => bail!(
                "Unknown command: '{}'. Available: ask, index, status, quit",
                other
            ),
        }
    }
}

/// Run commands from `rx` until `Quit`, a closed channel or Ctrl-C.
///
/// An empty clipboard is reported and the loop keeps going; any other
/// failure ends the loop with that error.
pub async fn dispatch(app: &App, mut rx: mpsc::Receiver<Command>) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let command = tokio::select! {
            cmd = rx.recv() => cmd,
            _ = &mut shutdown => {
                debug!("interrupted");
                None
            }
        };
        let Some(command) = command else { break };
        debug!(?command, "dispatch");

        match command {
            Command::Ask => match run_ask(app, &AskOptions::default()).await {
                Ok(_) => {}
                Err(RetrieveError::EmptyQuery) => {
                    eprintln!("ask: {}", RetrieveError::EmptyQuery);
                }
                Err(RetrieveError::Store(e)) => return Err(e),
            },
            Command::Index => run_index(app, &IndexOptions::default()).await?.print(),
            Command::Status => run_status(app).await?.print(),
            Command::Quit => break,
        }
    }
    Ok(())
}

/// Read commands from stdin, one per line, and dispatch them.
pub async fn run_listen(app: &App) -> Result<()> {
    let (tx, rx) = mpsc::channel(16);

    // A plain thread: a pending blocking read must not hold up shutdown.
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(cmd) => {
                    if tx.blocking_send(cmd).is_err() {
                        break;
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
    });

    eprintln!("listening: ask | index | status | quit");
    dispatch(app, rx).await
}
