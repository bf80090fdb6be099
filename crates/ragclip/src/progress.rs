//! Index pass progress on stderr, so stdout stays clean for the summary.

use std::io::Write;

use serde_json::json;

/// What an index pass has reached.
#[derive(Clone, Copy, Debug)]
pub enum IndexEvent {
    /// Walking this many source directories.
    Scanning { directories: usize },
    /// File `n` of `total` is done.
    File { n: usize, total: usize },
}

/// How `ragclip index` reports progress.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    /// `index  3 / 12 files`
    Human,
    /// One JSON object per line.
    Json,
}

impl ProgressMode {
    /// Human progress when stderr is a terminal, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// The stderr line for `event`, without the trailing newline.
    pub fn render(&self, event: IndexEvent) -> Option<String> {
        match (self, event) {
            (ProgressMode::Off, _) => None,
            (ProgressMode::Human, IndexEvent::Scanning { directories }) => {
                Some(format!("index  scanning {} directories...", directories))
            }
            (ProgressMode::Human, IndexEvent::File { n, total }) => {
                Some(format!("index  {} / {} files", n, total))
            }
            (ProgressMode::Json, IndexEvent::Scanning { directories }) => Some(
                json!({ "event": "progress", "phase": "scanning", "directories": directories })
                    .to_string(),
            ),
            (ProgressMode::Json, IndexEvent::File { n, total }) => Some(
                json!({ "event": "progress", "phase": "indexing", "n": n, "total": total })
                    .to_string(),
            ),
        }
    }

    pub fn report(&self, event: IndexEvent) {
        if let Some(line) = self.render(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}
