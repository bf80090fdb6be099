//! Clipboard access.
//!
//! [`SystemClipboard`] shells out to the platform clipboard tools, or to
//! the commands given in `[clipboard]`. [`MemoryClipboard`] holds the
//! contents in-process for tests.
//!
//! | Platform | Read | Write |
//! |----------|------|-------|
//! | macOS | `pbpaste` | `pbcopy` |
//! | Windows | `powershell Get-Clipboard` | `powershell Set-Clipboard` |
//! | Wayland | `wl-paste` | `wl-copy` |
//! | X11 | `xclip -o` | `xclip` |

use std::process::Stdio;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::ClipboardConfig;

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn read(&self) -> Result<String>;
    async fn write(&self, text: &str) -> Result<()>;
}

pub struct SystemClipboard {
    read_command: Vec<String>,
    write_command: Vec<String>,
}

fn to_command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn platform_commands() -> (Vec<String>, Vec<String>) {
    if cfg!(target_os = "macos") {
        (to_command(&["pbpaste"]), to_command(&["pbcopy"]))
    } else if cfg!(target_os = "windows") {
        (
            to_command(&["powershell", "-NoProfile", "-Command", "Get-Clipboard -Raw"]),
            to_command(&[
                "powershell",
                "-NoProfile",
                "-Command",
                "[Console]::In.ReadToEnd() | Set-Clipboard",
            ]),
        )
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        (
            to_command(&["wl-paste", "--no-newline"]),
            to_command(&["wl-copy"]),
        )
    } else {
        (
            to_command(&["xclip", "-selection", "clipboard", "-o"]),
            to_command(&["xclip", "-selection", "clipboard"]),
        )
    }
}

impl SystemClipboard {
    pub fn from_config(config: &ClipboardConfig) -> Self {
        let (default_read, default_write) = platform_commands();
        Self {
            read_command: config.read_command.clone().unwrap_or(default_read),
            write_command: config.write_command.clone().unwrap_or(default_write),
        }
    }

    fn command(parts: &[String]) -> Result<Command> {
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| anyhow!("clipboard command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn read(&self) -> Result<String> {
        let output = Self::command(&self.read_command)?
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| {
                format!(
                    "Failed to run '{}'. Is it installed?",
                    self.read_command[0]
                )
            })?;

        // wl-paste and xclip exit 1 with a message when nothing is copied.
        if !output.status.success() {
            debug!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "clipboard read tool failed, treating clipboard as empty"
            );
            return Ok(String::new());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn write(&self, text: &str) -> Result<()> {
        let mut child = Self::command(&self.write_command)?
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to run '{}'. Is it installed?",
                    self.write_command[0]
                )
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("clipboard command has no stdin"))?;
        stdin.write_all(text.as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("clipboard write failed: {}", stderr.trim());
        }
        Ok(())
    }
}

/// In-process clipboard.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<String>,
}

impl MemoryClipboard {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(initial.into()),
        }
    }

    pub fn contents(&self) -> String {
        self.contents.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn read(&self) -> Result<String> {
        Ok(self.contents())
    }

    async fn write(&self, text: &str) -> Result<()> {
        *self.contents.lock().unwrap() = text.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_clipboard_roundtrip() {
        let clip = MemoryClipboard::new("question");
        assert_eq!(clip.read().await.unwrap(), "question");
        clip.write("prompt").await.unwrap();
        assert_eq!(clip.contents(), "prompt");
    }

    #[test]
    fn config_overrides_platform_tools() {
        let clip = SystemClipboard::from_config(&ClipboardConfig {
            read_command: Some(to_command(&["cat", "/tmp/q"])),
            write_command: None,
        });
        assert_eq!(clip.read_command, vec!["cat", "/tmp/q"]);
        assert!(!clip.write_command.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_clipboard_runs_configured_commands() {
        let tmp = tempfile::TempDir::new().unwrap();
        let query = tmp.path().join("query.txt");
        let out = tmp.path().join("prompt.txt");
        std::fs::write(&query, "what is ragclip?").unwrap();

        let clip = SystemClipboard::from_config(&ClipboardConfig {
            read_command: Some(vec!["cat".into(), query.display().to_string()]),
            write_command: Some(vec![
                "sh".into(),
                "-c".into(),
                format!("cat > '{}'", out.display()),
            ]),
        });

        assert_eq!(clip.read().await.unwrap(), "what is ragclip?");
        clip.write("the prompt").await.unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "the prompt");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_read_tool_means_empty_clipboard() {
        let clip = SystemClipboard::from_config(&ClipboardConfig {
            read_command: Some(vec![
                "sh".into(),
                "-c".into(),
                "echo 'Nothing is copied' >&2; exit 1".into(),
            ]),
            write_command: None,
        });
        assert_eq!(clip.read().await.unwrap(), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_tool_is_an_error() {
        let clip = SystemClipboard::from_config(&ClipboardConfig {
            read_command: Some(vec!["ragclip-no-such-tool".into()]),
            write_command: Some(vec!["ragclip-no-such-tool".into()]),
        });
        assert!(clip.read().await.is_err());
        assert!(clip.write("x").await.is_err());
    }
}
