use super::ClipboardService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Pipes text into the platform clipboard tool.
pub struct SystemClipboard {
    program: String,
    args: Vec<String>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        if cfg!(target_os = "macos") {
            Self::with_command("pbcopy", &[])
        } else if cfg!(target_os = "windows") {
            Self::with_command("clip", &[])
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Self::with_command("wl-copy", &[])
        } else {
            Self::with_command("xclip", &["-selection", "clipboard"])
        }
    }

    pub fn with_command(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipboardService for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Clipboard(format!("Failed to launch {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(Error::Clipboard(format!(
                "{} failed: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Ok(())
    }
}
