use super::{Host, HostError, ShareOutcome};
use crate::config::PatunganConfig;
use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Host facilities for a terminal session: external share/print commands
/// fed on stdin, and the system clipboard.
pub struct TerminalHost {
    share_command: Option<Vec<String>>,
    print_command: Vec<String>,
    share_timeout: Duration,
    print_timeout: Duration,
    // Held for the session: on X11 the selection is dropped with its owner.
    clipboard: Option<arboard::Clipboard>,
}

impl TerminalHost {
    pub fn new(
        share_command: Option<Vec<String>>,
        print_command: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            share_command,
            print_command,
            share_timeout: timeout,
            print_timeout: timeout,
            clipboard: None,
        }
    }

    pub fn with_print_timeout(mut self, timeout: Duration) -> Self {
        self.print_timeout = timeout;
        self
    }

    pub fn from_config(config: &PatunganConfig) -> Self {
        Self::new(
            config.share_command(),
            config.print_command(),
            config.share_timeout(),
        )
        .with_print_timeout(config.print_timeout())
    }
}

impl Host for TerminalHost {
    async fn share(&mut self, title: &str, text: &str) -> Result<ShareOutcome, HostError> {
        let command = match self.share_command.as_deref() {
            Some(command) if !command.is_empty() => command,
            _ => return Ok(ShareOutcome::Unavailable),
        };

        match run_piped(command, title, text, self.share_timeout).await {
            Ok(Some(status)) if status.success() => Ok(ShareOutcome::Shared),
            Ok(Some(status)) => {
                tracing::info!(%status, "share command declined");
                Ok(ShareOutcome::Cancelled)
            }
            Ok(None) => {
                tracing::info!("share command timed out");
                Ok(ShareOutcome::Cancelled)
            }
            // A share command that cannot be run leaves the clipboard as the way out.
            Err(HostError::Spawn { program, source }) | Err(HostError::Io { program, source }) => {
                tracing::warn!(%program, error = %source, "share command unusable");
                Ok(ShareOutcome::Unavailable)
            }
            Err(e) => Err(e),
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), HostError> {
        if self.clipboard.is_none() {
            self.clipboard = Some(arboard::Clipboard::new()?);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.set_text(text.to_string())?;
        }
        Ok(())
    }

    async fn print(&mut self, document: &str) -> Result<(), HostError> {
        let program = match self.print_command.first() {
            Some(program) => program.clone(),
            None => return Err(HostError::NotConfigured("print")),
        };

        match run_piped(&self.print_command, crate::receipt::TITLE, document, self.print_timeout).await? {
            Some(status) if status.success() => {
                tracing::info!(%program, "receipt sent to printer");
                Ok(())
            }
            Some(status) => Err(HostError::PrintFailed { program, status }),
            None => Err(HostError::TimedOut {
                program,
                secs: self.print_timeout.as_secs(),
            }),
        }
    }
}

/// Run `command` with `input` on stdin. Returns `None` when it does not exit
/// within `limit` (the child is killed).
async fn run_piped(
    command: &[String],
    title: &str,
    input: &str,
    limit: Duration,
) -> Result<Option<ExitStatus>, HostError> {
    let (program, args) = match command.split_first() {
        Some(split) => split,
        None => return Err(HostError::NotConfigured("external")),
    };

    tracing::debug!(%program, ?args, "running host command");
    let mut child = Command::new(program)
        .args(args)
        .env("PATUNGAN_TITLE", title)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| HostError::Spawn {
            program: program.clone(),
            source,
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(input.as_bytes()).await {
            // The command chose not to read its input.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
            Err(source) => {
                return Err(HostError::Io {
                    program: program.clone(),
                    source,
                })
            }
            Ok(()) => {}
        }
    }

    match tokio::time::timeout(limit, child.wait()).await {
        Ok(status) => status.map(Some).map_err(|source| HostError::Io {
            program: program.clone(),
            source,
        }),
        Err(_) => {
            let _ = child.kill().await;
            Ok(None)
        }
    }
}
