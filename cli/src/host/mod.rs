//! Host Facilities
//!
//! The calculator talks to the outside world in three ways: sharing the
//! breakdown text, copying it to the clipboard, and printing a receipt.
//! `Host` is the seam; `TerminalHost` is the implementation used by the
//! binary, and tests substitute their own.
//!
//! `share_or_copy` carries the fallback rule: a host that cannot share gets
//! the text copied to its clipboard instead, and a cancelled share is a
//! no-op rather than an error.

mod terminal;

pub use terminal::TerminalHost;

use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error talking to `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("`{program}` exited with {status}")]
    PrintFailed { program: String, status: ExitStatus },
    #[error("`{program}` did not finish within {secs}s")]
    TimedOut { program: String, secs: u64 },
    #[error("no {0} command configured")]
    NotConfigured(&'static str),
}

/// What the host's share facility did with the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The user dismissed the share sheet.
    Cancelled,
    /// The host has no share facility.
    Unavailable,
}

/// Result of a share action after the clipboard fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareReport {
    Shared,
    Cancelled,
    Copied,
}

impl ShareReport {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            ShareReport::Shared => Some("Shared!"),
            ShareReport::Cancelled => None,
            ShareReport::Copied => Some("Copied to clipboard!"),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait Host {
    async fn share(&mut self, title: &str, text: &str) -> Result<ShareOutcome, HostError>;

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), HostError>;

    async fn print(&mut self, document: &str) -> Result<(), HostError>;
}

pub async fn share_or_copy<H: Host>(
    host: &mut H,
    title: &str,
    text: &str,
) -> Result<ShareReport, HostError> {
    match host.share(title, text).await? {
        ShareOutcome::Shared => Ok(ShareReport::Shared),
        ShareOutcome::Cancelled => {
            tracing::debug!("share cancelled");
            Ok(ShareReport::Cancelled)
        }
        ShareOutcome::Unavailable => {
            tracing::debug!("share unavailable, copying to clipboard");
            host.copy_to_clipboard(text)?;
            Ok(ShareReport::Copied)
        }
    }
}
