//! Terminal Host Abstraction
//!
//! The launcher never owns terminals itself. It asks a host (tmux, an editor,
//! a test double) to create them, type into them and bring them forward.
//! These traits are the whole surface the orchestration core depends on:
//!
//! - [`TerminalHost`] - terminal lifecycle and input
//! - [`HostUi`] - user-facing picks, error messages and file opening

pub mod console;
pub mod dry_run;
pub mod tmux;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::TerminalId;

pub use console::ConsoleUi;
pub use dry_run::DryRunHost;
pub use tmux::TmuxHost;

/// Parameters for a new host terminal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalOptions {
    /// Terminal title
    pub name: String,
    /// Working directory
    pub cwd: Option<PathBuf>,
    /// Extra environment variables
    pub env: BTreeMap<String, String>,
    /// Shell to start instead of the host default
    pub shell_path: Option<String>,
    /// Arguments for `shell_path`
    pub shell_args: Vec<String>,
    /// Split from this terminal instead of opening a top-level one
    pub parent: Option<TerminalId>,
}

/// Terminal lifecycle operations provided by the host
#[async_trait]
pub trait TerminalHost: Send + Sync {
    /// Create a terminal, as a split of `options.parent` when set
    ///
    /// # Errors
    /// Returns an error if the host cannot create the terminal
    async fn create_terminal(&self, options: &TerminalOptions) -> Result<TerminalId>;

    /// Type `text` into a terminal, pressing enter afterwards when `submit`
    async fn send_text(&self, id: &TerminalId, text: &str, submit: bool) -> Result<()>;

    /// Bring a terminal forward
    ///
    /// With `preserve_focus` the terminal becomes the visible one but keyboard
    /// focus stays where it was.
    async fn show(&self, id: &TerminalId, preserve_focus: bool) -> Result<()>;

    /// Whether the host still has this terminal
    async fn is_alive(&self, id: &TerminalId) -> bool;

    /// Identity of the host session terminal ids are issued in
    ///
    /// A terminal id recorded under one session says nothing about another:
    /// a restarted host may hand the same id to an unrelated terminal.
    ///
    /// # Errors
    /// Returns an error if the host cannot be reached
    async fn session_id(&self) -> Result<String>;

    /// Terminate the currently active terminal
    ///
    /// The terminal the launcher itself runs in is never a candidate.
    async fn kill_active(&self) -> Result<()>;
}

/// Interaction with the person driving the launcher
#[async_trait]
pub trait HostUi: Send + Sync {
    /// Let the user choose one of `items`; `None` means the pick was dismissed
    async fn pick(&self, title: &str, items: &[String]) -> Option<usize>;

    /// Surface an error message
    async fn show_error(&self, message: &str);

    /// Open a file for editing
    async fn open_file(&self, path: &Path) -> Result<()>;
}
