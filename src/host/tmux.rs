//! tmux Terminal Host
//!
//! Maps the host operations onto the tmux command line:
//!
//! | operation            | tmux                                    |
//! |----------------------|-----------------------------------------|
//! | top-level terminal   | `new-window -d -P -F #{pane_id}`        |
//! | group child          | `split-window -d -t <parent pane>`      |
//! | type text            | `send-keys -l`, then `Enter` to submit  |
//! | show                 | `select-window`, plus `select-pane`     |
//! | liveness             | `display-message -p #{pane_id}`         |
//! | session identity     | `display-message -p #{pid}:#{start_time}` |
//! | kill active          | `list-panes -s`, then `kill-pane -t`    |
//!
//! Terminal ids are tmux pane ids (`%12`). They stay valid for the life of
//! the tmux server and are reused by the next one, so the server's pid and
//! start time identify the session they belong to.
//!
//! Kill requests pick a pane from the target session explicitly. The pane
//! the launcher runs in (`$TMUX_PANE`) is skipped.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::{TerminalHost, TerminalOptions};
use crate::error::{Error, Result};
use crate::models::TerminalId;

const PANE_ID_FORMAT: &str = "#{pane_id}";
const SERVER_ID_FORMAT: &str = "#{pid}:#{start_time}";
const PANE_LIST_FORMAT: &str = "#{pane_id} #{window_active}#{pane_active}";

/// Terminal host driving a tmux server
#[derive(Debug, Clone)]
pub struct TmuxHost {
    /// tmux executable
    binary: PathBuf,
    /// Session new windows are created in; the current one when `None`
    session: Option<String>,
    /// Pane the launcher runs in, never killed
    launcher_pane: Option<String>,
}

impl TmuxHost {
    /// Host using `tmux` from PATH and the current session
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tmux"),
            session: None,
            launcher_pane: std::env::var("TMUX_PANE")
                .ok()
                .filter(|pane| !pane.is_empty()),
        }
    }

    /// Create new windows in `session`
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Use a specific tmux executable
    pub fn with_binary(mut self, binary: impl AsRef<Path>) -> Self {
        self.binary = binary.as_ref().to_path_buf();
        self
    }

    /// Protect `pane` from kill requests instead of `$TMUX_PANE`
    pub fn with_launcher_pane(mut self, pane: Option<String>) -> Self {
        self.launcher_pane = pane;
        self
    }

    /// Arguments creating the terminal described by `options`
    pub fn create_args(&self, options: &TerminalOptions) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        match &options.parent {
            Some(parent) => {
                args.extend(["split-window".to_string(), "-d".to_string()]);
                args.extend(["-t".to_string(), parent.to_string()]);
            }
            None => {
                args.extend(["new-window".to_string(), "-d".to_string()]);
                args.extend(["-n".to_string(), options.name.clone()]);
                if let Some(session) = &self.session {
                    args.extend(["-t".to_string(), format!("{}:", session)]);
                }
            }
        }

        args.extend(["-P".to_string(), "-F".to_string(), PANE_ID_FORMAT.to_string()]);

        if let Some(cwd) = &options.cwd {
            args.extend(["-c".to_string(), cwd.display().to_string()]);
        }
        for (key, value) in &options.env {
            args.extend(["-e".to_string(), format!("{}={}", key, value)]);
        }
        if let Some(shell) = &options.shell_path {
            args.push(shell.clone());
            args.extend(options.shell_args.iter().cloned());
        }

        args
    }

    /// Argument lists typing `text` into `id`
    pub fn send_args(id: &TerminalId, text: &str, submit: bool) -> Vec<Vec<String>> {
        let mut calls = vec![vec![
            "send-keys".to_string(),
            "-t".to_string(),
            id.to_string(),
            "-l".to_string(),
            "--".to_string(),
            text.to_string(),
        ]];
        if submit {
            calls.push(vec![
                "send-keys".to_string(),
                "-t".to_string(),
                id.to_string(),
                "Enter".to_string(),
            ]);
        }
        calls
    }

    /// Argument lists showing `id`
    pub fn show_args(id: &TerminalId, preserve_focus: bool) -> Vec<Vec<String>> {
        let mut calls = vec![vec![
            "select-window".to_string(),
            "-t".to_string(),
            id.to_string(),
        ]];
        if !preserve_focus {
            calls.push(vec![
                "select-pane".to_string(),
                "-t".to_string(),
                id.to_string(),
            ]);
        }
        calls
    }

    /// Arguments listing every pane of the target session
    pub fn list_panes_args(&self) -> Vec<String> {
        let mut args = vec!["list-panes".to_string(), "-s".to_string()];
        if let Some(session) = &self.session {
            args.extend(["-t".to_string(), session.clone()]);
        }
        args.extend(["-F".to_string(), PANE_LIST_FORMAT.to_string()]);
        args
    }

    /// Arguments reporting the server identity
    pub fn server_id_args(&self) -> Vec<String> {
        let mut args = vec!["display-message".to_string(), "-p".to_string()];
        if let Some(session) = &self.session {
            args.extend(["-t".to_string(), format!("{}:", session)]);
        }
        args.push(SERVER_ID_FORMAT.to_string());
        args
    }

    /// Pick the pane a kill request should target from a `list-panes` listing
    ///
    /// The active pane of the active window wins, then the last pane listed.
    /// `launcher` is never picked.
    pub fn kill_target(listing: &str, launcher: Option<&str>) -> Option<TerminalId> {
        let panes: Vec<(&str, bool)> = listing
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let id = fields.next()?;
                let active = fields.next() == Some("11");
                Some((id, active))
            })
            .filter(|(id, _)| Some(*id) != launcher)
            .collect();

        panes
            .iter()
            .find(|(_, active)| *active)
            .or_else(|| panes.last())
            .map(|(id, _)| TerminalId::new(*id))
    }

    /// Arguments killing pane `id`
    pub fn kill_args(id: &TerminalId) -> Vec<String> {
        vec!["kill-pane".to_string(), "-t".to_string(), id.to_string()]
    }

    /// Run tmux with `args`, returning trimmed stdout
    async fn tmux(&self, args: &[String]) -> Result<String> {
        let command = format!("{} {}", self.binary.display(), args.join(" "));
        trace!("Running {}", command);

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::HostUnavailable {
                reason: format!("failed to run {}: {}", self.binary.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::HostCommandFailed {
                command,
                reason: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for TmuxHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TerminalHost for TmuxHost {
    async fn create_terminal(&self, options: &TerminalOptions) -> Result<TerminalId> {
        let pane = self.tmux(&self.create_args(options)).await?;
        if pane.is_empty() {
            return Err(Error::HostCommandFailed {
                command: "tmux new-window".to_string(),
                reason: "tmux did not report a pane id".to_string(),
            });
        }
        debug!("tmux created pane {} for '{}'", pane, options.name);
        Ok(TerminalId::new(pane))
    }

    async fn send_text(&self, id: &TerminalId, text: &str, submit: bool) -> Result<()> {
        for args in Self::send_args(id, text, submit) {
            self.tmux(&args).await?;
        }
        Ok(())
    }

    async fn show(&self, id: &TerminalId, preserve_focus: bool) -> Result<()> {
        for args in Self::show_args(id, preserve_focus) {
            self.tmux(&args).await?;
        }
        Ok(())
    }

    async fn is_alive(&self, id: &TerminalId) -> bool {
        let args = [
            "display-message".to_string(),
            "-p".to_string(),
            "-t".to_string(),
            id.to_string(),
            PANE_ID_FORMAT.to_string(),
        ];
        match self.tmux(&args).await {
            Ok(pane) => pane == id.as_str(),
            Err(e) => {
                trace!("Pane {} is gone: {}", id, e);
                false
            }
        }
    }

    async fn session_id(&self) -> Result<String> {
        let server = self.tmux(&self.server_id_args()).await?;
        if server.is_empty() {
            return Err(Error::HostCommandFailed {
                command: "tmux display-message".to_string(),
                reason: "tmux did not report a server identity".to_string(),
            });
        }
        Ok(server)
    }

    async fn kill_active(&self) -> Result<()> {
        let listing = self.tmux(&self.list_panes_args()).await?;
        let Some(target) = Self::kill_target(&listing, self.launcher_pane.as_deref()) else {
            return Err(Error::TerminalNotFound {
                id: "active pane".to_string(),
            });
        };

        debug!("Killing tmux pane {}", target);
        self.tmux(&Self::kill_args(&target)).await.map(|_| ())
    }
}
