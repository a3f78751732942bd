//! Dry-run host
//!
//! Prints what would happen instead of touching a real terminal host. Useful
//! for checking a configuration before letting it loose on a tmux session.

use async_trait::async_trait;
use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::{TerminalHost, TerminalOptions};
use crate::error::{Error, Result};
use crate::models::TerminalId;

/// [`TerminalHost`] that describes every operation on a writer
pub struct DryRunHost {
    out: Mutex<Box<dyn Write + Send>>,
    terminals: Arc<Mutex<HashSet<TerminalId>>>,
    session: String,
}

impl DryRunHost {
    /// Describe operations on stdout
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    /// Describe operations on `out`
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            terminals: Arc::new(Mutex::new(HashSet::new())),
            session: format!("dry-run-{}", Uuid::new_v4().simple()),
        }
    }

    fn ensure_known(&self, id: &TerminalId) -> Result<()> {
        let known = self
            .terminals
            .lock()
            .map(|terminals| terminals.contains(id))
            .unwrap_or(false);
        if known {
            Ok(())
        } else {
            Err(Error::TerminalNotFound { id: id.to_string() })
        }
    }

    fn say(&self, line: String) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::Other("dry-run writer poisoned".to_string()))?;
        writeln!(out, "{}", line)?;
        Ok(())
    }
}

impl Default for DryRunHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TerminalHost for DryRunHost {
    async fn create_terminal(&self, options: &TerminalOptions) -> Result<TerminalId> {
        let id = TerminalId::new(format!("dry-{}", &Uuid::new_v4().simple().to_string()[..8]));
        let placement = match &options.parent {
            Some(parent) => format!("split of {}", parent),
            None => "new terminal".to_string(),
        };
        let cwd = options
            .cwd
            .as_ref()
            .map(|cwd| format!(" in {}", cwd.display()))
            .unwrap_or_default();

        self.say(format!("[{}] {} '{}'{}", id, placement, options.name, cwd))?;
        if let Ok(mut terminals) = self.terminals.lock() {
            terminals.insert(id.clone());
        }
        Ok(id)
    }

    async fn send_text(&self, id: &TerminalId, text: &str, submit: bool) -> Result<()> {
        self.ensure_known(id)?;
        let marker = if submit { "$" } else { ">" };
        self.say(format!("[{}] {} {}", id, marker, text))
    }

    async fn show(&self, id: &TerminalId, preserve_focus: bool) -> Result<()> {
        self.ensure_known(id)?;
        let how = if preserve_focus { "show" } else { "focus" };
        self.say(format!("[{}] {}", id, how))
    }

    async fn is_alive(&self, id: &TerminalId) -> bool {
        self.terminals
            .lock()
            .map(|terminals| terminals.contains(id))
            .unwrap_or(false)
    }

    async fn session_id(&self) -> Result<String> {
        Ok(self.session.clone())
    }

    async fn kill_active(&self) -> Result<()> {
        let killed = self
            .terminals
            .lock()
            .ok()
            .and_then(|mut terminals| {
                let id = terminals.iter().next().cloned()?;
                terminals.remove(&id);
                Some(id)
            });
        match killed {
            Some(id) => self.say(format!("[{}] kill", id)),
            None => Ok(()),
        }
    }
}
