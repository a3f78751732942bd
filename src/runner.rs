//! Terminal Runner
//!
//! Runs a single terminal definition against the host: resolves its command
//! text, reuses a live persistent terminal when one is registered, otherwise
//! spawns a terminal (as a split of a parent for group runs) and types the
//! commands into it.
//!
//! The runner never fails loudly. A definition that cannot produce a terminal
//! yields `None` and is skipped by the caller; sibling definitions in the same
//! batch are unaffected.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::host::{TerminalHost, TerminalOptions};
use crate::models::{Configuration, TerminalDefinition, TerminalHandle, TerminalId};
use crate::registry::{PersistentRegistry, RegistryEntry};
use crate::substitution::SubstitutionMap;

/// One line of input for a terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    /// Text to type
    pub text: String,
    /// Press enter after typing
    pub submit: bool,
}

/// Order commands for sending
///
/// Every command but the last is submitted; the last one only when `execute`
/// is set, otherwise it is left typed for the user to confirm.
pub fn send_plan(commands: Vec<String>, execute: bool) -> Vec<PendingInput> {
    let last = commands.len().saturating_sub(1);
    commands
        .into_iter()
        .enumerate()
        .map(|(index, text)| PendingInput {
            text,
            submit: index != last || execute,
        })
        .collect()
}

/// Command text of `definition` after substitution
///
/// Each entry of a command sequence is substituted independently. Returns an
/// empty list when there is nothing to send.
pub fn resolve_commands(
    definition: &TerminalDefinition,
    substitutions: &SubstitutionMap,
) -> Vec<String> {
    let Some(spec) = &definition.commands else {
        return Vec::new();
    };

    let commands: Vec<String> = spec
        .as_slice()
        .iter()
        .map(|command| {
            if definition.substitution {
                substitutions.apply(command)
            } else {
                command.clone()
            }
        })
        .collect();

    if commands.iter().all(|command| command.trim().is_empty()) {
        Vec::new()
    } else {
        commands
    }
}

/// Runs definitions against a terminal host
#[derive(Clone)]
pub struct TerminalRunner {
    host: Arc<dyn TerminalHost>,
    registry: Arc<PersistentRegistry>,
}

impl TerminalRunner {
    /// Create a runner spawning on `host` and tracking persistence in `registry`
    pub fn new(host: Arc<dyn TerminalHost>, registry: Arc<PersistentRegistry>) -> Self {
        Self { host, registry }
    }

    /// The terminal host
    pub fn host(&self) -> &Arc<dyn TerminalHost> {
        &self.host
    }

    /// The persistent terminal registry
    pub fn registry(&self) -> &Arc<PersistentRegistry> {
        &self.registry
    }

    /// Run one definition
    ///
    /// With `parent`, a new terminal is split from the parent's terminal. A
    /// reused persistent terminal is returned as-is: nothing is re-sent. A
    /// registered terminal is reused only when it is alive in the host's
    /// current session.
    ///
    /// Returns `None` when the definition has no command or the host could
    /// not create a terminal.
    pub async fn run(
        &self,
        definition: &TerminalDefinition,
        config: &Configuration,
        root: Option<&Path>,
        substitutions: &SubstitutionMap,
        parent: Option<&TerminalHandle>,
    ) -> Option<TerminalHandle> {
        let commands = resolve_commands(definition, substitutions);
        if commands.is_empty() {
            warn!("Terminal '{}' has no command, skipping", definition.name);
            return None;
        }

        trace!(
            "Running '{}' from {}",
            definition.name,
            config.config_path.display()
        );
        let options = self.terminal_options(definition, root, substitutions, parent);

        let Some(key) = &definition.persistent else {
            let id = self.spawn(definition, &options, commands).await?;
            return Some(TerminalHandle::spawned(id, &definition.name, definition.display));
        };

        let session = match self.host.session_id().await {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    "Cannot identify the host session, '{}' will not be reused: {}",
                    definition.name, e
                );
                let id = self.spawn(definition, &options, commands).await?;
                return Some(TerminalHandle::spawned(id, &definition.name, definition.display));
            }
        };

        let mut slot = self.registry.slot(key).await;
        if let Some(existing) = slot.get() {
            if !existing.belongs_to(&session) {
                debug!(
                    "Persistent terminal {} for key '{}' belongs to another host session",
                    existing.id, key
                );
            } else if self.host.is_alive(&existing.id).await {
                debug!(
                    "Reusing persistent terminal {} for '{}' (key '{}')",
                    existing.id, definition.name, key
                );
                return Some(TerminalHandle::reused(
                    existing.id.clone(),
                    &definition.name,
                    definition.display,
                ));
            } else {
                debug!("Persistent terminal {} for key '{}' is gone", existing.id, key);
            }
        }

        let id = self.spawn(definition, &options, commands).await?;
        if let Err(e) = slot.put(RegistryEntry::new(id.clone(), session)).await {
            warn!("Failed to register persistent terminal '{}': {}", key, e);
        }
        Some(TerminalHandle::spawned(id, &definition.name, definition.display))
    }

    async fn spawn(
        &self,
        definition: &TerminalDefinition,
        options: &TerminalOptions,
        commands: Vec<String>,
    ) -> Option<TerminalId> {
        let id = match self.host.create_terminal(options).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to create terminal '{}': {}", definition.name, e);
                return None;
            }
        };

        debug!(
            "Spawned terminal {} for '{}'{}",
            id,
            definition.name,
            options
                .parent
                .as_ref()
                .map(|parent| format!(" (split of {})", parent))
                .unwrap_or_default()
        );

        for input in send_plan(commands, definition.execute) {
            if let Err(e) = self.host.send_text(&id, &input.text, input.submit).await {
                warn!("Failed to send input to '{}': {}", definition.name, e);
                break;
            }
        }

        Some(id)
    }

    fn terminal_options(
        &self,
        definition: &TerminalDefinition,
        root: Option<&Path>,
        substitutions: &SubstitutionMap,
        parent: Option<&TerminalHandle>,
    ) -> TerminalOptions {
        let base = root.map(Path::to_path_buf);
        let cwd = match &definition.cwd {
            Some(cwd) => {
                let cwd = if definition.substitution {
                    PathBuf::from(substitutions.apply(cwd))
                } else {
                    PathBuf::from(cwd)
                };
                match &base {
                    Some(base) if cwd.is_relative() => Some(base.join(cwd)),
                    _ => Some(cwd),
                }
            }
            None => base,
        };

        TerminalOptions {
            name: definition.name.clone(),
            cwd,
            env: definition.env.clone(),
            shell_path: definition.shell_path.clone(),
            shell_args: definition.shell_args.clone(),
            parent: parent.map(|handle| handle.id.clone()),
        }
    }
}
