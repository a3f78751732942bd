//! Terminal Definition Model
//!
//! A terminal definition is one declared unit of terminal work: the commands
//! to type into a shell plus the flags that decide when it is eligible to run,
//! whether it is reused, how it is grouped and whether it is shown afterwards.
//!
//! On disk a definition carries either `command` (a single string) or
//! `commands` (an ordered list). In memory that pair is folded into
//! [`CommandSpec`], so the runner never has to probe for field presence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Definition validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("terminal definition has an empty name")]
    EmptyName,

    #[error("terminal '{0}' sets both `command` and `commands`")]
    ConflictingCommands(String),
}

/// The command text of a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    /// One command, `command` in the document
    Single(String),
    /// Ordered command sequence, `commands` in the document
    Multi(Vec<String>),
}

impl CommandSpec {
    /// Commands in send order
    pub fn as_slice(&self) -> &[String] {
        match self {
            CommandSpec::Single(command) => std::slice::from_ref(command),
            CommandSpec::Multi(commands) => commands,
        }
    }
}

/// Kind of trigger asking for a candidate set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// "Run all" batch, including autorun at startup
    Batch,
    /// Interactive single-terminal pick
    SinglePick,
}

/// Post-spawn visibility requested by a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayIntent {
    /// Make the terminal the active visible one
    pub open: bool,
    /// Make it visible and give it keyboard focus; implies `open`
    pub focus: bool,
}

impl DisplayIntent {
    /// Whether the terminal should be shown at all
    pub fn wants_display(&self) -> bool {
        self.open || self.focus
    }

    /// Whether showing the terminal should leave keyboard focus where it is
    pub fn preserve_focus(&self) -> bool {
        !self.focus
    }
}

/// A named, declarative unit of terminal work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDefinition", into = "RawDefinition")]
pub struct TerminalDefinition {
    /// Unique name within a configuration
    pub name: String,

    /// Display-only description
    pub description: Option<String>,

    /// Command text; `None` when the definition declares no command
    pub commands: Option<CommandSpec>,

    /// When false, the final command is typed but not submitted
    pub execute: bool,

    /// Visibility requested after spawning
    pub display: DisplayIntent,

    /// Identity key for reusing a live terminal across runs
    pub persistent: Option<String>,

    /// Definitions sharing a group spawn as a split chain
    pub group: Option<String>,

    /// Only reachable through by-name and group triggers
    pub only_api: bool,

    /// Excluded from batch triggers
    pub only_single: bool,

    /// Excluded from the interactive single pick
    pub only_multiple: bool,

    /// Working directory, relative paths resolve against the workspace root
    pub cwd: Option<String>,

    /// Extra environment for the spawned terminal
    pub env: BTreeMap<String, String>,

    /// Shell override
    pub shell_path: Option<String>,

    /// Arguments for `shell_path`
    pub shell_args: Vec<String>,

    /// Apply `[token]` substitution to commands and cwd
    pub substitution: bool,
}

impl TerminalDefinition {
    /// Create a definition with one command and default flags
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            commands: Some(CommandSpec::Single(command.into())),
            ..Self::empty(name)
        }
    }

    /// Create a definition sending `commands` in order
    pub fn with_commands<I, S>(name: impl Into<String>, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: Some(CommandSpec::Multi(
                commands.into_iter().map(Into::into).collect(),
            )),
            ..Self::empty(name)
        }
    }

    fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            commands: None,
            execute: true,
            display: DisplayIntent::default(),
            persistent: None,
            group: None,
            only_api: false,
            only_single: false,
            only_multiple: false,
            cwd: None,
            env: BTreeMap::new(),
            shell_path: None,
            shell_args: Vec::new(),
            substitution: true,
        }
    }

    /// Whether this definition may be selected by `trigger`
    ///
    /// Group and by-name triggers bypass these flags entirely.
    pub fn is_eligible(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Batch => !self.only_api && !self.only_single,
            Trigger::SinglePick => !self.only_api && !self.only_multiple,
        }
    }

    /// Whether this definition belongs to `group`
    pub fn in_group(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }
}

/// Document shape of a definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDefinition {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    focus: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    execute: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    persistent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(default, rename = "onlyAPI", skip_serializing_if = "Option::is_none")]
    only_api: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    only_single: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    only_multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cwd: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shell_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    shell_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    substitution: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    commands: Option<Vec<String>>,
}

impl TryFrom<RawDefinition> for TerminalDefinition {
    type Error = DefinitionError;

    fn try_from(raw: RawDefinition) -> Result<Self, Self::Error> {
        if raw.name.trim().is_empty() {
            return Err(DefinitionError::EmptyName);
        }

        let commands = match (raw.command, raw.commands) {
            (Some(_), Some(_)) => return Err(DefinitionError::ConflictingCommands(raw.name)),
            (Some(command), None) => Some(CommandSpec::Single(command)),
            (None, Some(commands)) => Some(CommandSpec::Multi(commands)),
            (None, None) => None,
        };

        Ok(Self {
            name: raw.name,
            description: raw.description,
            commands,
            execute: raw.execute != Some(false),
            display: DisplayIntent {
                open: raw.open == Some(true),
                focus: raw.focus == Some(true),
            },
            persistent: raw.persistent,
            group: raw.group,
            only_api: raw.only_api == Some(true),
            only_single: raw.only_single == Some(true),
            only_multiple: raw.only_multiple == Some(true),
            cwd: raw.cwd,
            env: raw.env,
            shell_path: raw.shell_path,
            shell_args: raw.shell_args,
            substitution: raw.substitution != Some(false),
        })
    }
}

impl From<TerminalDefinition> for RawDefinition {
    fn from(def: TerminalDefinition) -> Self {
        let flag = |set: bool| set.then_some(true);
        let (command, commands) = match def.commands {
            Some(CommandSpec::Single(command)) => (Some(command), None),
            Some(CommandSpec::Multi(commands)) => (None, Some(commands)),
            None => (None, None),
        };

        Self {
            name: def.name,
            description: def.description,
            open: flag(def.display.open),
            focus: flag(def.display.focus),
            execute: (!def.execute).then_some(false),
            persistent: def.persistent,
            group: def.group,
            only_api: flag(def.only_api),
            only_single: flag(def.only_single),
            only_multiple: flag(def.only_multiple),
            cwd: def.cwd,
            env: def.env,
            shell_path: def.shell_path,
            shell_args: def.shell_args,
            substitution: (!def.substitution).then_some(false),
            command,
            commands,
        }
    }
}
