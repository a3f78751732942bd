//! Configuration Model
//!
//! The resolved configuration for one trigger: the ordered terminal
//! definitions from the document plus the global settings around them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{TerminalDefinition, Trigger};

/// On-disk configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Run the batch automatically at startup
    #[serde(default)]
    pub autorun: bool,

    /// Terminal definitions in declaration order
    #[serde(default)]
    pub terminals: Vec<TerminalDefinition>,
}

/// Configuration resolved for a root context
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Run the batch automatically at startup
    pub autorun: bool,

    /// Where the document lives (whether or not it exists yet)
    pub config_path: PathBuf,

    /// Terminal definitions in declaration order
    pub terminals: Vec<TerminalDefinition>,
}

impl Configuration {
    /// Build a configuration from a parsed document
    pub fn from_document(document: ConfigDocument, config_path: PathBuf) -> Self {
        Self {
            autorun: document.autorun,
            config_path,
            terminals: document.terminals,
        }
    }

    /// An empty configuration pointing at `config_path`
    pub fn empty(config_path: PathBuf) -> Self {
        Self::from_document(ConfigDocument::default(), config_path)
    }

    /// Definitions eligible for `trigger`, in configuration order
    pub fn eligible(&self, trigger: Trigger) -> Vec<&TerminalDefinition> {
        self.terminals
            .iter()
            .filter(|terminal| terminal.is_eligible(trigger))
            .collect()
    }

    /// First definition named `name`
    pub fn find_by_name(&self, name: &str) -> Option<&TerminalDefinition> {
        self.terminals.iter().find(|terminal| terminal.name == name)
    }

    /// Every member of `group`, in configuration order
    pub fn group_members(&self, group: &str) -> Vec<&TerminalDefinition> {
        self.terminals
            .iter()
            .filter(|terminal| terminal.in_group(group))
            .collect()
    }

    /// Distinct group names, in order of first appearance
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for group in self.terminals.iter().filter_map(|t| t.group.as_deref()) {
            if !names.contains(&group) {
                names.push(group);
            }
        }
        names
    }
}
