//! Terminal Handle Model
//!
//! Identity of a host terminal and the handle returned by the runner.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DisplayIntent;

/// Host-assigned terminal identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerminalId(String);

impl TerminalId {
    /// Wrap a host identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw host identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of running one definition
///
/// Carries a copy of the originating definition's display intent so the
/// orchestration layer can pick which terminal to show without going back
/// to the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalHandle {
    /// Host terminal this handle refers to
    pub id: TerminalId,
    /// Name of the originating definition
    pub name: String,
    /// Visibility requested by the definition
    pub intent: DisplayIntent,
    /// True when an existing persistent terminal was reused
    pub reused: bool,
}

impl TerminalHandle {
    /// Create a handle for a freshly spawned terminal
    pub fn spawned(id: TerminalId, name: impl Into<String>, intent: DisplayIntent) -> Self {
        Self {
            id,
            name: name.into(),
            intent,
            reused: false,
        }
    }

    /// Create a handle for a reused persistent terminal
    pub fn reused(id: TerminalId, name: impl Into<String>, intent: DisplayIntent) -> Self {
        Self {
            reused: true,
            ..Self::spawned(id, name, intent)
        }
    }
}
