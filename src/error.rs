//! Error types and Result aliases for Termdeck

use std::fmt;
use std::path::PathBuf;

/// Result type alias for Termdeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Termdeck
#[derive(Debug)]
pub enum Error {
    // === Orchestration errors (user-facing) ===
    /// No definition is eligible for the requested trigger
    NoTerminalsDefined,

    /// Group name resolved, but no definition belongs to it
    GroupNotFound {
        group: String,
    },

    /// Interactive group pick was dismissed or offered nothing to pick
    NoGroupSelected,

    /// No workspace root could be resolved
    NoProjectOpen,

    // === Configuration errors ===
    /// Failed to read the configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to parse the configuration document
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    /// Failed to write the configuration file
    ConfigSaveFailed {
        path: PathBuf,
        reason: String,
    },

    // === Host errors ===
    /// A host command (e.g. tmux) exited unsuccessfully
    HostCommandFailed {
        command: String,
        reason: String,
    },

    /// The terminal host cannot be reached at all
    HostUnavailable {
        reason: String,
    },

    /// The host does not know the given terminal
    TerminalNotFound {
        id: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// JSON serialization errors
    Serde(serde_json::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors
    Other(String),
}

impl Error {
    /// Message shown to the user when an entry point aborts with this error
    pub fn user_message(&self) -> String {
        match self {
            Error::NoTerminalsDefined => "No terminals defined, edit the configuration".to_string(),
            Error::GroupNotFound { group } => {
                format!("Terminal group '{}' not found, edit the configuration", group)
            }
            Error::NoGroupSelected => "No terminal group selected, try again".to_string(),
            Error::NoProjectOpen => {
                "You have to open a project before being able to edit its configuration".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Orchestration errors
            Error::NoTerminalsDefined => write!(f, "No terminals defined"),
            Error::GroupNotFound { group } => write!(f, "Terminal group '{}' not found", group),
            Error::NoGroupSelected => write!(f, "No terminal group selected"),
            Error::NoProjectOpen => write!(f, "No project open"),

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }
            Error::ConfigSaveFailed { path, reason } => {
                write!(f, "Failed to save config to '{}': {}", path.display(), reason)
            }

            // Host errors
            Error::HostCommandFailed { command, reason } => {
                write!(f, "Host command '{}' failed: {}", command, reason)
            }
            Error::HostUnavailable { reason } => write!(f, "Terminal host unavailable: {}", reason),
            Error::TerminalNotFound { id } => write!(f, "Terminal '{}' not found", id),

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
