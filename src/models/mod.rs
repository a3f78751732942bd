//! Core data models for Termdeck
//!
//! This module contains the domain entities the launcher works with:
//! terminal definitions, the configuration that holds them, and the
//! handles produced when a definition is run.

pub mod configuration;
pub mod definition;
pub mod handle;

// Re-exports for convenience
pub use configuration::{ConfigDocument, Configuration};
pub use definition::{CommandSpec, DefinitionError, DisplayIntent, TerminalDefinition, Trigger};
pub use handle::{TerminalHandle, TerminalId};
