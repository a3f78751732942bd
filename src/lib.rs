//! Termdeck - a configuration-driven terminal launcher
//!
//! Termdeck reads a declarative list of terminal definitions (commands,
//! grouping, focus behaviour, persistence) and drives a terminal host to
//! execute them, substituting context tokens such as `[file]` or
//! `[lineNumber]` into the command text.
//!
//! ## Module Organization
//!
//! ### Core
//!
//! - [`engine`] - Trigger entry points and the focus tie-break
//! - [`runner`] - Runs one definition: spawn or reuse, then send commands
//! - [`registry`] - Persistent terminal registry with per-key locking
//!
//! ### Collaborators
//!
//! - [`config`] - Root discovery, document loading, default bootstrap
//! - [`substitution`] - Context token resolution and replacement
//! - [`host`] - Terminal host and UI traits, tmux/console/dry-run backends
//! - [`models`] - Definitions, configuration, handles
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use termdeck::config::FileConfigProvider;
//! use termdeck::host::{ConsoleUi, TmuxHost};
//! use termdeck::substitution::ContextResolver;
//! use termdeck::{Orchestrator, PersistentRegistry, TerminalRunner};
//!
//! # async fn demo() {
//! let runner = TerminalRunner::new(
//!     Arc::new(TmuxHost::new()),
//!     Arc::new(PersistentRegistry::new()),
//! );
//! let orchestrator = Orchestrator::new(
//!     Arc::new(FileConfigProvider::default()),
//!     Arc::new(ContextResolver::default()),
//!     runner,
//!     Arc::new(ConsoleUi::new()),
//!     Some("/path/to/project".into()),
//! );
//!
//! let report = orchestrator.run_all(None).await;
//! println!("{} terminals started", report.handles.len());
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Batch runs dispatch every definition concurrently and join before picking
//! the terminal to show. Group runs are strictly sequential because each
//! member splits from the previous one. The persistent registry is the only
//! shared mutable state and locks per key.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod host;
pub mod models;
pub mod substitution;

// Core modules
pub mod engine;
pub mod registry;
pub mod runner;

// Re-exports for core functionality
pub use engine::{Orchestrator, RunReport};
pub use error::{Error, Result};
pub use models::{Configuration, TerminalDefinition, TerminalHandle, TerminalId};
pub use registry::{PersistentRegistry, RegistryEntry};
pub use runner::TerminalRunner;

/// The current version of Termdeck from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");
