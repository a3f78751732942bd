//! Configuration management for Termdeck
//!
//! This module locates the workspace root, reads the terminal configuration
//! document for it and bootstraps a default document when none exists.
//! Nothing is cached: every trigger asks the [`ConfigProvider`] again, so
//! edits to the document take effect on the next run.

pub mod defaults;
pub mod loader;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::Configuration;

pub use defaults::default_document;
pub use loader::{ConfigFormat, ConfigLoader, DEFAULT_CONFIG_PATH};

/// Supplies the configuration for a root context
pub trait ConfigProvider: Send + Sync {
    /// Load the configuration for `root`
    ///
    /// Without a root, or without a document, the configuration is empty.
    ///
    /// # Errors
    /// Returns an error if an existing document cannot be read or parsed
    fn load(&self, root: Option<&Path>) -> Result<Configuration>;

    /// Where the document for `root` lives
    fn config_path(&self, root: &Path) -> PathBuf;
}

/// [`ConfigProvider`] reading the document from disk on every call
#[derive(Debug, Clone, Default)]
pub struct FileConfigProvider {
    loader: ConfigLoader,
}

impl FileConfigProvider {
    /// Provider using `loader`
    pub fn new(loader: ConfigLoader) -> Self {
        Self { loader }
    }

    /// The underlying loader
    pub fn loader(&self) -> &ConfigLoader {
        &self.loader
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load(&self, root: Option<&Path>) -> Result<Configuration> {
        let Some(root) = root else {
            debug!("No workspace root, using an empty configuration");
            return Ok(Configuration::empty(self.loader.relative_path().to_path_buf()));
        };

        let path = self.loader.config_path(root);
        match self.loader.read(&path)? {
            Some(document) => {
                debug!(
                    "Loaded {} terminal definitions from {}",
                    document.terminals.len(),
                    path.display()
                );
                Ok(Configuration::from_document(document, path))
            }
            None => {
                debug!("No configuration at {}", path.display());
                Ok(Configuration::empty(path))
            }
        }
    }

    fn config_path(&self, root: &Path) -> PathBuf {
        self.loader.config_path(root)
    }
}

/// Find the workspace root for `start`
///
/// Walks up from `start` to the first directory holding `relative_config`;
/// failing that, to the first directory holding `.git`.
pub fn discover_root(start: &Path, relative_config: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(relative_config).is_file())
        .or_else(|| start.ancestors().find(|dir| dir.join(".git").exists()))
        .map(Path::to_path_buf)
}

/// Write the default document to `path` unless a document is already there
///
/// Only a missing or blank file is replaced. Returns whether a file was
/// written.
///
/// # Errors
/// Returns [`Error::ConfigLoadFailed`] if an existing file cannot be read
pub fn init_config(loader: &ConfigLoader, path: &Path) -> Result<bool> {
    match std::fs::read_to_string(path) {
        Ok(existing) if !existing.trim().is_empty() => {
            debug!("Configuration already present at {}", path.display());
            return Ok(false);
        }
        Ok(_) => debug!("Configuration at {} is blank", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(Error::ConfigLoadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    }

    loader.write(path, &default_document())?;
    info!("Created default configuration at {}", path.display());
    Ok(true)
}

/// Resolve the root required by bootstrap operations
pub fn require_root(root: Option<&Path>) -> Result<&Path> {
    root.ok_or(Error::NoProjectOpen)
}
