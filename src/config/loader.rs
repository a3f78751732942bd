//! Configuration File Loading
//!
//! Reads and writes the terminal configuration document. The format follows
//! the file extension: `.toml` files are TOML, everything else is JSON.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::ConfigDocument;

/// Location of the document relative to the workspace root
pub const DEFAULT_CONFIG_PATH: &str = ".vscode/terminals.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

impl ConfigFormat {
    /// Format implied by the extension of `path`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            ConfigFormat::Toml => "TOML",
        }
    }
}

/// Configuration file loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Document path relative to the workspace root
    relative_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the default document location
    pub fn new() -> Self {
        Self {
            relative_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Use a different document path relative to the workspace root
    pub fn with_relative_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.relative_path = path.into();
        self
    }

    /// Document path relative to the workspace root
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Absolute document path for `root`
    pub fn config_path(&self, root: &Path) -> PathBuf {
        if self.relative_path.is_absolute() {
            self.relative_path.clone()
        } else {
            root.join(&self.relative_path)
        }
    }

    /// Read the document at `path`; `Ok(None)` when the file does not exist
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn read(&self, path: &Path) -> Result<Option<ConfigDocument>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        Self::parse(&content, ConfigFormat::from_path(path)).map(Some)
    }

    /// Parse a document in `format`
    pub fn parse(content: &str, format: ConfigFormat) -> Result<ConfigDocument> {
        let parsed = match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|reason| Error::ConfigParseFailed {
            format: format.name().to_string(),
            reason,
        })
    }

    /// Render a document in `format`; JSON is indented by two spaces
    pub fn render(document: &ConfigDocument, format: ConfigFormat) -> Result<String> {
        let rendered = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(document).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::to_string_pretty(document).map_err(|e| e.to_string()),
        };

        rendered.map_err(|reason| Error::ConfigParseFailed {
            format: format.name().to_string(),
            reason,
        })
    }

    /// Write `document` to `path`, creating parent directories
    pub fn write(&self, path: &Path, document: &ConfigDocument) -> Result<()> {
        let content = Self::render(document, ConfigFormat::from_path(path))?;

        let save_failed = |e: std::io::Error| Error::ConfigSaveFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(save_failed)?;
        }
        fs::write(path, content).map_err(save_failed)?;

        debug!("Wrote configuration to {}", path.display());
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
