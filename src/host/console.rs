//! Console user interaction
//!
//! Picks are rendered as a numbered list on stderr and answered on stdin, so
//! stdout stays clean for scripting. Files open in `$VISUAL`, `$EDITOR`, or
//! `vi` as the last resort.

use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::HostUi;
use crate::error::{Error, Result};

/// Terminal-based [`HostUi`]
#[derive(Debug, Clone, Default)]
pub struct ConsoleUi {
    /// Editor override, otherwise taken from the environment
    editor: Option<String>,
}

impl ConsoleUi {
    /// Create a console UI using the environment's editor
    pub fn new() -> Self {
        Self::default()
    }

    /// Always open files with `editor`
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = Some(editor.into());
        self
    }

    fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|editor| !editor.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string())
    }
}

/// Interpret a pick answer: a 1-based index or an exact item
pub fn parse_selection(answer: &str, items: &[String]) -> Option<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }

    match answer.parse::<usize>() {
        Ok(n) if (1..=items.len()).contains(&n) => Some(n - 1),
        _ => items.iter().position(|item| item == answer),
    }
}

#[async_trait]
impl HostUi for ConsoleUi {
    async fn pick(&self, title: &str, items: &[String]) -> Option<usize> {
        if items.is_empty() {
            return None;
        }

        eprintln!("{}", title);
        for (index, item) in items.iter().enumerate() {
            eprintln!("  {:>2}) {}", index + 1, item);
        }
        eprint!("> ");

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut answer).await {
            Ok(0) => None,
            Ok(_) => parse_selection(&answer, items),
            Err(e) => {
                warn!("Failed to read selection: {}", e);
                None
            }
        }
    }

    async fn show_error(&self, message: &str) {
        error!("{}", message);
        eprintln!("termdeck: {}", message);
    }

    async fn open_file(&self, path: &Path) -> Result<()> {
        let editor = self.editor();
        let mut parts = editor.split_whitespace();
        let program = parts.next().unwrap_or("vi");

        debug!("Opening {} with {}", path.display(), editor);
        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Other(format!(
                "editor '{}' exited with {}",
                editor, status
            )))
        }
    }
}
