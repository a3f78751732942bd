//! Persistent Terminal Registry
//!
//! Associates a definition's `persistent` key with the host terminal spawned
//! for it, so later runs reuse that terminal instead of spawning a new one.
//!
//! Each key has its own lock. The runner holds a key's [`RegistrySlot`] across
//! the whole check-then-spawn-then-register sequence, which keeps concurrent
//! triggers from spawning the same persistent terminal twice, while runs for
//! different keys never wait on each other.
//!
//! Every entry records the host session its terminal belongs to. Terminal ids
//! are only meaningful inside that session (tmux numbers panes from zero
//! again after a server restart), so the runner ignores entries from another
//! session as well as entries whose terminal was closed.
//!
//! The registry can optionally mirror its entries to a JSON file, letting
//! separate launcher processes talking to the same host share it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::{Error, Result};
use crate::models::TerminalId;

/// A registered persistent terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Host terminal
    pub id: TerminalId,
    /// Host session `id` was issued by
    pub session: String,
}

impl RegistryEntry {
    /// Entry for `id` issued by `session`
    pub fn new(id: TerminalId, session: impl Into<String>) -> Self {
        Self {
            id,
            session: session.into(),
        }
    }

    /// Whether this entry was issued by `session`
    pub fn belongs_to(&self, session: &str) -> bool {
        self.session == session
    }
}

type Slot = Arc<AsyncMutex<Option<RegistryEntry>>>;

/// Process-wide map from persistent key to live terminal
#[derive(Debug, Default)]
pub struct PersistentRegistry {
    /// Per-key slots, created on first use
    slots: Mutex<HashMap<String, Slot>>,
    /// Durable mirror of every registered entry
    snapshot: Mutex<BTreeMap<String, RegistryEntry>>,
    /// Serializes writes of the backing file
    write_lock: AsyncMutex<()>,
    /// Backing file for `snapshot`
    store: Option<PathBuf>,
}

/// Exclusive access to one key of the registry
pub struct RegistrySlot<'a> {
    key: String,
    guard: OwnedMutexGuard<Option<RegistryEntry>>,
    registry: &'a PersistentRegistry,
}

impl PersistentRegistry {
    /// Create an empty in-memory registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry mirrored to `path`, loading entries already stored there
    ///
    /// A missing file starts an empty registry.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn with_store(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries: BTreeMap<String, RegistryEntry> = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                    format: "JSON".to_string(),
                    reason: format!("{}: {}", path.display(), e),
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(
            "Loaded {} persistent terminal entries from {}",
            entries.len(),
            path.display()
        );

        let slots = entries
            .iter()
            .map(|(key, entry)| (key.clone(), Arc::new(AsyncMutex::new(Some(entry.clone())))))
            .collect();

        Ok(Self {
            slots: Mutex::new(slots),
            snapshot: Mutex::new(entries),
            write_lock: AsyncMutex::new(()),
            store: Some(path),
        })
    }

    /// Backing file, if any
    pub fn store_path(&self) -> Option<&Path> {
        self.store.as_deref()
    }

    /// Lock `key` for a check-then-register sequence
    pub async fn slot(&self, key: &str) -> RegistrySlot<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.entry(key.to_string()).or_default().clone()
        };

        RegistrySlot {
            key: key.to_string(),
            guard: slot.lock_owned().await,
            registry: self,
        }
    }

    /// Entry registered under `key`
    pub async fn get(&self, key: &str) -> Option<RegistryEntry> {
        self.slot(key).await.get().cloned()
    }

    /// Register `entry` under `key`
    pub async fn put(&self, key: &str, entry: RegistryEntry) -> Result<()> {
        self.slot(key).await.put(entry).await
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn record(&self, key: &str, entry: &RegistryEntry) -> Result<()> {
        // Held through the write so the file never ends on an older snapshot.
        let _writing = self.write_lock.lock().await;

        let content = {
            let mut snapshot = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
            snapshot.insert(key.to_string(), entry.clone());
            match &self.store {
                Some(_) => serde_json::to_string_pretty(&*snapshot)?,
                None => return Ok(()),
            }
        };

        if let Some(path) = &self.store {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, content).await?;
            trace!("Persisted registry to {}", path.display());
        }

        Ok(())
    }
}

impl RegistrySlot<'_> {
    /// The key this slot guards
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Entry currently registered under the key
    pub fn get(&self) -> Option<&RegistryEntry> {
        self.guard.as_ref()
    }

    /// Register `entry` under the key, replacing any previous entry
    pub async fn put(&mut self, entry: RegistryEntry) -> Result<()> {
        self.registry.record(&self.key, &entry).await?;
        *self.guard = Some(entry);
        Ok(())
    }
}
