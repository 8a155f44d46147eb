//! Analysis history persistence.
//!
//! The most recent analyses are stored under `~/.codelens/history.json` so
//! the `run`, `practice`, and `recall` commands can reuse earlier results
//! across invocations.

use crate::error::{CliError, Result};
use codelens_domain::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A single stored analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Code that was analyzed
    pub code: String,

    /// Language the analysis ran under
    pub language: String,

    /// Full analysis result
    pub result: AnalysisResult,

    /// Unix timestamp of the analysis
    pub timestamp: u64,
}

/// Recent analyses, most recent first, capped to a fixed number of entries.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    limit: usize,
}

impl History {
    /// Get the history file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".codelens").join("history.json"))
    }

    /// Load history from disk, capped to `limit` entries.
    ///
    /// A missing or unreadable file yields an empty history rather than an
    /// error; stale state must never block a new analysis.
    pub fn load(limit: usize) -> Self {
        let mut entries = match Self::path() {
            Ok(path) => Self::read_entries(&path),
            Err(_) => Vec::new(),
        };
        entries.truncate(limit);
        Self { entries, limit }
    }

    fn read_entries(path: &Path) -> Vec<HistoryEntry> {
        if !path.exists() {
            return Vec::new();
        }
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Discarding unreadable history file: {}", e);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }

    /// Save history to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Record a new analysis as the most recent entry, evicting the oldest
    /// when the cap is reached.
    pub fn record(
        &mut self,
        code: impl Into<String>,
        language: impl Into<String>,
        result: AnalysisResult,
    ) {
        self.entries.insert(
            0,
            HistoryEntry {
                code: code.into(),
                language: language.into(),
                result,
                timestamp: unix_now(),
            },
        );
        self.entries.truncate(self.limit);
    }

    /// Look up an entry by position, 1 being the most recent.
    pub fn get(&self, position: usize) -> Option<&HistoryEntry> {
        position.checked_sub(1).and_then(|index| self.entries.get(index))
    }

    /// All entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any analyses are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard all stored entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
