//! Timestamped input/output history.
//!
//! Both the command loop and the notification printer append here, so the
//! entry list sits behind a mutex.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::json::JsonStorage;
use crate::error::StorageError;
use crate::validate::format_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    entries: Vec<HistoryEntry>,
}

#[derive(Debug)]
pub struct HistoryLog {
    entries: Mutex<Vec<HistoryEntry>>,
    storage: JsonStorage,
}

impl HistoryLog {
    pub fn new(storage: JsonStorage) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            storage,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, message: impl Into<String>) {
        self.lock().push(HistoryEntry {
            time: Utc::now(),
            message: message.into(),
        });
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    /// Replace in-memory entries with the persisted ones.
    pub fn load(&self) -> Result<(), StorageError> {
        let file: HistoryFile = self.storage.load_json()?;
        *self.lock() = file.entries;
        Ok(())
    }

    pub fn save(&self) -> Result<(), StorageError> {
        let file = HistoryFile {
            entries: self.entries(),
        };
        self.storage.save_json(&file)
    }

    /// One `date - message` line per entry, oldest first.
    pub fn show(&self) -> String {
        self.lock()
            .iter()
            .map(|e| format!("{} - {}", format_date(e.time), e.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
