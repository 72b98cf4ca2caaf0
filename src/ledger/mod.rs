//! Durable record of game rounds.
//!
//! Two logs are kept on disk: the full history, which only grows until a
//! reset, and a recent window holding the last `max_recent` rounds. Every
//! append lands in both logs under one lock, so the recent window is always
//! a suffix of the full history.

mod entry;
mod format;
mod storage;

pub use entry::{normalize_color, RoundEntry, RoundStatus, SOURCE_LABEL, TIMESTAMP_FORMAT};
pub use format::{format_history_text, EMPTY_HISTORY};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Which of the two persisted logs to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLog {
    Full,
    Recent,
}

/// Sizes of both logs, read under the same lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryCounts {
    pub full: usize,
    pub recent: usize,
}

pub struct LedgerStore {
    config: LedgerConfig,
    // Serializes every load+mutate+save cycle over the two files.
    lock: Mutex<()>,
}

impl LedgerStore {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Read one log. Never fails: absent or corrupt state reads as empty.
    ///
    /// The recent log is cut to `max_recent`, so a lowered cap applies
    /// before the next append rewrites the file.
    pub fn load(&self, log: HistoryLog) -> Vec<RoundEntry> {
        let _guard = self.guard();
        match log {
            HistoryLog::Full => storage::load_history(&self.config.full_path),
            HistoryLog::Recent => self.recent_window(),
        }
    }

    /// Record a round in both logs and return the stored entry.
    pub fn append(&self, color: &str, status: RoundStatus) -> Result<RoundEntry, LedgerError> {
        let _guard = self.guard();

        let mut full = storage::load_history(&self.config.full_path);
        let mut recent = self.recent_window();

        let entry = RoundEntry::new(full.len() as u64 + 1, color, status)?;

        full.push(entry.clone());
        recent.push(entry.clone());

        if recent.len() > self.config.max_recent {
            let evicted = recent.remove(0);
            debug!("Evicted round {} from the recent window", evicted.round);
        }

        self.persist(&full, &recent)?;

        info!(
            round = entry.round,
            status = %entry.status,
            color = %entry.color,
            "Recorded round"
        );

        Ok(entry)
    }

    /// Empty both logs.
    pub fn reset(&self) -> Result<(), LedgerError> {
        let _guard = self.guard();
        self.persist(&[], &[])?;
        info!("History reset");
        Ok(())
    }

    pub fn counts(&self) -> HistoryCounts {
        let _guard = self.guard();
        HistoryCounts {
            full: storage::load_history(&self.config.full_path).len(),
            recent: self.recent_window().len(),
        }
    }

    /// Write the full history as text to the configured export file.
    pub fn export_full(&self) -> Result<PathBuf, LedgerError> {
        let text = format_history_text(&self.load(HistoryLog::Full));
        storage::write_text(&self.config.export_path, &text)?;
        debug!("Exported full history to {}", self.config.export_path.display());
        Ok(self.config.export_path.clone())
    }

    fn recent_window(&self) -> Vec<RoundEntry> {
        let mut recent = storage::load_history(&self.config.recent_path);
        let cap = self.config.max_recent;
        if recent.len() > cap {
            recent.drain(..recent.len() - cap);
        }
        recent
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Stage both files before committing either. The full log is committed
    // first and rolled back if the recent log cannot follow it.
    fn persist(&self, full: &[RoundEntry], recent: &[RoundEntry]) -> Result<(), LedgerError> {
        let full_path = &self.config.full_path;
        let recent_path = &self.config.recent_path;

        let staged_full = storage::stage_history(full_path, full)?;
        let staged_recent = match storage::stage_history(recent_path, recent) {
            Ok(path) => path,
            Err(e) => {
                storage::discard_staged(&staged_full);
                return Err(e);
            }
        };

        let previous_full = match storage::snapshot(full_path) {
            Ok(previous) => previous,
            Err(e) => {
                storage::discard_staged(&staged_full);
                storage::discard_staged(&staged_recent);
                return Err(e);
            }
        };

        if let Err(e) = storage::commit_staged(&staged_full, full_path) {
            storage::discard_staged(&staged_full);
            storage::discard_staged(&staged_recent);
            return Err(e);
        }

        if let Err(e) = storage::commit_staged(&staged_recent, recent_path) {
            storage::discard_staged(&staged_recent);
            if let Err(rollback) = storage::restore(full_path, previous_full.as_deref()) {
                error!(
                    "Failed to roll back {} after a failed save: {}",
                    full_path.display(),
                    rollback
                );
            }
            return Err(e);
        }
        Ok(())
    }
}
