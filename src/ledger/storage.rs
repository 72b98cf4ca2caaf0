//! Flat-file persistence of history logs.

use super::RoundEntry;
use crate::error::LedgerError;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read a history log. Missing, unreadable or corrupt files yield an empty history.
pub(crate) fn load_history(path: &Path) -> Vec<RoundEntry> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No history at {}", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Failed to read history {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                "Ignoring corrupt history {} ({}); treating it as empty",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Serialize `entries` into a sibling temporary file. The caller commits it
/// with [`commit_staged`].
pub(crate) fn stage_history(path: &Path, entries: &[RoundEntry]) -> Result<PathBuf, LedgerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| LedgerError::write(parent, e))?;
    }

    let content = to_pretty_json(entries)?;
    let staged = staging_path(path);

    let mut file = File::create(&staged).map_err(|e| LedgerError::write(&staged, e))?;
    file.write_all(&content)
        .and_then(|_| file.sync_all())
        .map_err(|e| LedgerError::write(&staged, e))?;

    Ok(staged)
}

/// Atomically replace `path` with a previously staged file.
pub(crate) fn commit_staged(staged: &Path, path: &Path) -> Result<(), LedgerError> {
    fs::rename(staged, path).map_err(|e| LedgerError::write(path, e))
}

/// Drop a staged file that will not be committed.
pub(crate) fn discard_staged(staged: &Path) {
    if let Err(e) = fs::remove_file(staged) {
        debug!("Could not remove staged file {}: {}", staged.display(), e);
    }
}

/// Current bytes of `path`, or `None` when it does not exist yet.
pub(crate) fn snapshot(path: &Path) -> Result<Option<Vec<u8>>, LedgerError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LedgerError::write(path, e)),
    }
}

/// Put `path` back to a state taken with [`snapshot`].
pub(crate) fn restore(path: &Path, snapshot: Option<&[u8]>) -> Result<(), LedgerError> {
    match snapshot {
        Some(bytes) => {
            let staged = staging_path(path);
            fs::write(&staged, bytes).map_err(|e| LedgerError::write(&staged, e))?;
            commit_staged(&staged, path)
        }
        None => match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LedgerError::write(path, e)),
        },
    }
}

/// Write `text` to `path`, replacing previous content.
pub(crate) fn write_text(path: &Path, text: &str) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| LedgerError::write(parent, e))?;
    }
    fs::write(path, text).map_err(|e| LedgerError::write(path, e))
}

// Matches the 4-space layout of the existing history files.
fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, LedgerError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("history"));
    name.push(".tmp");
    path.with_file_name(name)
}
