//! Persisting the merged table and deciding whether the host must restart.
//!
//! The merged table only becomes active after the host reloads it, so a
//! content change is always paired with a restart request. A zero-byte
//! sentinel file marks an outstanding request; while it exists the restart
//! primitive is not re-invoked, which bounds restart loops when the host
//! keeps coming back with the same pending change.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::host::RestartHost;
use crate::table::ResourceTable;

/// Result of a reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// On-disk table already matched; no write, no restart.
    Unchanged,
    /// On-disk state changed and the restart fired, but no new table was
    /// written: the stale persisted table was removed (revert to baseline).
    Written,
    /// New table content written and the host restart primitive invoked.
    WrittenAndRestartRequested,
    /// On-disk state changed but a restart request was already outstanding;
    /// the restart primitive was not re-invoked.
    RestartSuppressed,
}

/// Failures fatal to this run's reconciliation. No restart is requested on
/// any of them: the new table was not durably stored.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to create directory {dir}: {source}")]
    CreateDir { dir: PathBuf, source: io::Error },

    #[error("failed to read existing table {file}: {source}")]
    ReadExisting { file: PathBuf, source: io::Error },

    #[error("failed to write table {file}: {source}")]
    Write { file: PathBuf, source: io::Error },

    #[error("failed to remove stale table {file}: {source}")]
    Remove { file: PathBuf, source: io::Error },

    #[error("failed to encode table: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Disposition of a restart request.
enum RestartDecision {
    Triggered,
    AlreadyPending,
}

/// Serialize the table canonically, compare against the persisted copy, and
/// write + request a restart only when the content actually differs.
pub fn reconcile(
    table: &ResourceTable,
    target: &Path,
    sentinel: &Path,
    restart: &dyn RestartHost,
) -> Result<ReconcileOutcome, PersistError> {
    let latest = table.canonical_json()?;

    if let Some(dir) = target.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
            dir: dir.to_path_buf(),
            source,
        })?;
    }

    let existing = match fs::read(target) {
        Ok(bytes) => Some(bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(source) => {
            return Err(PersistError::ReadExisting {
                file: target.to_path_buf(),
                source,
            });
        }
    };

    if existing.as_deref() == Some(latest.as_bytes()) {
        return Ok(ReconcileOutcome::Unchanged);
    }

    fs::write(target, &latest).map_err(|source| PersistError::Write {
        file: target.to_path_buf(),
        source,
    })?;
    log::info!("stored merged resource table at {}", target.display());

    match request_restart(sentinel, restart) {
        RestartDecision::Triggered => Ok(ReconcileOutcome::WrittenAndRestartRequested),
        RestartDecision::AlreadyPending => Ok(ReconcileOutcome::RestartSuppressed),
    }
}

/// The zero-fragment special case: the persisted table no longer has any
/// source, so delete it and restart into the baseline-only state. The merge
/// and compare paths are bypassed entirely.
pub fn revert_to_baseline(
    target: &Path,
    sentinel: &Path,
    restart: &dyn RestartHost,
) -> Result<ReconcileOutcome, PersistError> {
    if !target.is_file() {
        return Ok(ReconcileOutcome::Unchanged);
    }

    fs::remove_file(target).map_err(|source| PersistError::Remove {
        file: target.to_path_buf(),
        source,
    })?;
    log::info!("removed stale resource table {}", target.display());

    match request_restart(sentinel, restart) {
        RestartDecision::Triggered => Ok(ReconcileOutcome::Written),
        RestartDecision::AlreadyPending => Ok(ReconcileOutcome::RestartSuppressed),
    }
}

/// Sentinel-guarded restart. A failed sentinel write is logged but does not
/// stop the restart itself; staying on a stale table silently is worse than
/// a possible duplicate restart.
fn request_restart(sentinel: &Path, restart: &dyn RestartHost) -> RestartDecision {
    if sentinel.is_file() {
        log::info!("restart already pending, not re-triggering");
        return RestartDecision::AlreadyPending;
    }

    if let Err(err) = fs::write(sentinel, b"") {
        log::error!("cannot write restart flag {}: {err}", sentinel.display());
    }

    log::info!("requesting host restart");
    restart.trigger_restart();
    RestartDecision::Triggered
}
