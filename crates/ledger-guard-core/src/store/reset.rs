use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{GuardError, Result};
use crate::signal::StopSignal;
use crate::surface::DbHandle;

use super::chain::verify_chain;
use super::ledger::LedgerDb;

/// Scan `db`; if it is corrupted, move the file aside and start over with
/// an empty database at the same path.
///
/// A clean database is handed back as-is. A corrupted read-only database
/// is never touched.
pub(crate) fn reset_corrupt_db(db: LedgerDb, stop: &StopSignal) -> Result<LedgerDb> {
    let reason = match verify_chain(&db, stop) {
        Ok(_) => return Ok(db),
        Err(GuardError::CorruptDb(reason)) => reason,
        Err(GuardError::VerificationStopped) => return Err(GuardError::VerificationStopped),
        Err(e) => return Err(GuardError::Reset(e.to_string())),
    };

    if db.is_read_only() {
        return Err(GuardError::Reset(format!(
            "database is corrupted ({reason}) but opened read-only"
        )));
    }

    tracing::warn!(%reason, path = ?db.path(), "database is corrupted, resetting");

    let path = db.path().to_path_buf();
    // The file must be closed before it can be moved.
    drop(db);

    let backup = corrupt_backup_path(&path);
    std::fs::rename(&path, &backup)
        .map_err(|e| GuardError::Reset(format!("moving {path:?} to {backup:?}: {e}")))?;
    tracing::info!(backup = ?backup, "corrupted database moved aside");

    LedgerDb::open(&path, false).map_err(|e| GuardError::Reset(e.to_string()))
}

/// `<dir>/<name>.corrupt-<UTC timestamp>`, with a counter suffix if that
/// name is already taken.
fn corrupt_backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ledger.db".to_string());
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
    let base = path.with_file_name(format!("{name}.corrupt-{stamp}"));

    let mut candidate = base.clone();
    let mut n = 1;
    while candidate.exists() {
        let mut file = base.as_os_str().to_os_string();
        file.push(format!(".{n}"));
        candidate = PathBuf::from(file);
        n += 1;
    }
    candidate
}
