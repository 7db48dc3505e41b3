//! Backup-and-swap installation of a staged candidate.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::warn;

use crate::error::Result;
use crate::utils::fs::{ensure_dir, move_dir};

/// Install `staged` as the new copy of `name` under `dest_root`.
///
/// An existing installed copy is renamed aside to a timestamped backup
/// before the candidate moves in. If the final move fails and the target is
/// still vacant, the backup is restored before the error is returned; a
/// failed restore is logged, not swallowed. Returns the backup path when
/// one was made and the caller asked to keep it.
pub fn replace_skill(
    dest_root: &Path,
    name: &str,
    staged: &Path,
    keep_backup: bool,
) -> Result<Option<PathBuf>> {
    ensure_dir(dest_root)?;
    let dest = dest_root.join(name);

    let mut backup: Option<PathBuf> = None;
    if dest.exists() {
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let backup_path = dest_root.join(format!("{name}.bak-{stamp}"));
        std::fs::rename(&dest, &backup_path)?;
        backup = Some(backup_path);
    }

    if let Err(err) = move_dir(staged, &dest) {
        if let Some(backup_path) = &backup {
            if backup_path.exists() && !dest.exists() {
                if let Err(restore_err) = std::fs::rename(backup_path, &dest) {
                    warn!(
                        target: "replace",
                        skill = name,
                        backup = %backup_path.display(),
                        error = %restore_err,
                        "rollback failed; backup left in place"
                    );
                }
            }
        }
        return Err(err);
    }

    match backup {
        Some(backup_path) if !keep_backup => {
            // deletion is cleanup, not correctness-critical
            let _ = std::fs::remove_dir_all(&backup_path);
            Ok(None)
        }
        other => Ok(other),
    }
}
