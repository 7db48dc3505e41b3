//! Skill directory validation.
//!
//! A skill is a directory with a `SKILL.md` manifest at its root. There is
//! no in-memory skill representation; everything downstream works on paths.

use std::path::Path;

use crate::error::{Result, SkError};

/// Marker file that makes a directory a skill.
pub const MANIFEST_FILE: &str = "SKILL.md";

/// Check that `path` is a directory containing the manifest marker.
pub fn validate_skill_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(SkError::ValidationFailed(format!(
            "skill directory does not exist: {}",
            path.display()
        )));
    }
    if !path.join(MANIFEST_FILE).is_file() {
        return Err(SkError::ValidationFailed(format!(
            "{MANIFEST_FILE} not found in {}",
            path.display()
        )));
    }
    Ok(())
}
