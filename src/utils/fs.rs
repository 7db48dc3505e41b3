//! Filesystem utilities.
//!
//! Helpers for the directory copy/move operations the update workflow is
//! built from.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Expand a leading `~` and absolutize against the current directory.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = if raw == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw))
    } else if let Some(rest) = raw.strip_prefix("~/") {
        dirs::home_dir().map_or_else(|| PathBuf::from(raw), |home| home.join(rest))
    } else {
        PathBuf::from(raw)
    };
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    }
}

/// Recursively copy a directory tree. Symbolic links are recreated as
/// links, never followed.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = std::fs::symlink_metadata(&from)?.file_type();
        if file_type.is_symlink() {
            copy_symlink(&from, &to)?;
        } else if file_type.is_dir() {
            copy_dir_all(&from, &to)?;
        } else {
            std::fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

/// Move a directory, falling back to copy + delete when a plain rename is
/// not possible (staging areas usually live on a different filesystem).
pub fn move_dir(src: &Path, dst: &Path) -> Result<()> {
    match std::fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(err) => {
            if !src.exists() || dst.exists() {
                return Err(err.into());
            }
            copy_dir_all(src, dst)?;
            // source removal is cleanup, not correctness-critical
            let _ = std::fs::remove_dir_all(src);
            Ok(())
        }
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let target = std::fs::read_link(from)?;
    std::os::unix::fs::symlink(target, to)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    std::fs::copy(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // idempotent
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn expand_path_absolutizes_relative() {
        let expanded = expand_path("some/rel/path");
        assert!(expanded.is_absolute());
        assert!(expanded.ends_with("some/rel/path"));
    }

    #[test]
    fn expand_path_keeps_absolute() {
        assert_eq!(expand_path("/etc/hosts"), PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn copy_dir_all_copies_nested_tree() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("sub")).unwrap();
        std::fs::write(src.path().join("top.txt"), "top").unwrap();
        std::fs::write(src.path().join("sub/inner.txt"), "inner").unwrap();

        let target = dst.path().join("copy");
        copy_dir_all(src.path(), &target).unwrap();

        assert_eq!(
            std::fs::read_to_string(target.join("top.txt")).unwrap(),
            "top"
        );
        assert_eq!(
            std::fs::read_to_string(target.join("sub/inner.txt")).unwrap(),
            "inner"
        );
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_all_preserves_symlinks() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        std::fs::write(src.path().join("real.txt"), "data").unwrap();
        std::os::unix::fs::symlink("real.txt", src.path().join("link.txt")).unwrap();

        let target = dst.path().join("copy");
        copy_dir_all(src.path(), &target).unwrap();

        let link = target.join("link.txt");
        assert!(
            std::fs::symlink_metadata(&link)
                .unwrap()
                .file_type()
                .is_symlink()
        );
        assert_eq!(std::fs::read_link(&link).unwrap(), PathBuf::from("real.txt"));
    }

    #[test]
    fn move_dir_missing_source_is_error() {
        let dst = tempdir().unwrap();
        let result = move_dir(Path::new("/nonexistent/source"), &dst.path().join("out"));
        assert!(result.is_err());
        assert!(!dst.path().join("out").exists());
    }

    #[test]
    fn move_dir_moves_tree() {
        let root = tempdir().unwrap();
        let src = root.path().join("src");
        std::fs::create_dir_all(src.join("sub")).unwrap();
        std::fs::write(src.join("sub/file.txt"), "x").unwrap();

        let dst = root.path().join("dst");
        move_dir(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(
            std::fs::read_to_string(dst.join("sub/file.txt")).unwrap(),
            "x"
        );
    }
}
