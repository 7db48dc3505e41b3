//! Order-independent directory fingerprinting.
//!
//! Two directory trees fingerprint equal iff they have the same logical
//! content: the same relative paths with the same file bytes and the same
//! symlink targets. Traversal order, timestamps, permissions, and entries
//! in the ignore sets do not affect the digest.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::{DirEntry, WalkDir};

use crate::error::Result;

/// Directory names excluded from the digest (VCS and cache metadata).
pub const IGNORED_DIRS: &[&str] = &[".git", "__pycache__"];

/// File names excluded from the digest (OS metadata).
pub const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// File suffixes excluded from the digest (compiled bytecode).
pub const IGNORED_SUFFIXES: &[&str] = &[".pyc"];

const READ_CHUNK: usize = 8192;

fn keep_entry(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if entry.file_type().is_dir() {
        !IGNORED_DIRS.contains(&name.as_ref())
    } else {
        !IGNORED_FILES.contains(&name.as_ref())
            && !IGNORED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
    }
}

/// Compute the content digest of the tree rooted at `root`, as lowercase
/// hex. The caller guarantees `root` exists.
///
/// Entries are folded in sorted order per directory level with a type tag
/// (`D` directory, `F` file, `L` symlink) plus the path relative to the
/// root; file bytes are streamed in fixed-size chunks. Symlink targets are
/// recorded, never followed, so link cycles cannot recurse.
pub fn fingerprint(root: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(keep_entry);

    for entry in walker {
        let entry = entry.map_err(std::io::Error::other)?;
        if entry.depth() == 0 {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(std::io::Error::other)?;
        if entry.file_type().is_dir() {
            hasher.update(b"D");
            hasher.update(rel.to_string_lossy().as_bytes());
        } else {
            hasher.update(b"F");
            hasher.update(rel.to_string_lossy().as_bytes());
            if entry.path_is_symlink() {
                let target = std::fs::read_link(entry.path())?;
                hasher.update(b"L");
                hasher.update(target.to_string_lossy().as_bytes());
            } else {
                let mut file = std::fs::File::open(entry.path())?;
                let mut chunk = [0u8; READ_CHUNK];
                loop {
                    let read = file.read(&mut chunk)?;
                    if read == 0 {
                        break;
                    }
                    hasher.update(&chunk[..read]);
                }
            }
        }
    }

    Ok(hex::encode(hasher.finalize()))
}
