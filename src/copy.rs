//! Static asset mirroring.
//!
//! Every copy pattern mirrors its source tree into `output/<to>/`:
//!
//! ```text
//! node_modules/cesium/Source/Assets/  -> dist/Assets/
//! ../czml_files/                      -> dist/czml/
//! ```
//!
//! A file whose destination exists and is at least as new as the source is
//! skipped unless the build is clean.
//!
//! The pattern source itself may be a symlink. Inside the tree, symlinked
//! files are copied by content and symlinked directories are skipped, so
//! link cycles cannot recurse.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::CopyPattern;
use crate::debug;
use crate::utils::mtime::is_newer_than;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("copy source `{}` does not exist", from.display())]
    MissingSource { from: PathBuf },

    #[error("failed to copy `{}` to `{}`", from.display(), to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Files copied and skipped across one or more patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: usize,
    pub skipped: usize,
}

impl std::ops::AddAssign for CopyStats {
    fn add_assign(&mut self, other: Self) {
        self.copied += other.copied;
        self.skipped += other.skipped;
    }
}

/// Mirror all patterns into `output_dir`, in order.
pub fn copy_patterns(
    patterns: &[CopyPattern],
    output_dir: &Path,
    clean: bool,
) -> Result<CopyStats, CopyError> {
    let mut stats = CopyStats::default();
    for pattern in patterns {
        stats += copy_pattern(pattern, output_dir, clean)?;
    }
    Ok(stats)
}

/// Mirror one pattern. A file source lands inside `output/<to>/`.
pub fn copy_pattern(
    pattern: &CopyPattern,
    output_dir: &Path,
    clean: bool,
) -> Result<CopyStats, CopyError> {
    let mut stats = CopyStats::default();
    let dest = output_dir.join(&pattern.to);

    if !pattern.from.exists() {
        if pattern.optional {
            debug!("copy"; "skip missing optional {}", pattern.from.display());
            return Ok(stats);
        }
        return Err(CopyError::MissingSource {
            from: pattern.from.clone(),
        });
    }

    if pattern.from.is_dir() {
        copy_dir_recursive(&pattern.from, &dest, clean, &mut stats)?;
    } else {
        let name = pattern.from.file_name().unwrap_or_default();
        copy_file(&pattern.from, &dest.join(name), clean, &mut stats)?;
    }

    debug!("copy"; "{} -> {} ({} copied, {} fresh)",
        pattern.from.display(), pattern.to.display(), stats.copied, stats.skipped);
    Ok(stats)
}

/// Recursively copy directory contents.
fn copy_dir_recursive(
    src_dir: &Path,
    dest_dir: &Path,
    clean: bool,
    stats: &mut CopyStats,
) -> Result<(), CopyError> {
    let io_err = |source| CopyError::Io {
        from: src_dir.to_path_buf(),
        to: dest_dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(dest_dir).map_err(io_err)?;
    for entry in fs::read_dir(src_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let src_path = entry.path();
        let dest_path = dest_dir.join(entry.file_name());
        // file_type() does not follow symlinks
        let file_type = entry.file_type().map_err(io_err)?;

        if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dest_path, clean, stats)?;
        } else if file_type.is_symlink() && src_path.is_dir() {
            debug!("copy"; "skip symlinked directory {}", src_path.display());
        } else {
            copy_file(&src_path, &dest_path, clean, stats)?;
        }
    }
    Ok(())
}

fn copy_file(src: &Path, dest: &Path, clean: bool, stats: &mut CopyStats) -> Result<(), CopyError> {
    if !clean && dest.exists() && !is_newer_than(src, dest) {
        stats.skipped += 1;
        return Ok(());
    }

    let io_err = |source| CopyError::Io {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    };
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::copy(src, dest).map_err(io_err)?;
    stats.copied += 1;
    Ok(())
}
