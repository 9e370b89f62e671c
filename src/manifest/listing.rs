//! Directory listing sources for manifest scanning.
//!
//! [`FsListing`] reads the real filesystem, [`MemoryListing`] serves a fixed
//! table of names so scans can be exercised without touching disk.

use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::ManifestError;

/// Ordered source of directory entry names.
///
/// Implementations return names in whatever order the underlying source
/// reports them. Subdirectories are included; nothing is recursed into.
pub trait DirListing {
    fn list(&self, dir: &Path) -> Result<Vec<String>, ManifestError>;
}

/// Filesystem-backed listing (`std::fs::read_dir`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FsListing;

impl DirListing for FsListing {
    fn list(&self, dir: &Path) -> Result<Vec<String>, ManifestError> {
        let read_err = |source| ManifestError::Read {
            dir: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

/// In-memory listing keyed by directory path.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Default)]
pub struct MemoryListing {
    dirs: FxHashMap<PathBuf, Vec<String>>,
}

#[cfg_attr(not(test), allow(dead_code))]
impl MemoryListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory with its entries, in listing order.
    pub fn with_dir<I, S>(mut self, dir: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs
            .insert(dir.into(), names.into_iter().map(Into::into).collect());
        self
    }
}

impl DirListing for MemoryListing {
    fn list(&self, dir: &Path) -> Result<Vec<String>, ManifestError> {
        self.dirs
            .get(dir)
            .cloned()
            .ok_or_else(|| ManifestError::Read {
                dir: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
            })
    }
}
