//! Data file manifest: the ordered list of data files handed to the template.
//!
//! A manifest is the subsequence of a directory listing whose entries carry
//! the target extension. The extension is the text after the *last* dot and
//! must match exactly (case-sensitive):
//!
//! ```text
//! scene1.czml      -> kept
//! scene2.CZML      -> dropped (case)
//! notes.czml.bak   -> dropped (last segment is `bak`)
//! README           -> dropped (no dot)
//! ```
//!
//! Listing order is preserved as reported by the [`DirListing`].

mod listing;

pub use listing::{DirListing, FsListing};
#[cfg_attr(not(test), allow(unused_imports))]
pub use listing::MemoryListing;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Failure to enumerate the data directory.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read data directory `{}`", dir.display())]
    Read {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Returns `true` if the last dot-delimited segment of `name` equals `ext`.
///
/// Names without a dot never match.
#[inline]
pub fn has_extension(name: &str, ext: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, last)| last == ext)
}

/// Ordered, filtered list of data file names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest(Vec<String>);

impl Manifest {
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds manifests from a listing source and a target extension.
pub struct ManifestBuilder<'a, L: DirListing> {
    listing: L,
    extension: &'a str,
}

impl<'a, L: DirListing> ManifestBuilder<'a, L> {
    pub const fn new(listing: L, extension: &'a str) -> Self {
        Self { listing, extension }
    }

    /// Scan `dir` once and keep the entries with the target extension.
    pub fn build(&self, dir: &Path) -> Result<Manifest, ManifestError> {
        let names = self
            .listing
            .list(dir)?
            .into_iter()
            .filter(|name| has_extension(name, self.extension))
            .collect();
        Ok(Manifest(names))
    }
}

/// Scan a real directory for files with `extension`.
pub fn scan_manifest(dir: &Path, extension: &str) -> Result<Manifest, ManifestError> {
    ManifestBuilder::new(FsListing, extension).build(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn build(names: &[&str], ext: &str) -> Manifest {
        let listing = MemoryListing::new().with_dir("/data", names.iter().copied());
        ManifestBuilder::new(listing, ext)
            .build(Path::new("/data"))
            .unwrap()
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("scene1.czml", "czml"));
        assert!(!has_extension("scene2.CZML", "czml"));
        assert!(!has_extension("readme.txt", "czml"));
        assert!(!has_extension("notes.czml.bak", "czml"));
        assert!(has_extension("archive.tar.czml", "czml"));
    }

    #[test]
    fn test_has_extension_edge_names() {
        // No dot at all
        assert!(!has_extension("czml", "czml"));
        // Leading dot: last segment is everything after it
        assert!(has_extension(".czml", "czml"));
        // Trailing dot: last segment is empty
        assert!(!has_extension("scene.", "czml"));
        assert!(has_extension("scene.", ""));
    }

    #[test]
    fn test_mixed_directory() {
        let manifest = build(
            &["scene1.czml", "scene2.CZML", "readme.txt", "notes.czml.bak"],
            "czml",
        );
        assert_eq!(manifest.names(), ["scene1.czml"]);
    }

    #[test]
    fn test_all_match_keeps_listing_order() {
        let manifest = build(&["b.czml", "a.czml"], "czml");
        assert_eq!(manifest.names(), ["b.czml", "a.czml"]);
    }

    #[test]
    fn test_subsequence_order() {
        let manifest = build(&["z.czml", "x.txt", "m.czml", "sub", "a.czml"], "czml");
        assert_eq!(manifest.names(), ["z.czml", "m.czml", "a.czml"]);
    }

    #[test]
    fn test_empty_and_no_match() {
        assert!(build(&[], "czml").is_empty());
        assert!(build(&["a.txt", "b", "c.CZML"], "czml").is_empty());
    }

    #[test]
    fn test_idempotent() {
        let listing = MemoryListing::new().with_dir("/data", ["a.czml", "b.txt", "c.czml"]);
        let builder = ManifestBuilder::new(listing, "czml");
        let first = builder.build(Path::new("/data")).unwrap();
        let second = builder.build(Path::new("/data")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_dir_is_error() {
        let builder = ManifestBuilder::new(MemoryListing::new(), "czml");
        let err = builder.build(Path::new("/missing")).unwrap_err();
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn test_serializes_as_array() {
        let manifest = build(&["a.czml", "b.czml"], "czml");
        let json = serde_json::to_string(&manifest).unwrap();
        assert_eq!(json, r#"["a.czml","b.czml"]"#);
    }

    #[test]
    fn test_scan_manifest_real_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("orbit.czml"), "[]").unwrap();
        fs::write(dir.path().join("orbit.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();

        let manifest = scan_manifest(dir.path(), "czml").unwrap();
        assert_eq!(manifest.names(), ["orbit.czml"]);
    }

    #[test]
    fn test_scan_manifest_missing_dir() {
        let dir = TempDir::new().unwrap();
        let result = scan_manifest(&dir.path().join("nope"), "czml");
        assert!(matches!(result, Err(ManifestError::Read { .. })));
    }
}
