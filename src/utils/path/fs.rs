//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_in` - config paths relative to the project root
//! - `unsafe_target` - output-relative destinations

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Lexical cleanup if already absolute
/// - Join with current directory if relative
///
/// # Example
/// ```ignore
/// let abs = normalize_path(Path::new("../czml_files"));
/// ```
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            clean_path(path)
        } else {
            std::env::current_dir()
                .map_or_else(|_| path.to_path_buf(), |cwd| clean_path(&cwd.join(path)))
        }
    })
}

/// Resolve a configured path against the project root.
///
/// A leading `~` is expanded to the home directory. Absolute paths are
/// kept; relative ones are joined with `root`.
pub fn resolve_in(root: &Path, path: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    };
    let full = if expanded.is_relative() {
        root.join(expanded)
    } else {
        expanded
    };
    normalize_path(&full)
}

/// Why `path` cannot be used as a destination inside the output directory.
///
/// Rejects empty paths, absolute paths and any `..` component.
pub fn unsafe_target(path: &Path) -> Option<&'static str> {
    if path.as_os_str().is_empty() {
        return Some("must not be empty");
    }
    path.components().find_map(|comp| match comp {
        Component::ParentDir => Some("parent directory '..' not allowed"),
        Component::Prefix(_) | Component::RootDir => Some("absolute paths not allowed"),
        _ => None,
    })
}

/// Lexically drop `.` and resolve `..` for paths that don't exist yet.
fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(comp);
                }
            }
            _ => out.push(comp),
        }
    }
    out
}
