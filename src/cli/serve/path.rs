//! Request URL to output file resolution.

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

/// Map a request URL to a file under `serve_root`.
///
/// Directories resolve to their `index.html`. Returns `None` for anything
/// that is missing or would escape the root.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url)?;

    if Path::new(&clean)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let canonical = serve_root.join(&clean).canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    // symlinks may still point outside
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    let index = canonical.join("index.html");
    (canonical.is_dir() && index.is_file()).then_some(index)
}

/// Strip query and fragment, decode, and trim slashes.
fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    Some(decoded.trim_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn output_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html>").unwrap();
        fs::create_dir_all(dir.path().join("czml")).unwrap();
        fs::write(dir.path().join("czml/my scene.czml"), "[]").unwrap();
        fs::create_dir_all(dir.path().join("Widgets")).unwrap();
        fs::write(dir.path().join("Widgets/index.html"), "w").unwrap();
        dir
    }

    #[test]
    fn test_root_serves_index() {
        let dir = output_dir();
        let path = resolve_path("/", dir.path()).unwrap();
        assert!(path.ends_with("index.html"));
    }

    #[test]
    fn test_decodes_and_strips_query() {
        let dir = output_dir();
        let path = resolve_path("/czml/my%20scene.czml?v=2", dir.path()).unwrap();
        assert!(path.ends_with("czml/my scene.czml"));
    }

    #[test]
    fn test_directory_index() {
        let dir = output_dir();
        let path = resolve_path("/Widgets/", dir.path()).unwrap();
        assert!(path.ends_with("Widgets/index.html"));
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = output_dir();
        let inner = dir.path().join("czml");
        assert_eq!(resolve_path("/../index.html", &inner), None);
        assert_eq!(resolve_path("/%2e%2e/index.html", &inner), None);
    }

    #[test]
    fn test_missing_file() {
        let dir = output_dir();
        assert_eq!(resolve_path("/app.js", dir.path()), None);
        assert_eq!(resolve_path("/czml/", dir.path()), None);
    }
}
