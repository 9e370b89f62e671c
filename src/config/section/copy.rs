//! `[[copy]]` section configuration.
//!
//! Static directories mirrored into the output directory. The data
//! directory (`[data]`) is always copied as well and takes part in the
//! output conflict check.
//!
//! # Example
//!
//! ```toml
//! [[copy]]
//! from = "node_modules/cesium/Build/Cesium/Workers"   # → dist/Workers/
//! to = "Workers"
//!
//! [[copy]]
//! from = "static/textures"
//! to = "textures"
//! optional = true                                    # skip if missing
//! ```
//!
//! Declaring any `[[copy]]` table replaces the default pattern list.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, DataConfig, FieldPath};
use crate::utils::path::unsafe_target;

const FIELD: FieldPath = FieldPath::new("copy");

/// Root of the geospatial runtime package inside `node_modules`.
const CESIUM_SOURCE: &str = "node_modules/cesium/Source";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPattern {
    /// Source directory or file (relative to project root).
    pub from: PathBuf,
    /// Destination (relative to output directory).
    pub to: PathBuf,
    /// Missing source is logged instead of failing the build.
    #[serde(default)]
    pub optional: bool,
}

impl CopyPattern {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            optional: false,
        }
    }

    pub fn normalize(&mut self, root: &Path) {
        self.from = crate::utils::path::resolve_in(root, &self.from);
    }
}

/// Runtime workers, assets and widgets of the rendering library.
pub fn default_copy_patterns() -> Vec<CopyPattern> {
    let source = Path::new(CESIUM_SOURCE);
    vec![
        CopyPattern::new("node_modules/cesium/Build/Cesium/Workers", "Workers"),
        CopyPattern::new(source.join("Assets"), "Assets"),
        CopyPattern::new(source.join("Widgets"), "Widgets"),
    ]
}

// ============================================================================
// Output Name Tracker (Validation Helper)
// ============================================================================

/// Tracks copy destinations to detect two sources writing the same tree.
struct OutputNameTracker<'a> {
    seen: FxHashMap<&'a Path, &'a Path>,
}

impl<'a> OutputNameTracker<'a> {
    fn new() -> Self {
        Self {
            seen: FxHashMap::default(),
        }
    }

    fn check_and_insert(
        &mut self,
        to: &'a Path,
        from: &'a Path,
        idx: Option<usize>,
        diag: &mut ConfigDiagnostics,
    ) {
        let label = idx.map_or_else(|| "[data]".to_string(), |i| format!("[{i}]"));
        if let Some(prev_from) = self.seen.get(to) {
            diag.error(
                FIELD,
                format!(
                    "{label} output conflict: '{}' and '{}' both copy to '{}'",
                    from.display(),
                    prev_from.display(),
                    to.display(),
                ),
            );
        } else {
            self.seen.insert(to, from);
        }
    }
}

/// Validate copy destinations, including the implicit data copy.
///
/// Checks:
/// - destinations are relative and stay inside the output directory
/// - no two sources share a destination
///
/// The data target's own safety is reported by [`DataConfig::validate`].
pub fn validate_copy_targets(
    patterns: &[CopyPattern],
    data: &DataConfig,
    diag: &mut ConfigDiagnostics,
) {
    let mut outputs = OutputNameTracker::new();

    for (i, pattern) in patterns.iter().enumerate() {
        if let Some(reason) = unsafe_target(&pattern.to) {
            diag.error(
                FIELD,
                format!("[{i}] destination '{}': {reason}", pattern.to.display()),
            );
        }
        outputs.check_and_insert(&pattern.to, &pattern.from, Some(i), diag);
    }

    outputs.check_and_insert(&data.copy_to, &data.dir, None, diag);
}
