//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "dist"             # Output directory (relative to project root)
//! filename = "[name].js"      # Bundle file name, `[name]` is the entry name
//!
//! [build.entry]
//! app = "src/index.js"        # entry name -> source file
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Placeholder replaced by the entry name in [`BuildConfig::filename`].
pub const NAME_PLACEHOLDER: &str = "[name]";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Entry points, keyed by bundle name. Ordered for deterministic output.
    pub entry: BTreeMap<String, PathBuf>,

    /// Build output directory.
    pub output: PathBuf,

    /// Bundle file name pattern.
    pub filename: String,

    /// Clean output directory before building (CLI only).
    #[serde(skip)]
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            entry: BTreeMap::from([("app".to_string(), PathBuf::from("src/index.js"))]),
            output: "dist".into(),
            filename: "[name].js".into(),
            clean: false,
        }
    }
}

impl BuildConfig {
    pub const FIELDS: BuildFields = BuildFields {
        entry: FieldPath::new("build.entry"),
        output: FieldPath::new("build.output"),
        filename: FieldPath::new("build.filename"),
    };

    /// Output file name for the given entry.
    pub fn bundle_name(&self, entry: &str) -> String {
        self.filename.replace(NAME_PLACEHOLDER, entry)
    }

    /// Resolve entry sources and output dir against `root`.
    pub fn normalize(&mut self, root: &Path) {
        for source in self.entry.values_mut() {
            *source = crate::utils::path::resolve_in(root, source);
        }
        self.output = crate::utils::path::resolve_in(root, &self.output);
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.entry.is_empty() {
            diag.error(Self::FIELDS.entry, "at least one entry is required");
        }
        for name in self.entry.keys() {
            if !is_entry_name(name) {
                diag.error_with_hint(
                    Self::FIELDS.entry,
                    format!("invalid entry name '{name}'"),
                    "use letters, digits, '-' or '_'",
                );
            }
        }

        if !self.filename.contains(NAME_PLACEHOLDER) {
            diag.error_with_hint(
                Self::FIELDS.filename,
                format!("'{}' does not contain {NAME_PLACEHOLDER}", self.filename),
                "e.g. filename = \"[name].js\"",
            );
        }
        if self.filename.contains('/') || self.filename.contains('\\') {
            diag.error(
                Self::FIELDS.filename,
                "bundle file name must not contain path separators",
            );
        }
        if self.output.as_os_str().is_empty() {
            diag.error(Self::FIELDS.output, "output directory must not be empty");
        }
    }
}

pub struct BuildFields {
    pub entry: FieldPath,
    pub output: FieldPath,
    pub filename: FieldPath,
}

fn is_entry_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.filename, "[name].js");
        assert_eq!(
            config.build.entry.get("app"),
            Some(&PathBuf::from("src/index.js"))
        );
    }

    #[test]
    fn test_build_custom_entries() {
        let config = test_parse_config(
            "[build]\noutput = \"public\"\n[build.entry]\nviewer = \"src/viewer.js\"\nadmin = \"src/admin.js\"",
        );
        let names: Vec<_> = config.build.entry.keys().cloned().collect();
        // BTreeMap: sorted by name, defaults replaced
        assert_eq!(names, vec!["admin", "viewer"]);
        assert_eq!(config.build.output, PathBuf::from("public"));
    }

    #[test]
    fn test_bundle_name() {
        let build = BuildConfig {
            filename: "[name].bundle.js".into(),
            ..BuildConfig::default()
        };
        assert_eq!(build.bundle_name("app"), "app.bundle.js");
    }

    #[test]
    fn test_validate_filename_placeholder() {
        let build = BuildConfig {
            filename: "bundle.js".into(),
            ..BuildConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, BuildConfig::FIELDS.filename);
    }

    #[test]
    fn test_validate_entries() {
        let mut build = BuildConfig::default();
        build.entry.insert("bad name".into(), "x.js".into());
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert!(diag.has_errors());

        build.entry.clear();
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert!(
            diag.errors()
                .iter()
                .any(|e| e.message.contains("at least one entry"))
        );
    }

    #[test]
    fn test_validate_default_ok() {
        let mut diag = ConfigDiagnostics::new();
        BuildConfig::default().validate(&mut diag);
        assert!(diag.is_empty());
    }
}
